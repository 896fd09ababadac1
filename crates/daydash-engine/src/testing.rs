//! Deterministic stand-ins for the host seams, for tests and headless drivers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::host::{ExternalFeeds, Feed, Prompt};
use crate::timing::{Clock, ScheduledTask, Scheduler, TaskGuard, Wakeup};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[derive(Debug)]
struct Entry {
    wakeup: Wakeup,
    repeating: bool,
    interval: Duration,
    active: Rc<Cell<bool>>,
}

struct ManualTask(Rc<Cell<bool>>);

impl ScheduledTask for ManualTask {
    fn cancel(&mut self) {
        self.0.set(false);
    }
}

/// Scheduler whose wakeups fire only through [`ManualScheduler::fire`].
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    entries: Rc<RefCell<Vec<Entry>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.active.get())
            .count()
    }

    pub fn active(&self) -> Vec<Wakeup> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.active.get())
            .map(|entry| entry.wakeup.clone())
            .collect()
    }

    pub fn interval_of(&self, wakeup: &Wakeup) -> Option<Duration> {
        self.entries
            .borrow()
            .iter()
            .find(|entry| entry.active.get() && &entry.wakeup == wakeup)
            .map(|entry| entry.interval)
    }

    /// Fires every active wakeup once. One-shot entries are spent; repeating
    /// ones stay armed.
    pub fn fire(&self) -> Vec<Wakeup> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|entry| entry.active.get());
        let mut fired = Vec::with_capacity(entries.len());
        for entry in entries.iter() {
            fired.push(entry.wakeup.clone());
            if !entry.repeating {
                entry.active.set(false);
            }
        }
        fired
    }

    fn push(&self, wakeup: Wakeup, repeating: bool, interval: Duration) -> TaskGuard {
        let active = Rc::new(Cell::new(true));
        self.entries.borrow_mut().push(Entry {
            wakeup,
            repeating,
            interval,
            active: active.clone(),
        });
        TaskGuard::new(ManualTask(active))
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period: Duration, wakeup: Wakeup) -> TaskGuard {
        self.push(wakeup, true, period)
    }

    fn after(&self, delay: Duration, wakeup: Wakeup) -> TaskGuard {
        self.push(wakeup, false, delay)
    }
}

/// Prompt with scripted confirmation answers (yes once the script runs out)
/// that records everything it was asked and told.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Rc<RefCell<VecDeque<bool>>>,
    asked: Rc<RefCell<Vec<String>>>,
    notices: Rc<RefCell<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Rc::new(RefCell::new(answers.into_iter().collect())),
            ..Self::default()
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked.borrow_mut().push(message.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(true)
    }

    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingFeeds {
    refreshed: Rc<RefCell<Vec<Feed>>>,
}

impl RecordingFeeds {
    pub fn refreshed(&self) -> Vec<Feed> {
        self.refreshed.borrow().clone()
    }
}

impl ExternalFeeds for RecordingFeeds {
    fn refresh(&self, feed: Feed) {
        self.refreshed.borrow_mut().push(feed);
    }
}
