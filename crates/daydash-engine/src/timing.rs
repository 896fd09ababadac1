//! Clock and scheduler seams.
//!
//! Controllers never start timers themselves. They ask a [`Scheduler`] for a
//! one-shot or repeating wakeup and keep the returned [`TaskGuard`]; dropping
//! or cancelling the guard stops the wakeup. The host delivers fired wakeups
//! back through `Dashboard::handle_wakeup`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::widget::WidgetId;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Wakeup {
    /// One countdown second elapsed for a timer widget.
    TimerTick(WidgetId),
    /// The quiet period of a note widget ended.
    NoteSave(WidgetId),
}

impl Wakeup {
    pub fn widget(&self) -> &WidgetId {
        match self {
            Wakeup::TimerTick(id) | Wakeup::NoteSave(id) => id,
        }
    }
}

pub trait ScheduledTask {
    fn cancel(&mut self);
}

/// Owner handle of a scheduled wakeup; cancels it when dropped.
pub struct TaskGuard {
    task: Option<Box<dyn ScheduledTask>>,
}

impl TaskGuard {
    pub fn new(task: impl ScheduledTask + 'static) -> Self {
        Self {
            task: Some(Box::new(task)),
        }
    }

    /// Guard for a scheduler that never fires.
    pub fn inert() -> Self {
        Self { task: None }
    }

    pub fn cancel(mut self) {
        self.cancel_in_place();
    }

    fn cancel_in_place(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.cancel_in_place();
    }
}

impl fmt::Debug for TaskGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGuard")
            .field("armed", &self.task.is_some())
            .finish()
    }
}

pub trait Scheduler {
    /// Fires `wakeup` every `period` until the guard is cancelled.
    fn every(&self, period: Duration, wakeup: Wakeup) -> TaskGuard;

    /// Fires `wakeup` once after `delay` unless the guard is cancelled first.
    fn after(&self, delay: Duration, wakeup: Wakeup) -> TaskGuard;
}

/// Scheduler for short-lived processes that exit before anything would fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScheduler;

impl Scheduler for NoopScheduler {
    fn every(&self, _period: Duration, _wakeup: Wakeup) -> TaskGuard {
        TaskGuard::inert()
    }

    fn after(&self, _delay: Duration, _wakeup: Wakeup) -> TaskGuard {
        TaskGuard::inert()
    }
}

/// Milliseconds between two instants, never negative.
pub fn elapsed_millis(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use chrono::TimeZone;

    use super::*;

    struct Flag(Rc<Cell<u32>>);

    impl ScheduledTask for Flag {
        fn cancel(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn guard_cancels_exactly_once() {
        let cancels = Rc::new(Cell::new(0));
        let guard = TaskGuard::new(Flag(cancels.clone()));
        guard.cancel();
        assert_eq!(cancels.get(), 1);

        {
            let _guard = TaskGuard::new(Flag(cancels.clone()));
        }
        assert_eq!(cancels.get(), 2);
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let earlier = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 10).unwrap();
        assert_eq!(elapsed_millis(earlier, later), 10_000);
        assert_eq!(elapsed_millis(later, earlier), 0);
    }
}
