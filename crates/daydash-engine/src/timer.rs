//! Countdown timer widget controller.
//!
//! The countdown is driven by a repeating [`Wakeup::TimerTick`]; every tick
//! persists the remaining time together with a wall-clock stamp so a reload
//! can subtract the time that passed while nothing was running.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::host::{Prompt, TIMER_FINISHED_NOTICE};
use crate::settings::DashboardSettings;
use crate::store::{self, Store, timer_state_key};
use crate::timing::{Clock, Scheduler, TaskGuard, Wakeup, elapsed_millis};
use crate::widget::WidgetId;

/// Persisted form, shared with the browser page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub time_left: u32,
    pub is_running: bool,
    /// Epoch milliseconds of the last write.
    pub last_update: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed.
    Ignored,
    Counting(u32),
    Expired,
}

#[derive(Debug)]
pub struct TimerController {
    id: WidgetId,
    time_left: u32,
    phase: TimerPhase,
    settings: DashboardSettings,
    ticker: Option<TaskGuard>,
}

impl TimerController {
    /// Loads saved state, compensating for time elapsed while the timer was
    /// running and nothing was ticking. A timer that ran out meanwhile comes
    /// back expired; one with time left resumes.
    pub fn load<S: Store + ?Sized>(
        id: WidgetId,
        settings: &DashboardSettings,
        store: &mut S,
        clock: &dyn Clock,
        scheduler: &dyn Scheduler,
    ) -> Result<Self, StoreError> {
        let now = clock.now();
        let default_secs = settings.timer_default_secs;
        let saved: TimerState = store::get_json(store, &timer_state_key(&id)).unwrap_or(TimerState {
            time_left: default_secs,
            is_running: false,
            last_update: now.timestamp_millis(),
        });

        let mut time_left = saved.time_left;
        // Only whole seconds are taken off; the stamp moves forward by the
        // same amount so the remainder counts toward the next load.
        let mut carried = now;
        if saved.is_running {
            let since = DateTime::<Utc>::from_timestamp_millis(saved.last_update)
                .unwrap_or(now)
                .min(now);
            let elapsed_secs = elapsed_millis(since, now) / 1_000;
            carried = since + TimeDelta::seconds(elapsed_secs);
            let elapsed_secs = u32::try_from(elapsed_secs).unwrap_or(u32::MAX);
            time_left = time_left.saturating_sub(elapsed_secs);
            debug!(widget = %id, elapsed_secs, time_left, "reconciled running timer");
        }

        let mut controller = Self {
            phase: resting_phase(time_left, default_secs),
            id,
            time_left,
            settings: settings.clone(),
            ticker: None,
        };

        if saved.is_running {
            if time_left > 0 {
                controller.start_at(store, carried, scheduler)?;
            } else {
                info!(widget = %controller.id, "timer ran out while away");
                controller.save(store, now)?;
            }
        }

        Ok(controller)
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn has_active_tick(&self) -> bool {
        self.ticker.is_some()
    }

    /// `MM:SS` of the remaining time.
    pub fn display(&self) -> String {
        format_countdown(self.time_left)
    }

    /// Starts counting down. No-op unless idle or paused with time left, so a
    /// second start never creates a second tick.
    pub fn start<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        clock: &dyn Clock,
        scheduler: &dyn Scheduler,
    ) -> Result<bool, StoreError> {
        self.start_at(store, clock.now(), scheduler)
    }

    fn start_at<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        stamp: DateTime<Utc>,
        scheduler: &dyn Scheduler,
    ) -> Result<bool, StoreError> {
        if !matches!(self.phase, TimerPhase::Idle | TimerPhase::Paused) || self.time_left == 0 {
            return Ok(false);
        }

        self.cancel_tick();
        self.phase = TimerPhase::Running;
        self.save(store, stamp)?;
        self.ticker = Some(scheduler.every(
            self.settings.tick_period(),
            Wakeup::TimerTick(self.id.clone()),
        ));
        info!(widget = %self.id, time_left = self.time_left, "timer started");
        Ok(true)
    }

    pub fn pause<S: Store + ?Sized>(&mut self, store: &mut S, clock: &dyn Clock) -> Result<bool, StoreError> {
        if self.phase != TimerPhase::Running {
            return Ok(false);
        }
        self.cancel_tick();
        self.phase = TimerPhase::Paused;
        self.save(store, clock.now())?;
        info!(widget = %self.id, time_left = self.time_left, "timer paused");
        Ok(true)
    }

    /// Back to the full default duration, idle.
    pub fn reset<S: Store + ?Sized>(&mut self, store: &mut S, clock: &dyn Clock) -> Result<(), StoreError> {
        self.cancel_tick();
        self.time_left = self.settings.timer_default_secs;
        self.phase = TimerPhase::Idle;
        self.save(store, clock.now())?;
        info!(widget = %self.id, "timer reset");
        Ok(())
    }

    /// One second of countdown.
    pub fn tick<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        clock: &dyn Clock,
        prompt: &dyn Prompt,
    ) -> Result<TickOutcome, StoreError> {
        if self.phase != TimerPhase::Running {
            return Ok(TickOutcome::Ignored);
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            self.save(store, clock.now())?;
            return Ok(TickOutcome::Counting(self.time_left));
        }

        self.cancel_tick();
        self.phase = TimerPhase::Expired;
        self.save(store, clock.now())?;
        info!(widget = %self.id, "timer finished");
        prompt.notify(TIMER_FINISHED_NOTICE);
        Ok(TickOutcome::Expired)
    }

    fn cancel_tick(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn save<S: Store + ?Sized>(&self, store: &mut S, now: DateTime<Utc>) -> Result<(), StoreError> {
        let state = TimerState {
            time_left: self.time_left,
            is_running: self.is_running(),
            last_update: now.timestamp_millis(),
        };
        store::set_json(store, &timer_state_key(&self.id), &state)
    }
}

fn resting_phase(time_left: u32, default_secs: u32) -> TimerPhase {
    if time_left == 0 {
        TimerPhase::Expired
    } else if time_left >= default_secs {
        TimerPhase::Idle
    } else {
        TimerPhase::Paused
    }
}

pub fn format_countdown(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
