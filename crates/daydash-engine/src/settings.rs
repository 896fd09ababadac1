use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMER_SECS: u32 = 25 * 60;
pub const DEFAULT_NOTE_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_TICK_MS: u64 = 1_000;

/// Tunables shared by the browser front-end and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_timer_secs")]
    pub timer_default_secs: u32,
    #[serde(default = "default_note_debounce_ms")]
    pub note_debounce_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            timer_default_secs: DEFAULT_TIMER_SECS,
            note_debounce_ms: DEFAULT_NOTE_DEBOUNCE_MS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl DashboardSettings {
    pub fn note_debounce(&self) -> Duration {
        Duration::from_millis(self.note_debounce_ms)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Replaces zero values with the defaults.
    pub fn sanitized(mut self) -> Self {
        if self.timer_default_secs == 0 {
            self.timer_default_secs = DEFAULT_TIMER_SECS;
        }
        if self.tick_ms == 0 {
            self.tick_ms = DEFAULT_TICK_MS;
        }
        self
    }
}

fn default_timer_secs() -> u32 {
    DEFAULT_TIMER_SECS
}

fn default_note_debounce_ms() -> u64 {
    DEFAULT_NOTE_DEBOUNCE_MS
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}
