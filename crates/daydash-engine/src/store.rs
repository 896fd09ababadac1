//! Key/value persistence contract.
//!
//! Every backend stores plain strings. Structured values are JSON encoded by
//! [`get_json`] / [`set_json`]; a value that fails to decode is treated as
//! absent so one corrupt key never takes the dashboard down.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::widget::WidgetId;

pub const DASHBOARD_ORDER_KEY: &str = "dashboardOrder";
pub const WIDGET_TYPES_KEY: &str = "widgetTypes";

const NOTE_PREFIX: &str = "note-";
const TODO_PREFIX: &str = "todo-";
const TIMER_PREFIX: &str = "timer-";

pub fn note_content_key(id: &WidgetId) -> String {
    format!("note-content-{id}")
}

pub fn todo_tasks_key(id: &WidgetId) -> String {
    format!("todo-tasks-{id}")
}

pub fn todo_filter_key(id: &WidgetId) -> String {
    format!("todo-filter-{id}")
}

pub fn timer_state_key(id: &WidgetId) -> String {
    format!("timer-state-{id}")
}

/// True for every key a full reset must clear.
pub fn is_widget_scoped_key(key: &str) -> bool {
    key.starts_with(TODO_PREFIX)
        || key.starts_with(TIMER_PREFIX)
        || key.starts_with(NOTE_PREFIX)
        || key == DASHBOARD_ORDER_KEY
        || key == WIDGET_TYPES_KEY
}

pub trait Store {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn keys(&self) -> Vec<String>;

    /// Removes every key accepted by `predicate`, returning how many went.
    fn remove_matching(&mut self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, StoreError> {
        let doomed: Vec<String> = self.keys().into_iter().filter(|key| predicate(key)).collect();
        for key in &doomed {
            self.remove(key)?;
        }
        debug!(count = doomed.len(), "removed matching keys");
        Ok(doomed.len())
    }
}

/// Reads and decodes a JSON value, treating malformed content as absent.
pub fn get_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "ignoring malformed stored value");
            None
        }
    }
}

pub fn set_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: Store + ?Sized,
{
    let encoded = serde_json::to_string(value).map_err(|err| StoreError::Encode {
        key: key.to_string(),
        message: err.to_string(),
    })?;
    store.set(key, &encoded)
}

/// In-process store used by tests and as a scratch backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
