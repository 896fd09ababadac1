//! To-do list widget controller.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::host::{CLEAR_COMPLETED_PROMPT, Prompt};
use crate::store::{self, Store, todo_filter_key, todo_tasks_key};
use crate::widget::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Med",
            Priority::Low => "Low",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoTask {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TodoFilter {
    pub const ALL: [TodoFilter; 3] = [TodoFilter::All, TodoFilter::Pending, TodoFilter::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            TodoFilter::All => "all",
            TodoFilter::Pending => "pending",
            TodoFilter::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TodoFilter::All => "All",
            TodoFilter::Pending => "Pending",
            TodoFilter::Completed => "Done",
        }
    }

    pub fn matches(self, task: &TodoTask) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Pending => !task.completed,
            TodoFilter::Completed => task.completed,
        }
    }
}

impl FromStr for TodoFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(TodoFilter::All),
            "pending" => Ok(TodoFilter::Pending),
            "completed" | "done" => Ok(TodoFilter::Completed),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Count line for the active filter, e.g. `3 tasks` or `1 pending`.
    pub label: String,
    pub show_clear_completed: bool,
}

#[derive(Debug, Clone)]
pub struct TodoController {
    id: WidgetId,
    tasks: Vec<TodoTask>,
    filter: TodoFilter,
}

impl TodoController {
    /// Loads tasks and filter; anything unreadable starts empty / `all`.
    pub fn load<S: Store + ?Sized>(id: WidgetId, store: &S) -> Self {
        let tasks: Vec<TodoTask> = store::get_json(store, &todo_tasks_key(&id)).unwrap_or_default();
        let filter: TodoFilter = store
            .get(&todo_filter_key(&id))
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        debug!(widget = %id, tasks = tasks.len(), filter = filter.as_str(), "loaded to-do list");
        Self { id, tasks, filter }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn tasks(&self) -> &[TodoTask] {
        &self.tasks
    }

    pub fn filter(&self) -> TodoFilter {
        self.filter
    }

    /// Adds a task; blank text is ignored and yields `None`.
    pub fn add<S: Store + ?Sized>(
        &mut self,
        text: &str,
        priority: Priority,
        now: DateTime<Utc>,
        store: &mut S,
    ) -> Result<Option<i64>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        // Millisecond ids collide when two tasks land in the same tick.
        let last = self.tasks.iter().map(|task| task.id).max().unwrap_or(i64::MIN);
        let id = now.timestamp_millis().max(last.saturating_add(1));
        self.tasks.push(TodoTask {
            id,
            text: text.to_string(),
            completed: false,
            priority,
            created_at: now,
        });
        self.save(store)?;
        info!(widget = %self.id, task = id, %priority, "added task");
        Ok(Some(id))
    }

    pub fn toggle<S: Store + ?Sized>(&mut self, task_id: i64, store: &mut S) -> Result<bool, StoreError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(false);
        };
        task.completed = !task.completed;
        debug!(widget = %self.id, task = task_id, completed = task.completed, "toggled task");
        self.save(store)?;
        Ok(true)
    }

    pub fn remove<S: Store + ?Sized>(&mut self, task_id: i64, store: &mut S) -> Result<bool, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save(store)?;
        Ok(true)
    }

    /// Drops completed tasks after confirmation; returns how many went.
    pub fn clear_completed<S: Store + ?Sized>(
        &mut self,
        prompt: &dyn Prompt,
        store: &mut S,
    ) -> Result<usize, StoreError> {
        if !prompt.confirm(CLEAR_COMPLETED_PROMPT) {
            return Ok(0);
        }
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        self.save(store)?;
        info!(widget = %self.id, removed, "cleared completed tasks");
        Ok(removed)
    }

    pub fn set_filter<S: Store + ?Sized>(&mut self, filter: TodoFilter, store: &mut S) -> Result<(), StoreError> {
        self.filter = filter;
        store.set(&todo_filter_key(&self.id), filter.as_str())
    }

    /// Tasks passing the filter, highest priority first, oldest first within
    /// a priority.
    pub fn visible(&self) -> Vec<&TodoTask> {
        let mut visible: Vec<&TodoTask> = self
            .tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect();
        visible.sort_by(|a, b| {
            b.priority
                .rank()
                .cmp(&a.priority.rank())
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        visible
    }

    pub fn stats(&self) -> TodoStats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        let pending = total - completed;
        let label = match self.filter {
            TodoFilter::All => format!("{total} task{}", if total == 1 { "" } else { "s" }),
            TodoFilter::Pending => format!("{pending} pending"),
            TodoFilter::Completed => format!("{completed} completed"),
        };
        TodoStats {
            total,
            pending,
            completed,
            label,
            show_clear_completed: completed > 0,
        }
    }

    fn save<S: Store + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store::set_json(store, &todo_tasks_key(&self.id), &self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::host::AssumeYes;
    use crate::store::MemoryStore;
    use crate::testing::ScriptedPrompt;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn controller() -> (TodoController, MemoryStore) {
        let store = MemoryStore::new();
        (TodoController::load(WidgetId::from("widget-1-todo"), &store), store)
    }

    fn texts(list: &TodoController) -> Vec<&str> {
        list.visible().into_iter().map(|task| task.text.as_str()).collect()
    }

    #[test]
    fn renders_highest_priority_first() {
        let (mut list, mut store) = controller();
        list.add("low", Priority::Low, t0(), &mut store).unwrap();
        list.add("high", Priority::High, t0() + Duration::seconds(1), &mut store)
            .unwrap();
        list.add("medium", Priority::Medium, t0() + Duration::seconds(2), &mut store)
            .unwrap();

        assert_eq!(texts(&list), vec!["high", "medium", "low"]);
    }

    #[test]
    fn equal_priority_keeps_creation_order() {
        let (mut list, mut store) = controller();
        list.add("second", Priority::High, t0() + Duration::seconds(5), &mut store)
            .unwrap();
        list.add("first", Priority::High, t0(), &mut store).unwrap();
        assert_eq!(texts(&list), vec!["first", "second"]);
    }

    #[test]
    fn blank_text_is_ignored() {
        let (mut list, mut store) = controller();
        assert_eq!(list.add("   ", Priority::High, t0(), &mut store).unwrap(), None);
        assert!(list.tasks().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn same_millisecond_adds_get_distinct_ids() {
        let (mut list, mut store) = controller();
        let a = list.add("a", Priority::Low, t0(), &mut store).unwrap().unwrap();
        let b = list.add("b", Priority::Low, t0(), &mut store).unwrap().unwrap();
        assert_eq!(a, t0().timestamp_millis());
        assert_eq!(b, a + 1);
    }

    #[test]
    fn clear_completed_keeps_pending_order() {
        let (mut list, mut store) = controller();
        let ids: Vec<i64> = ["a", "b", "c", "d", "e"]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                list.add(text, Priority::Medium, t0() + Duration::seconds(i as i64), &mut store)
                    .unwrap()
                    .unwrap()
            })
            .collect();
        list.toggle(ids[1], &mut store).unwrap();
        list.toggle(ids[3], &mut store).unwrap();

        let removed = list.clear_completed(&AssumeYes, &mut store).unwrap();

        assert_eq!(removed, 2);
        let remaining: Vec<&str> = list.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(remaining, vec!["a", "c", "e"]);
        assert!(!list.stats().show_clear_completed);
    }

    #[test]
    fn declined_clear_keeps_everything() {
        let (mut list, mut store) = controller();
        let id = list.add("a", Priority::Medium, t0(), &mut store).unwrap().unwrap();
        list.toggle(id, &mut store).unwrap();

        let removed = list
            .clear_completed(&ScriptedPrompt::answering([false]), &mut store)
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(list.tasks().len(), 1);
    }

    #[test]
    fn stats_follow_the_filter() {
        let (mut list, mut store) = controller();
        let id = list.add("a", Priority::Medium, t0(), &mut store).unwrap().unwrap();
        assert_eq!(list.stats().label, "1 task");
        list.add("b", Priority::Medium, t0(), &mut store).unwrap();
        assert_eq!(list.stats().label, "2 tasks");
        assert!(!list.stats().show_clear_completed);

        list.toggle(id, &mut store).unwrap();
        list.set_filter(TodoFilter::Pending, &mut store).unwrap();
        assert_eq!(list.stats().label, "1 pending");
        assert_eq!(texts(&list), vec!["b"]);

        list.set_filter(TodoFilter::Completed, &mut store).unwrap();
        assert_eq!(list.stats().label, "1 completed");
        assert!(list.stats().show_clear_completed);
    }

    #[test]
    fn tasks_and_filter_survive_reload() {
        let (mut list, mut store) = controller();
        list.add("persist me", Priority::High, t0(), &mut store).unwrap();
        list.set_filter(TodoFilter::Pending, &mut store).unwrap();

        assert_eq!(
            store.get("todo-filter-widget-1-todo").as_deref(),
            Some("pending")
        );
        let reloaded = TodoController::load(WidgetId::from("widget-1-todo"), &store);
        assert_eq!(reloaded.tasks(), list.tasks());
        assert_eq!(reloaded.filter(), TodoFilter::Pending);
    }

    #[test]
    fn reads_tasks_written_by_the_browser_page() {
        let mut store = MemoryStore::new();
        store
            .set(
                "todo-tasks-widget-9",
                r#"[{"id":1740819600000,"text":"Buy milk","completed":true,"priority":"low","createdAt":"2025-03-01T09:00:00.000Z"}]"#,
            )
            .unwrap();
        store.set("todo-filter-widget-9", "bogus").unwrap();

        let list = TodoController::load(WidgetId::from("widget-9"), &store);
        assert_eq!(list.tasks().len(), 1);
        assert!(list.tasks()[0].completed);
        assert_eq!(list.tasks()[0].priority, Priority::Low);
        assert_eq!(list.filter(), TodoFilter::All);
    }

    #[test]
    fn malformed_tasks_start_empty() {
        let mut store = MemoryStore::new();
        store.set("todo-tasks-widget-9", "{oops").unwrap();
        let list = TodoController::load(WidgetId::from("widget-9"), &store);
        assert!(list.tasks().is_empty());
    }
}
