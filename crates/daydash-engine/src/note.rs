//! Free-text note widget controller with quiet-period saving.

use tracing::debug;

use crate::error::StoreError;
use crate::settings::DashboardSettings;
use crate::store::{Store, note_content_key};
use crate::timing::{Scheduler, TaskGuard, Wakeup};
use crate::widget::WidgetId;

#[derive(Debug)]
pub struct NoteController {
    id: WidgetId,
    text: String,
    settings: DashboardSettings,
    pending_save: Option<TaskGuard>,
}

impl NoteController {
    pub fn load<S: Store + ?Sized>(id: WidgetId, settings: &DashboardSettings, store: &S) -> Self {
        let text = store.get(&note_content_key(&id)).unwrap_or_default();
        debug!(widget = %id, chars = text.chars().count(), "loaded note");
        Self {
            id,
            text,
            settings: settings.clone(),
            pending_save: None,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save.is_some()
    }

    /// Records an edit and restarts the quiet period; at most one save is
    /// ever pending.
    pub fn edit(&mut self, text: impl Into<String>, scheduler: &dyn Scheduler) {
        self.text = text.into();
        self.cancel_pending();
        self.pending_save = Some(scheduler.after(
            self.settings.note_debounce(),
            Wakeup::NoteSave(self.id.clone()),
        ));
    }

    /// The quiet period ended. Returns whether anything was written.
    pub fn quiet_period_elapsed<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<bool, StoreError> {
        // A wakeup racing a blur finds nothing pending.
        if self.pending_save.take().is_none() {
            return Ok(false);
        }
        self.save(store)?;
        Ok(true)
    }

    /// Focus left the field: drop the pending save and write now.
    pub fn blur<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<(), StoreError> {
        self.cancel_pending();
        self.save(store)
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending_save.take() {
            pending.cancel();
        }
    }

    fn save<S: Store + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        debug!(widget = %self.id, "saving note");
        store.set(&note_content_key(&self.id), &self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::ManualScheduler;

    /// Counts writes so debounce coalescing is observable.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: Vec<(String, String)>,
    }

    impl Store for CountingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes.push((key.to_string(), value.to_string()));
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Vec<String> {
            self.inner.keys()
        }
    }

    fn note(store: &CountingStore) -> NoteController {
        NoteController::load(WidgetId::from("notes"), &DashboardSettings::default(), store)
    }

    #[test]
    fn two_quick_edits_write_once_with_final_text() {
        let mut store = CountingStore::default();
        let scheduler = ManualScheduler::new();
        let mut note = note(&store);

        note.edit("hel", &scheduler);
        note.edit("hello", &scheduler);
        assert_eq!(scheduler.active_count(), 1);

        for wakeup in scheduler.fire() {
            assert_eq!(wakeup, Wakeup::NoteSave(WidgetId::from("notes")));
            note.quiet_period_elapsed(&mut store).unwrap();
        }

        assert_eq!(
            store.writes.as_slice(),
            &[("note-content-notes".to_string(), "hello".to_string())]
        );
        assert!(!note.has_pending_save());
    }

    #[test]
    fn blur_writes_immediately_and_cancels_the_quiet_period() {
        let mut store = CountingStore::default();
        let scheduler = ManualScheduler::new();
        let mut note = note(&store);

        note.edit("remember the demo", &scheduler);
        note.blur(&mut store).unwrap();

        assert_eq!(scheduler.active_count(), 0);
        assert!(scheduler.fire().is_empty());
        assert!(!note.quiet_period_elapsed(&mut store).unwrap());
        assert_eq!(store.writes.len(), 1);
        assert_eq!(
            store.get("note-content-notes").as_deref(),
            Some("remember the demo")
        );
    }

    #[test]
    fn saved_text_loads_on_mount() {
        let mut store = CountingStore::default();
        store.set("note-content-notes", "from last time").unwrap();
        assert_eq!(note(&store).text(), "from last time");
    }
}
