//! Restoring the default dashboard.

use tracing::info;

use crate::error::StoreError;
use crate::factory::WidgetFactory;
use crate::host::{ExternalFeeds, Feed};
use crate::layout::LayoutManager;
use crate::store::{Store, is_widget_scoped_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    pub cleared_keys: usize,
    pub removed_widgets: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResetCoordinator {
    factory: WidgetFactory,
}

impl ResetCoordinator {
    /// Wipes every widget-scoped key and swaps the mounted set for the five
    /// defaults. The default order is not written back; the next load finds
    /// no saved layout and keeps the defaults as they are.
    ///
    /// Controllers are owned by the caller, which must drop and rebind them.
    #[tracing::instrument(skip_all)]
    pub fn reset<S: Store + ?Sized>(
        &self,
        store: &mut S,
        layout: &mut LayoutManager,
        feeds: &dyn ExternalFeeds,
    ) -> Result<ResetReport, StoreError> {
        let cleared_keys = store.remove_matching(&is_widget_scoped_key)?;
        let removed_widgets = layout.widgets().len();
        layout.replace_all(self.factory.default_widgets());

        feeds.refresh(Feed::Weather);
        feeds.refresh(Feed::Schedule);

        info!(cleared_keys, removed_widgets, "dashboard reset to defaults");
        Ok(ResetReport {
            cleared_keys,
            removed_widgets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::RecordingFeeds;
    use crate::widget::{DefaultWidget, WidgetId};

    #[test]
    fn clears_widget_keys_and_keeps_unrelated_ones() {
        let mut store = MemoryStore::new();
        for key in [
            "dashboardOrder",
            "widgetTypes",
            "note-content-notes",
            "todo-tasks-widget-1-a",
            "todo-filter-widget-1-a",
            "timer-state-widget-2-b",
            "theme",
        ] {
            store.set(key, "x").unwrap();
        }
        let mut layout = LayoutManager::new(Vec::new());
        let feeds = RecordingFeeds::default();

        let report = ResetCoordinator::default()
            .reset(&mut store, &mut layout, &feeds)
            .unwrap();

        assert_eq!(report.cleared_keys, 6);
        assert_eq!(store.keys(), vec!["theme".to_string()]);
        let ids: Vec<WidgetId> = DefaultWidget::ALL
            .into_iter()
            .map(|which| WidgetId::from(which.id()))
            .collect();
        assert_eq!(layout.ids(), ids);
        assert_eq!(feeds.refreshed(), vec![Feed::Weather, Feed::Schedule]);
    }
}
