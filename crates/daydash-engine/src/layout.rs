//! Ordered set of mounted widgets, drag reordering and layout persistence.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{DashboardError, DashboardResult, StoreError};
use crate::factory::WidgetFactory;
use crate::host::{Prompt, REMOVE_WIDGET_PROMPT};
use crate::store::{self, DASHBOARD_ORDER_KEY, Store, WIDGET_TYPES_KEY};
use crate::widget::{Widget, WidgetId, WidgetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Vertical extent of a widget on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetRect {
    pub top: f64,
    pub bottom: f64,
}

impl WidgetRect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Past the vertical midpoint means "after". There is no hysteresis, so a
    /// pointer wobbling around the midpoint flips the placement every move.
    pub fn placement_for(&self, pointer_y: f64) -> Placement {
        let height = self.bottom - self.top;
        if height <= 0.0 {
            return Placement::Before;
        }
        if (pointer_y - self.top) / height > 0.5 {
            Placement::After
        } else {
            Placement::Before
        }
    }
}

/// Outcome of [`LayoutManager::restore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// False when no layout was ever persisted.
    pub applied: bool,
    /// Widgets reused from the current markup.
    pub reused: Vec<WidgetId>,
    /// Widgets rebuilt from the type map.
    pub rebuilt: Vec<WidgetId>,
    /// Persisted ids that resolved to nothing.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutManager {
    widgets: Vec<Widget>,
    dragging: Option<WidgetId>,
    factory: WidgetFactory,
}

impl LayoutManager {
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self {
            widgets,
            dragging: None,
            factory: WidgetFactory,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(WidgetFactory.default_widgets())
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.widgets.iter().map(|widget| widget.id.clone()).collect()
    }

    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|widget| &widget.id == id)
    }

    pub fn position(&self, id: &WidgetId) -> Option<usize> {
        self.widgets.iter().position(|widget| &widget.id == id)
    }

    pub fn dragging(&self) -> Option<&WidgetId> {
        self.dragging.as_ref()
    }

    /// Persisted kinds of the mounted custom widgets, keyed by id.
    pub fn type_map(&self) -> BTreeMap<String, WidgetKind> {
        self.widgets
            .iter()
            .filter_map(|widget| {
                widget
                    .tag
                    .persisted_kind()
                    .map(|kind| (widget.id.to_string(), kind))
            })
            .collect()
    }

    /// Re-applies the persisted order.
    ///
    /// Ids matching a mounted widget reuse it; ids with a known type are
    /// rebuilt through the factory; anything else is dropped, as are mounted
    /// widgets missing from the saved order.
    #[tracing::instrument(skip(self, store, now))]
    pub fn restore<S: Store + ?Sized>(&mut self, store: &S, now: DateTime<Utc>) -> RestoreReport {
        let saved: Option<Vec<String>> = store::get_json(store, DASHBOARD_ORDER_KEY);
        let Some(saved) = saved else {
            debug!("no saved layout; keeping default order");
            return RestoreReport::default();
        };
        let types: BTreeMap<String, String> =
            store::get_json(store, WIDGET_TYPES_KEY).unwrap_or_default();

        let mut mounted: HashMap<WidgetId, Widget> = self
            .widgets
            .drain(..)
            .map(|widget| (widget.id.clone(), widget))
            .collect();
        let mut placed: HashSet<WidgetId> = HashSet::new();
        let mut report = RestoreReport {
            applied: true,
            ..RestoreReport::default()
        };

        for raw_id in saved {
            let id = WidgetId::from(raw_id.as_str());
            if placed.contains(&id) {
                debug!(widget = %id, "duplicate id in saved layout");
                continue;
            }

            if let Some(widget) = mounted.remove(&id) {
                report.reused.push(id.clone());
                placed.insert(id);
                self.widgets.push(widget);
                continue;
            }

            let Some(tag) = types.get(&raw_id) else {
                debug!(widget = %id, "saved id has no widget or type; dropping");
                report.skipped.push(raw_id);
                continue;
            };

            match self.factory.create(tag, Some(id.clone()), now) {
                Ok(widget) => {
                    report.rebuilt.push(id.clone());
                    placed.insert(id);
                    self.widgets.push(widget);
                }
                Err(error) => {
                    warn!(widget = %id, %error, "cannot rebuild saved widget; dropping");
                    report.skipped.push(raw_id);
                }
            }
        }

        info!(
            reused = report.reused.len(),
            rebuilt = report.rebuilt.len(),
            skipped = report.skipped.len(),
            unplaced = mounted.len(),
            "restored layout"
        );
        report
    }

    /// Writes the current order and the custom widget type map.
    #[tracing::instrument(skip(self, store))]
    pub fn persist<S: Store + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let order: Vec<&str> = self.widgets.iter().map(|widget| widget.id.as_str()).collect();
        store::set_json(store, DASHBOARD_ORDER_KEY, &order)?;
        store::set_json(store, WIDGET_TYPES_KEY, &self.type_map())?;
        debug!(count = order.len(), "persisted layout");
        Ok(())
    }

    /// Starts a drag; only mounted, draggable widgets qualify.
    pub fn begin_drag(&mut self, id: &WidgetId) -> bool {
        match self.get(id) {
            Some(widget) if widget.draggable => {
                debug!(widget = %id, "drag started");
                self.dragging = Some(id.clone());
                true
            }
            _ => false,
        }
    }

    /// Moves the dragged widget before or after `candidate` depending on which
    /// half of the candidate the pointer is in. Returns whether the order
    /// changed.
    pub fn drag_over(&mut self, pointer_y: f64, candidate: &WidgetId, rect: WidgetRect) -> bool {
        let Some(dragged) = self.dragging.clone() else {
            return false;
        };
        if &dragged == candidate {
            return false;
        }
        let placement = rect.placement_for(pointer_y);
        self.place(&dragged, placement, candidate)
    }

    /// Ends the drag and persists whatever order the drag produced.
    pub fn drop_dragged<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<(), StoreError> {
        if let Some(id) = self.dragging.take() {
            debug!(widget = %id, "drag dropped");
        }
        self.persist(store)
    }

    /// Clears the drag without persisting.
    pub fn cancel_drag(&mut self) {
        if let Some(id) = self.dragging.take() {
            debug!(widget = %id, "drag cancelled");
        }
    }

    /// Places `id` next to `target`; the primitive behind drag-over.
    pub fn move_relative(
        &mut self,
        id: &WidgetId,
        placement: Placement,
        target: &WidgetId,
    ) -> DashboardResult<bool> {
        if self.position(id).is_none() {
            return Err(DashboardError::WidgetNotFound(id.clone()));
        }
        if self.position(target).is_none() {
            return Err(DashboardError::WidgetNotFound(target.clone()));
        }
        Ok(self.place(id, placement, target))
    }

    fn place(&mut self, id: &WidgetId, placement: Placement, target: &WidgetId) -> bool {
        if id == target {
            return false;
        }
        let Some(from) = self.position(id) else {
            return false;
        };
        let before = self.ids();

        let widget = self.widgets.remove(from);
        let Some(target_idx) = self.position(target) else {
            self.widgets.insert(from, widget);
            return false;
        };
        let insert_at = match placement {
            Placement::Before => target_idx,
            Placement::After => target_idx + 1,
        };
        self.widgets.insert(insert_at, widget);

        self.ids() != before
    }

    /// Appends a widget without persisting (restore and reset paths).
    pub fn mount(&mut self, widget: Widget) {
        self.widgets.push(widget);
    }

    /// Builds a new widget of type `tag`, appends it, and persists the layout.
    #[tracing::instrument(skip(self, store, now))]
    pub fn add<S: Store + ?Sized>(
        &mut self,
        tag: &str,
        store: &mut S,
        now: DateTime<Utc>,
    ) -> DashboardResult<WidgetId> {
        let widget = self.factory.create(tag, None, now)?;
        let id = widget.id.clone();
        self.widgets.push(widget);
        self.persist(store)?;
        info!(widget = %id, tag, "added widget");
        Ok(id)
    }

    /// Removes a widget once the user confirms. Returns `None` when declined.
    #[tracing::instrument(skip(self, prompt, store))]
    pub fn remove<S: Store + ?Sized>(
        &mut self,
        id: &WidgetId,
        prompt: &dyn Prompt,
        store: &mut S,
    ) -> DashboardResult<Option<Widget>> {
        let Some(idx) = self.position(id) else {
            return Err(DashboardError::WidgetNotFound(id.clone()));
        };
        if !prompt.confirm(REMOVE_WIDGET_PROMPT) {
            debug!(widget = %id, "removal declined");
            return Ok(None);
        }

        let widget = self.widgets.remove(idx);
        if self.dragging.as_ref() == Some(id) {
            self.dragging = None;
        }
        self.persist(store)?;
        info!(widget = %id, "removed widget");
        Ok(Some(widget))
    }

    /// Swaps in a whole new widget set without persisting.
    pub fn replace_all(&mut self, widgets: Vec<Widget>) {
        self.dragging = None;
        self.widgets = widgets;
    }
}
