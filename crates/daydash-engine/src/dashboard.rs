//! The dashboard: store, layout, one controller per bound widget, and the
//! host seams. Every user action enters through here.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::{DashboardError, DashboardResult, StoreError};
use crate::host::{AssumeYes, ExternalFeeds, Feed, NoFeeds, Prompt, RESET_LAYOUT_PROMPT};
use crate::layout::{LayoutManager, Placement, RestoreReport, WidgetRect};
use crate::note::NoteController;
use crate::reset::{ResetCoordinator, ResetReport};
use crate::settings::DashboardSettings;
use crate::store::Store;
use crate::timer::{TickOutcome, TimerController};
use crate::timing::{Clock, NoopScheduler, Scheduler, SystemClock, Wakeup};
use crate::todo::{Priority, TodoController, TodoFilter};
use crate::widget::{ControllerKind, Widget, WidgetId};

/// Host collaborators shared by every controller.
#[derive(Clone)]
pub struct Services {
    pub clock: Rc<dyn Clock>,
    pub scheduler: Rc<dyn Scheduler>,
    pub prompt: Rc<dyn Prompt>,
    pub feeds: Rc<dyn ExternalFeeds>,
}

impl Services {
    /// Wall clock, nothing scheduled, every prompt confirmed, no feeds.
    pub fn headless() -> Self {
        Self {
            clock: Rc::new(SystemClock),
            scheduler: Rc::new(NoopScheduler),
            prompt: Rc::new(AssumeYes),
            feeds: Rc::new(NoFeeds),
        }
    }

    pub fn with_prompt(mut self, prompt: Rc<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }
}

#[derive(Debug)]
pub enum Controller {
    Note(NoteController),
    Todo(TodoController),
    Timer(TimerController),
}

impl Controller {
    pub fn kind(&self) -> ControllerKind {
        match self {
            Controller::Note(_) => ControllerKind::Note,
            Controller::Todo(_) => ControllerKind::Todo,
            Controller::Timer(_) => ControllerKind::Timer,
        }
    }
}

pub struct Dashboard<S: Store> {
    store: S,
    settings: DashboardSettings,
    services: Services,
    layout: LayoutManager,
    controllers: BTreeMap<WidgetId, Controller>,
    reset: ResetCoordinator,
}

impl<S: Store> Dashboard<S> {
    /// A dashboard showing the five defaults. Nothing is read until
    /// [`Dashboard::load`].
    pub fn new(store: S, settings: DashboardSettings, services: Services) -> Self {
        Self {
            store,
            settings: settings.sanitized(),
            services,
            layout: LayoutManager::with_defaults(),
            controllers: BTreeMap::new(),
            reset: ResetCoordinator::default(),
        }
    }

    /// Restores the saved layout, binds every widget to its controller and
    /// refreshes the external feeds.
    #[tracing::instrument(skip(self))]
    pub fn load(&mut self) -> DashboardResult<RestoreReport> {
        let report = self.layout.restore(&self.store, self.services.clock.now());
        self.bind_all()?;
        self.refresh_feeds();
        Ok(report)
    }

    pub fn widgets(&self) -> &[Widget] {
        self.layout.widgets()
    }

    pub fn layout(&self) -> &LayoutManager {
        &self.layout
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn controller(&self, id: &WidgetId) -> Option<&Controller> {
        self.controllers.get(id)
    }

    pub fn add_widget(&mut self, tag: &str) -> DashboardResult<WidgetId> {
        let id = self
            .layout
            .add(tag, &mut self.store, self.services.clock.now())?;
        if let Some(widget) = self.layout.get(&id).cloned() {
            self.bind(&widget)?;
        }
        Ok(id)
    }

    /// Removes after confirmation. Stored widget content is left behind.
    pub fn remove_widget(&mut self, id: &WidgetId) -> DashboardResult<bool> {
        let removed = self
            .layout
            .remove(id, self.services.prompt.as_ref(), &mut self.store)?;
        if removed.is_none() {
            return Ok(false);
        }
        // Dropping the controller cancels its scheduled tasks.
        self.controllers.remove(id);
        Ok(true)
    }

    pub fn begin_drag(&mut self, id: &WidgetId) -> bool {
        self.layout.begin_drag(id)
    }

    pub fn drag_over(&mut self, pointer_y: f64, candidate: &WidgetId, rect: WidgetRect) -> bool {
        self.layout.drag_over(pointer_y, candidate, rect)
    }

    pub fn drop_dragged(&mut self) -> DashboardResult<()> {
        Ok(self.layout.drop_dragged(&mut self.store)?)
    }

    pub fn cancel_drag(&mut self) {
        self.layout.cancel_drag();
    }

    /// Moves `id` next to `target` and persists when the order changed.
    pub fn move_widget(
        &mut self,
        id: &WidgetId,
        placement: Placement,
        target: &WidgetId,
    ) -> DashboardResult<bool> {
        let moved = self.layout.move_relative(id, placement, target)?;
        if moved {
            self.layout.persist(&mut self.store)?;
        }
        Ok(moved)
    }

    /// Back to the default dashboard once the user confirms.
    pub fn reset(&mut self) -> DashboardResult<Option<ResetReport>> {
        if !self.services.prompt.confirm(RESET_LAYOUT_PROMPT) {
            debug!("reset declined");
            return Ok(None);
        }
        self.controllers.clear();
        let report = self.reset.reset(
            &mut self.store,
            &mut self.layout,
            self.services.feeds.as_ref(),
        )?;
        self.bind_all()?;
        Ok(Some(report))
    }

    /// Delivers a fired wakeup. Returns whether any state changed; wakeups
    /// for widgets that are gone are ignored.
    pub fn handle_wakeup(&mut self, wakeup: &Wakeup) -> DashboardResult<bool> {
        let Some(controller) = self.controllers.get_mut(wakeup.widget()) else {
            debug!(?wakeup, "wakeup for unbound widget");
            return Ok(false);
        };
        let changed = match (wakeup, controller) {
            (Wakeup::TimerTick(_), Controller::Timer(timer)) => {
                let outcome = timer.tick(
                    &mut self.store,
                    self.services.clock.as_ref(),
                    self.services.prompt.as_ref(),
                )?;
                outcome != TickOutcome::Ignored
            }
            (Wakeup::NoteSave(_), Controller::Note(note)) => note.quiet_period_elapsed(&mut self.store)?,
            (wakeup, controller) => {
                warn!(?wakeup, kind = ?controller.kind(), "wakeup does not match controller");
                false
            }
        };
        Ok(changed)
    }

    pub fn note(&self, id: &WidgetId) -> DashboardResult<&NoteController> {
        match self.lookup(id, "note")? {
            Controller::Note(note) => Ok(note),
            _ => Err(wrong_kind(id, "note")),
        }
    }

    pub fn note_edit(&mut self, id: &WidgetId, text: &str) -> DashboardResult<()> {
        let scheduler = self.services.scheduler.clone();
        note_mut(&mut self.controllers, id)?.edit(text, scheduler.as_ref());
        Ok(())
    }

    pub fn note_blur(&mut self, id: &WidgetId) -> DashboardResult<()> {
        note_mut(&mut self.controllers, id)?.blur(&mut self.store)?;
        Ok(())
    }

    pub fn todo(&self, id: &WidgetId) -> DashboardResult<&TodoController> {
        match self.lookup(id, "todo")? {
            Controller::Todo(todo) => Ok(todo),
            _ => Err(wrong_kind(id, "todo")),
        }
    }

    pub fn todo_add(&mut self, id: &WidgetId, text: &str, priority: Priority) -> DashboardResult<Option<i64>> {
        let now = self.services.clock.now();
        Ok(todo_mut(&mut self.controllers, id)?.add(text, priority, now, &mut self.store)?)
    }

    pub fn todo_toggle(&mut self, id: &WidgetId, task_id: i64) -> DashboardResult<bool> {
        Ok(todo_mut(&mut self.controllers, id)?.toggle(task_id, &mut self.store)?)
    }

    pub fn todo_remove(&mut self, id: &WidgetId, task_id: i64) -> DashboardResult<bool> {
        Ok(todo_mut(&mut self.controllers, id)?.remove(task_id, &mut self.store)?)
    }

    pub fn todo_clear_completed(&mut self, id: &WidgetId) -> DashboardResult<usize> {
        let prompt = self.services.prompt.clone();
        Ok(todo_mut(&mut self.controllers, id)?.clear_completed(prompt.as_ref(), &mut self.store)?)
    }

    pub fn todo_set_filter(&mut self, id: &WidgetId, filter: TodoFilter) -> DashboardResult<()> {
        Ok(todo_mut(&mut self.controllers, id)?.set_filter(filter, &mut self.store)?)
    }

    pub fn timer(&self, id: &WidgetId) -> DashboardResult<&TimerController> {
        match self.lookup(id, "timer")? {
            Controller::Timer(timer) => Ok(timer),
            _ => Err(wrong_kind(id, "timer")),
        }
    }

    pub fn timer_start(&mut self, id: &WidgetId) -> DashboardResult<bool> {
        let services = self.services.clone();
        Ok(timer_mut(&mut self.controllers, id)?.start(
            &mut self.store,
            services.clock.as_ref(),
            services.scheduler.as_ref(),
        )?)
    }

    pub fn timer_pause(&mut self, id: &WidgetId) -> DashboardResult<bool> {
        let clock = self.services.clock.clone();
        Ok(timer_mut(&mut self.controllers, id)?.pause(&mut self.store, clock.as_ref())?)
    }

    pub fn timer_reset(&mut self, id: &WidgetId) -> DashboardResult<()> {
        let clock = self.services.clock.clone();
        Ok(timer_mut(&mut self.controllers, id)?.reset(&mut self.store, clock.as_ref())?)
    }

    fn lookup(&self, id: &WidgetId, expected: &'static str) -> DashboardResult<&Controller> {
        match self.controllers.get(id) {
            Some(controller) => Ok(controller),
            None if self.layout.get(id).is_some() => Err(wrong_kind(id, expected)),
            None => Err(DashboardError::WidgetNotFound(id.clone())),
        }
    }

    fn bind_all(&mut self) -> Result<(), StoreError> {
        self.controllers.clear();
        let widgets = self.layout.widgets().to_vec();
        for widget in &widgets {
            self.bind(widget)?;
        }
        info!(
            widgets = widgets.len(),
            controllers = self.controllers.len(),
            "bound widget controllers"
        );
        Ok(())
    }

    fn bind(&mut self, widget: &Widget) -> Result<(), StoreError> {
        let Some(kind) = widget.tag.controller() else {
            return Ok(());
        };
        let id = widget.id.clone();
        let controller = match kind {
            ControllerKind::Note => {
                Controller::Note(NoteController::load(id.clone(), &self.settings, &self.store))
            }
            ControllerKind::Todo => Controller::Todo(TodoController::load(id.clone(), &self.store)),
            ControllerKind::Timer => Controller::Timer(TimerController::load(
                id.clone(),
                &self.settings,
                &mut self.store,
                self.services.clock.as_ref(),
                self.services.scheduler.as_ref(),
            )?),
        };
        self.controllers.insert(id, controller);
        Ok(())
    }

    fn refresh_feeds(&self) {
        self.services.feeds.refresh(Feed::Weather);
        self.services.feeds.refresh(Feed::Schedule);
    }
}

fn wrong_kind(id: &WidgetId, expected: &'static str) -> DashboardError {
    DashboardError::WrongWidgetKind {
        id: id.clone(),
        expected,
    }
}

fn bound<'a>(
    controllers: &'a mut BTreeMap<WidgetId, Controller>,
    id: &WidgetId,
) -> DashboardResult<&'a mut Controller> {
    controllers
        .get_mut(id)
        .ok_or_else(|| DashboardError::WidgetNotFound(id.clone()))
}

fn note_mut<'a>(
    controllers: &'a mut BTreeMap<WidgetId, Controller>,
    id: &WidgetId,
) -> DashboardResult<&'a mut NoteController> {
    match bound(controllers, id)? {
        Controller::Note(note) => Ok(note),
        _ => Err(wrong_kind(id, "note")),
    }
}

fn todo_mut<'a>(
    controllers: &'a mut BTreeMap<WidgetId, Controller>,
    id: &WidgetId,
) -> DashboardResult<&'a mut TodoController> {
    match bound(controllers, id)? {
        Controller::Todo(todo) => Ok(todo),
        _ => Err(wrong_kind(id, "todo")),
    }
}

fn timer_mut<'a>(
    controllers: &'a mut BTreeMap<WidgetId, Controller>,
    id: &WidgetId,
) -> DashboardResult<&'a mut TimerController> {
    match bound(controllers, id)? {
        Controller::Timer(timer) => Ok(timer),
        _ => Err(wrong_kind(id, "timer")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{ManualClock, ManualScheduler, RecordingFeeds, ScriptedPrompt};

    fn services(prompt: ScriptedPrompt, scheduler: ManualScheduler, feeds: RecordingFeeds) -> Services {
        Services {
            clock: Rc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())),
            scheduler: Rc::new(scheduler),
            prompt: Rc::new(prompt),
            feeds: Rc::new(feeds),
        }
    }

    #[test]
    fn load_binds_default_notes_and_refreshes_feeds() {
        let feeds = RecordingFeeds::default();
        let mut dashboard = Dashboard::new(
            MemoryStore::new(),
            DashboardSettings::default(),
            services(ScriptedPrompt::default(), ManualScheduler::new(), feeds.clone()),
        );
        let report = dashboard.load().unwrap();

        assert!(!report.applied);
        assert_eq!(dashboard.widgets().len(), 5);
        assert!(dashboard.note(&WidgetId::from("notes")).is_ok());
        assert!(matches!(
            dashboard.note(&WidgetId::from("weather")),
            Err(DashboardError::WrongWidgetKind { .. })
        ));
        assert!(matches!(
            dashboard.todo(&WidgetId::from("missing")),
            Err(DashboardError::WidgetNotFound(_))
        ));
        assert_eq!(feeds.refreshed(), vec![Feed::Weather, Feed::Schedule]);
    }

    #[test]
    fn removing_a_timer_cancels_its_tick() {
        let scheduler = ManualScheduler::new();
        let mut dashboard = Dashboard::new(
            MemoryStore::new(),
            DashboardSettings::default(),
            services(ScriptedPrompt::default(), scheduler.clone(), RecordingFeeds::default()),
        );
        dashboard.load().unwrap();
        let id = dashboard.add_widget("timer").unwrap();
        assert!(dashboard.timer_start(&id).unwrap());
        assert_eq!(scheduler.active_count(), 1);

        assert!(dashboard.remove_widget(&id).unwrap());
        assert_eq!(scheduler.active_count(), 0);
        assert!(!dashboard.handle_wakeup(&Wakeup::TimerTick(id)).unwrap());
    }

    #[test]
    fn note_wakeup_saves_the_latest_text() {
        let scheduler = ManualScheduler::new();
        let mut dashboard = Dashboard::new(
            MemoryStore::new(),
            DashboardSettings::default(),
            services(ScriptedPrompt::default(), scheduler.clone(), RecordingFeeds::default()),
        );
        dashboard.load().unwrap();
        let notes = WidgetId::from("notes");
        dashboard.note_edit(&notes, "draft").unwrap();
        dashboard.note_edit(&notes, "draft two").unwrap();

        for wakeup in scheduler.fire() {
            assert!(dashboard.handle_wakeup(&wakeup).unwrap());
        }
        assert_eq!(
            dashboard.store().get("note-content-notes").as_deref(),
            Some("draft two")
        );
    }

    #[test]
    fn declined_reset_changes_nothing() {
        let mut dashboard = Dashboard::new(
            MemoryStore::new(),
            DashboardSettings::default(),
            services(
                ScriptedPrompt::answering([false]),
                ManualScheduler::new(),
                RecordingFeeds::default(),
            ),
        );
        dashboard.load().unwrap();
        let id = dashboard.add_widget("todo").unwrap();

        assert_eq!(dashboard.reset().unwrap(), None);
        assert!(dashboard.layout().get(&id).is_some());
        assert!(dashboard.store().get("dashboardOrder").is_some());
    }
}
