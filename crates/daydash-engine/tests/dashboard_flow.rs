use std::rc::Rc;

use chrono::{Duration, TimeZone, Utc};
use daydash_engine::host::TIMER_FINISHED_NOTICE;
use daydash_engine::testing::{ManualClock, ManualScheduler, RecordingFeeds, ScriptedPrompt};
use daydash_engine::todo::{Priority, TodoFilter};
use daydash_engine::{
    Clock, Dashboard, DashboardSettings, MemoryStore, Placement, Services, Store, Wakeup, WidgetId,
    WidgetKind, WidgetTag,
};

struct Harness {
    clock: ManualClock,
    scheduler: ManualScheduler,
    prompt: ScriptedPrompt,
    feeds: RecordingFeeds,
}

impl Harness {
    fn new() -> Self {
        Self {
            clock: ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()),
            scheduler: ManualScheduler::new(),
            prompt: ScriptedPrompt::default(),
            feeds: RecordingFeeds::default(),
        }
    }

    fn open(&self, store: MemoryStore) -> Dashboard<MemoryStore> {
        let services = Services {
            clock: Rc::new(self.clock.clone()),
            scheduler: Rc::new(self.scheduler.clone()),
            prompt: Rc::new(self.prompt.clone()),
            feeds: Rc::new(self.feeds.clone()),
        };
        let mut dashboard = Dashboard::new(store, DashboardSettings::default(), services);
        dashboard.load().expect("load dashboard");
        dashboard
    }
}

fn ids(dashboard: &Dashboard<MemoryStore>) -> Vec<String> {
    dashboard
        .widgets()
        .iter()
        .map(|widget| widget.id.to_string())
        .collect()
}

#[test]
fn layout_and_content_survive_a_reload() {
    let harness = Harness::new();
    let mut dashboard = harness.open(MemoryStore::new());

    let todo = dashboard.add_widget("todo").expect("add todo");
    let timer = dashboard.add_widget("timer").expect("add timer");
    let note = dashboard.add_widget("custom-note").expect("add note");
    dashboard
        .move_widget(&todo, Placement::Before, &WidgetId::from("announcements"))
        .expect("move todo");

    dashboard
        .todo_add(&todo, "ship the demo", Priority::High)
        .expect("add task");
    dashboard
        .todo_set_filter(&todo, TodoFilter::Pending)
        .expect("set filter");
    dashboard.note_edit(&note, "bring adapters").expect("edit note");
    dashboard.note_blur(&note).expect("blur note");
    dashboard.timer_start(&timer).expect("start timer");

    let before = ids(&dashboard);
    let store = dashboard.into_store();

    harness.clock.advance(Duration::seconds(30));
    let reloaded = harness.open(store);

    assert_eq!(ids(&reloaded), before);
    assert_eq!(before[0], todo.to_string());
    assert_eq!(
        reloaded.layout().get(&timer).map(|widget| widget.tag),
        Some(WidgetTag::Custom(WidgetKind::Timer))
    );

    let tasks = reloaded.todo(&todo).expect("todo controller");
    assert_eq!(tasks.tasks().len(), 1);
    assert_eq!(tasks.filter(), TodoFilter::Pending);
    assert_eq!(reloaded.note(&note).expect("note").text(), "bring adapters");

    let countdown = reloaded.timer(&timer).expect("timer controller");
    assert!(countdown.is_running());
    assert_eq!(countdown.time_left(), 25 * 60 - 30);
}

#[test]
fn reset_clears_widget_state_and_restores_defaults() {
    let harness = Harness::new();
    let mut dashboard = harness.open(MemoryStore::new());
    let todo = dashboard.add_widget("todo").expect("add todo");
    dashboard.todo_add(&todo, "pack", Priority::Low).expect("add task");
    dashboard
        .note_edit(&WidgetId::from("notes"), "keep me?")
        .expect("edit notes");
    dashboard.note_blur(&WidgetId::from("notes")).expect("blur notes");

    let report = dashboard.reset().expect("reset").expect("confirmed");
    assert_eq!(report.removed_widgets, 6);
    assert_eq!(
        ids(&dashboard),
        ["announcements", "schedule", "weather", "quicklinks", "notes"]
    );
    assert!(dashboard.store().keys().is_empty());
    assert_eq!(dashboard.note(&WidgetId::from("notes")).expect("notes").text(), "");

    // load + reset each refresh both feeds
    assert_eq!(harness.feeds.refreshed().len(), 4);

    let reloaded = harness.open(dashboard.into_store());
    assert_eq!(ids(&reloaded).len(), 5);
}

#[test]
fn unknown_persisted_type_is_skipped_on_restore() {
    let harness = Harness::new();
    let mut store = MemoryStore::new();
    store
        .set(
            "dashboardOrder",
            r#"["weather","widget-1-clock","widget-2-todo","notes"]"#,
        )
        .expect("seed order");
    store
        .set(
            "widgetTypes",
            r#"{"widget-1-clock":"clock","widget-2-todo":"todo"}"#,
        )
        .expect("seed types");

    let dashboard = harness.open(store);
    assert_eq!(ids(&dashboard), ["weather", "widget-2-todo", "notes"]);
    assert!(dashboard.todo(&WidgetId::from("widget-2-todo")).is_ok());
}

#[test]
fn corrupt_layout_falls_back_to_defaults() {
    let harness = Harness::new();
    let mut store = MemoryStore::new();
    store.set("dashboardOrder", "{not json").expect("seed order");

    let dashboard = harness.open(store);
    assert_eq!(ids(&dashboard).len(), 5);
}

#[test]
fn timer_expires_through_wakeups() {
    let harness = Harness::new();
    let mut store = MemoryStore::new();
    store
        .set("widgetTypes", r#"{"widget-9-timer":"timer"}"#)
        .expect("seed types");
    store
        .set("dashboardOrder", r#"["widget-9-timer"]"#)
        .expect("seed order");
    let now_ms = harness.clock.now().timestamp_millis();
    store
        .set(
            "timer-state-widget-9-timer",
            &format!(r#"{{"timeLeft":3,"isRunning":false,"lastUpdate":{now_ms}}}"#),
        )
        .expect("seed timer");

    let mut dashboard = harness.open(store);
    let id = WidgetId::from("widget-9-timer");
    assert!(dashboard.timer_start(&id).expect("start"));

    for _ in 0..3 {
        harness.clock.advance(Duration::seconds(1));
        for wakeup in harness.scheduler.fire() {
            assert_eq!(wakeup, Wakeup::TimerTick(id.clone()));
            dashboard.handle_wakeup(&wakeup).expect("tick");
        }
    }

    assert_eq!(dashboard.timer(&id).expect("timer").time_left(), 0);
    assert_eq!(harness.scheduler.active_count(), 0);
    assert_eq!(harness.prompt.notices(), vec![TIMER_FINISHED_NOTICE.to_string()]);
}
