use std::ffi::OsString;
use std::fs;
use std::path::Path;

use daydash_core::cli::Invocation;
use daydash_core::config::Config;
use daydash_core::datastore::DataStore;
use daydash_engine::Store;
use daydash_engine::timer::TimerState;
use daydash_engine::todo::TodoTask;
use tempfile::tempdir;

fn daydash(dir: &Path, args: &[&str]) -> anyhow::Result<()> {
    let rc = dir.join("dashrc");
    if !rc.exists() {
        fs::write(&rc, "color=off\ntimer.minutes=5\n").expect("write dashrc");
    }
    let mut argv: Vec<OsString> = vec![
        "daydash".into(),
        "--dashrc".into(),
        rc.into_os_string(),
        "--data".into(),
        dir.join("data").into_os_string(),
        "--yes".into(),
    ];
    argv.extend(args.iter().map(OsString::from));
    daydash_core::run(argv)
}

fn store(dir: &Path) -> DataStore {
    DataStore::open(&dir.join("data")).expect("open datastore")
}

fn order(dir: &Path) -> Vec<String> {
    let raw = store(dir).get("dashboardOrder").expect("saved order");
    serde_json::from_str(&raw).expect("order json")
}

#[test]
fn widgets_are_added_edited_and_reset() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path();

    daydash(dir, &["layout"]).expect("layout");
    assert!(store(dir).keys().is_empty());

    daydash(dir, &["add", "todo"]).expect("add todo");
    let saved = order(dir);
    assert_eq!(saved.len(), 6);
    let todo = saved[5].clone();
    assert!(todo.starts_with("widget-"));

    daydash(dir, &["todo", "6", "add", "book", "venue", "pri:high"]).expect("add task");
    daydash(dir, &["todo", &todo, "add", "order", "pizza"]).expect("add task");
    let tasks: Vec<TodoTask> = serde_json::from_str(
        &store(dir).get(&format!("todo-tasks-{todo}")).expect("tasks"),
    )
    .expect("tasks json");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].text, "book venue");

    // position 1 in the visible list is the high priority task
    daydash(dir, &["todo", &todo, "done", "1"]).expect("toggle");
    daydash(dir, &["todo", &todo, "filter", "pending"]).expect("filter");
    assert_eq!(
        store(dir).get(&format!("todo-filter-{todo}")).as_deref(),
        Some("pending")
    );

    daydash(dir, &["move", &todo, "before", "announcements"]).expect("move");
    assert_eq!(order(dir)[0], todo);

    daydash(dir, &["note", "notes", "set", "bring", "adapters"]).expect("note");
    assert_eq!(
        store(dir).get("note-content-notes").as_deref(),
        Some("bring adapters")
    );

    daydash(dir, &["reset"]).expect("reset");
    assert!(store(dir).keys().is_empty());
}

#[test]
fn timer_start_is_recorded_for_later_runs() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path();

    daydash(dir, &["add", "timer"]).expect("add timer");
    let timer = order(dir)[5].clone();
    daydash(dir, &["timer", &timer, "start"]).expect("start");

    let state: TimerState = serde_json::from_str(
        &store(dir).get(&format!("timer-state-{timer}")).expect("timer state"),
    )
    .expect("state json");
    assert!(state.is_running);
    assert_eq!(state.time_left, 5 * 60);

    daydash(dir, &["timer", &timer, "pause"]).expect("pause");
    daydash(dir, &["timer", &timer]).expect("status");
    let state: TimerState = serde_json::from_str(
        &store(dir).get(&format!("timer-state-{timer}")).expect("timer state"),
    )
    .expect("state json");
    assert!(!state.is_running);
}

#[test]
fn bad_input_is_reported() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path();

    let err = daydash(dir, &["add", "clock"]).expect_err("unknown type");
    assert!(format!("{err:#}").contains("unknown widget type: clock"));
    assert!(daydash(dir, &["frobnicate"]).is_err());
    assert!(daydash(dir, &["todo", "weather"]).is_err());
}

#[test]
fn no_command_runs_the_default() {
    let inv = Invocation::parse(&Config::defaults(), vec![]).expect("parse");
    assert_eq!(inv.command, "layout");

    let inv = Invocation::parse(&Config::defaults(), vec!["ti".into(), "3".into()]).expect("parse");
    assert_eq!(inv.command, "timer");
    assert_eq!(inv.command_args, vec!["3".to_string()]);
}
