use std::collections::BTreeMap;

use anyhow::{Context, anyhow};
use daydash_engine::todo::{Priority, TodoController, TodoFilter};
use daydash_engine::widget::WidgetKind;
use daydash_engine::{Dashboard, Placement, Store, WidgetId};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::config::Config;
use crate::datastore::DataStore;
use crate::render::Renderer;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "layout",
        "add",
        "remove",
        "move",
        "reset",
        "todo",
        "timer",
        "note",
        "keys",
        "export",
        "_commands",
        "_show",
        "help",
        "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(dashboard, cfg, renderer, inv))]
pub fn dispatch(
    dashboard: &mut Dashboard<DataStore>,
    cfg: &Config,
    renderer: &Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let command = inv.command.as_str();
    let args = inv.command_args.as_slice();

    debug!(command, ?args, "dispatching command");

    match command {
        "layout" => cmd_layout(dashboard, renderer, args),
        "add" => cmd_add(dashboard, args),
        "remove" => cmd_remove(dashboard, args),
        "move" => cmd_move(dashboard, renderer, args),
        "reset" => cmd_reset(dashboard, renderer),
        "todo" => cmd_todo(dashboard, renderer, args),
        "timer" => cmd_timer(dashboard, renderer, args),
        "note" => cmd_note(dashboard, args),
        "keys" => cmd_keys(dashboard),
        "export" => cmd_export(dashboard),
        "_commands" => cmd_commands(),
        "_show" => cmd_show(cfg),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[derive(Debug, Serialize)]
struct WidgetExport {
    position: usize,
    id: String,
    #[serde(rename = "type")]
    kind: Option<WidgetKind>,
    title: String,
}

fn cmd_layout(dashboard: &Dashboard<DataStore>, renderer: &Renderer, args: &[String]) -> anyhow::Result<()> {
    if args.first().map(String::as_str) == Some("json") {
        let rows: Vec<WidgetExport> = dashboard
            .widgets()
            .iter()
            .enumerate()
            .map(|(idx, widget)| WidgetExport {
                position: idx + 1,
                id: widget.id.to_string(),
                kind: widget.tag.persisted_kind(),
                title: widget.title.clone(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    renderer.print_layout(dashboard.widgets())
}

#[instrument(skip(dashboard, args))]
fn cmd_add(dashboard: &mut Dashboard<DataStore>, args: &[String]) -> anyhow::Result<()> {
    info!("command add");
    let tag = args.first().ok_or_else(|| {
        anyhow!("usage: add <custom-note|links|todo|timer>")
    })?;
    let id = dashboard
        .add_widget(tag)
        .with_context(|| format!("cannot add widget of type {tag}"))?;
    println!("Added {tag} widget {id}.");
    Ok(())
}

#[instrument(skip(dashboard, args))]
fn cmd_remove(dashboard: &mut Dashboard<DataStore>, args: &[String]) -> anyhow::Result<()> {
    info!("command remove");
    let token = args.first().ok_or_else(|| anyhow!("usage: remove <widget>"))?;
    let id = resolve_widget(dashboard, token)?;
    if dashboard.remove_widget(&id)? {
        println!("Removed widget {id}.");
    } else {
        println!("Kept widget {id}.");
    }
    Ok(())
}

#[instrument(skip(dashboard, renderer, args))]
fn cmd_move(dashboard: &mut Dashboard<DataStore>, renderer: &Renderer, args: &[String]) -> anyhow::Result<()> {
    info!("command move");
    let [id, placement, target] = args else {
        return Err(anyhow!("usage: move <widget> <before|after> <widget>"));
    };
    let id = resolve_widget(dashboard, id)?;
    let target = resolve_widget(dashboard, target)?;
    let placement = parse_placement(placement)?;

    if !dashboard.move_widget(&id, placement, &target)? {
        println!("Layout unchanged.");
    }
    renderer.print_layout(dashboard.widgets())
}

#[instrument(skip(dashboard, renderer))]
fn cmd_reset(dashboard: &mut Dashboard<DataStore>, renderer: &Renderer) -> anyhow::Result<()> {
    info!("command reset");
    let Some(report) = dashboard.reset()? else {
        println!("Reset cancelled.");
        return Ok(());
    };
    println!(
        "Reset dashboard: removed {} widget(s), cleared {} key(s).",
        report.removed_widgets, report.cleared_keys
    );
    renderer.print_layout(dashboard.widgets())
}

#[instrument(skip(dashboard, renderer, args))]
fn cmd_todo(dashboard: &mut Dashboard<DataStore>, renderer: &Renderer, args: &[String]) -> anyhow::Result<()> {
    let (widget, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("usage: todo <widget> [list|add|toggle|rm|clear|filter]"))?;
    let id = resolve_widget(dashboard, widget)?;
    let (sub, sub_args) = match rest.split_first() {
        Some((sub, sub_args)) => (sub.as_str(), sub_args),
        None => ("list", rest),
    };
    debug!(widget = %id, sub, "todo subcommand");

    match sub {
        "list" => {}
        "add" => {
            let (text, priority) = parse_task_args(sub_args)?;
            match dashboard.todo_add(&id, &text, priority)? {
                Some(task) => println!("Added task {task}."),
                None => println!("Nothing to add."),
            }
        }
        "toggle" | "done" => {
            let task = resolve_task(dashboard.todo(&id)?, sub_args)?;
            if !dashboard.todo_toggle(&id, task)? {
                return Err(anyhow!("no task {task}"));
            }
        }
        "rm" | "remove" | "delete" => {
            let task = resolve_task(dashboard.todo(&id)?, sub_args)?;
            if !dashboard.todo_remove(&id, task)? {
                return Err(anyhow!("no task {task}"));
            }
        }
        "clear" => {
            let removed = dashboard.todo_clear_completed(&id)?;
            println!("Cleared {removed} completed task(s).");
        }
        "filter" => {
            let raw = sub_args
                .first()
                .ok_or_else(|| anyhow!("usage: todo <widget> filter <all|pending|completed>"))?;
            let filter: TodoFilter = raw.parse().map_err(|err: String| anyhow!(err))?;
            dashboard.todo_set_filter(&id, filter)?;
        }
        other => return Err(anyhow!("unknown todo action: {other}")),
    }

    renderer.print_todo(dashboard.todo(&id)?)
}

#[instrument(skip(dashboard, renderer, args))]
fn cmd_timer(dashboard: &mut Dashboard<DataStore>, renderer: &Renderer, args: &[String]) -> anyhow::Result<()> {
    let (widget, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("usage: timer <widget> [status|start|pause|reset]"))?;
    let id = resolve_widget(dashboard, widget)?;
    let sub = rest.first().map(String::as_str).unwrap_or("status");
    debug!(widget = %id, sub, "timer subcommand");

    match sub {
        "status" => {}
        "start" => {
            if !dashboard.timer_start(&id)? {
                println!("Timer is already running or has finished; reset it first.");
            }
        }
        "pause" | "stop" => {
            if !dashboard.timer_pause(&id)? {
                println!("Timer is not running.");
            }
        }
        "reset" => dashboard.timer_reset(&id)?,
        other => return Err(anyhow!("unknown timer action: {other}")),
    }

    renderer.print_timer(dashboard.timer(&id)?)
}

#[instrument(skip(dashboard, args))]
fn cmd_note(dashboard: &mut Dashboard<DataStore>, args: &[String]) -> anyhow::Result<()> {
    let (widget, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("usage: note <widget> [show|set <text>|clear]"))?;
    let id = resolve_widget(dashboard, widget)?;
    let sub = rest.first().map(String::as_str).unwrap_or("show");

    match sub {
        "show" => {
            let note = dashboard.note(&id)?;
            if note.text().is_empty() {
                println!("(empty)");
            } else {
                println!("{}", note.text());
            }
        }
        "set" | "clear" => {
            let text = if sub == "set" { rest[1..].join(" ") } else { String::new() };
            // No scheduler here: edit, then save as if focus left the field.
            dashboard.note_edit(&id, &text)?;
            dashboard.note_blur(&id)?;
            println!("Saved note {id}.");
        }
        other => return Err(anyhow!("unknown note action: {other}")),
    }
    Ok(())
}

fn cmd_keys(dashboard: &Dashboard<DataStore>) -> anyhow::Result<()> {
    let store = dashboard.store();
    for key in store.keys() {
        let size = store.get(&key).map(|value| value.len()).unwrap_or_default();
        println!("{key} ({size} bytes)");
    }
    Ok(())
}

fn cmd_export(dashboard: &Dashboard<DataStore>) -> anyhow::Result<()> {
    let entries: &BTreeMap<String, String> = dashboard.store().entries();
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}

fn cmd_commands() -> anyhow::Result<()> {
    for command in known_command_names() {
        println!("{command}");
    }
    Ok(())
}

fn cmd_show(cfg: &Config) -> anyhow::Result<()> {
    for (k, v) in cfg.iter() {
        println!("{k}={v}");
    }
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "Commands: layout [json], add <type>, remove <widget>, move <widget> <before|after> <widget>, reset, \
         todo <widget> [list|add|toggle|rm|clear|filter], timer <widget> [status|start|pause|reset], \
         note <widget> [show|set|clear], keys, export"
    );
    println!("Widgets are named by id, unique id prefix, or 1-based position.");
    Ok(())
}

/// Exact id, then 1-based position, then unique id prefix.
pub fn resolve_widget<S: Store>(dashboard: &Dashboard<S>, token: &str) -> anyhow::Result<WidgetId> {
    let widgets = dashboard.widgets();
    if let Some(widget) = widgets.iter().find(|widget| widget.id.as_str() == token) {
        return Ok(widget.id.clone());
    }

    if let Ok(position) = token.parse::<usize>()
        && let Some(widget) = position.checked_sub(1).and_then(|idx| widgets.get(idx))
    {
        return Ok(widget.id.clone());
    }

    let mut matches = widgets
        .iter()
        .filter(|widget| widget.id.as_str().starts_with(token));
    match (matches.next(), matches.next()) {
        (Some(widget), None) => Ok(widget.id.clone()),
        (Some(_), Some(_)) => Err(anyhow!("widget prefix {token} is ambiguous")),
        (None, _) => Err(anyhow!("no widget matches {token}")),
    }
}

fn parse_placement(raw: &str) -> anyhow::Result<Placement> {
    match raw.to_ascii_lowercase().as_str() {
        "before" => Ok(Placement::Before),
        "after" => Ok(Placement::After),
        other => Err(anyhow!("expected before or after, got: {other}")),
    }
}

/// Task text with optional `priority:<p>` / `pri:<p>` tokens anywhere.
fn parse_task_args(args: &[String]) -> anyhow::Result<(String, Priority)> {
    let mut priority = Priority::default();
    let mut words = Vec::with_capacity(args.len());
    for arg in args {
        let value = arg
            .strip_prefix("priority:")
            .or_else(|| arg.strip_prefix("pri:"));
        match value {
            Some(value) => priority = value.parse().map_err(|err: String| anyhow!(err))?,
            None => words.push(arg.as_str()),
        }
    }
    Ok((words.join(" "), priority))
}

/// A task id, or the 1-based position in the visible list.
fn resolve_task(todo: &TodoController, args: &[String]) -> anyhow::Result<i64> {
    let token = args.first().ok_or_else(|| anyhow!("missing task id"))?;
    let value: i64 = token
        .parse()
        .with_context(|| format!("invalid task id: {token}"))?;
    if todo.tasks().iter().any(|task| task.id == value) {
        return Ok(value);
    }
    let visible = todo.visible();
    usize::try_from(value)
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|idx| visible.get(idx))
        .map(|task| task.id)
        .ok_or_else(|| anyhow!("no task {token}"))
}

#[cfg(test)]
mod tests {
    use daydash_engine::{Services, WidgetTag};

    use super::*;

    #[test]
    fn abbreviations_resolve_only_when_unique() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("lay", &known), Some("layout"));
        assert_eq!(expand_command_abbrev("ti", &known), Some("timer"));
        assert_eq!(expand_command_abbrev("re", &known), None);
        assert_eq!(expand_command_abbrev("t", &known), None);
    }

    #[test]
    fn task_args_pick_out_priority() {
        let args: Vec<String> = ["buy", "pri:h", "milk"].map(str::to_string).to_vec();
        let (text, priority) = parse_task_args(&args).expect("parse");
        assert_eq!(text, "buy milk");
        assert_eq!(priority, Priority::High);

        let bad: Vec<String> = vec!["priority:urgent".to_string()];
        assert!(parse_task_args(&bad).is_err());
    }

    #[test]
    fn widgets_resolve_by_id_position_or_prefix() {
        let mut dashboard = Dashboard::new(
            daydash_engine::MemoryStore::new(),
            daydash_engine::DashboardSettings::default(),
            Services::headless(),
        );
        dashboard.load().expect("load");

        assert_eq!(resolve_widget(&dashboard, "weather").expect("id").as_str(), "weather");
        assert_eq!(resolve_widget(&dashboard, "1").expect("position").as_str(), "announcements");
        assert_eq!(resolve_widget(&dashboard, "quick").expect("prefix").as_str(), "quicklinks");
        assert!(resolve_widget(&dashboard, "nothing").is_err());
        assert!(resolve_widget(&dashboard, "9").is_err());

        dashboard.add_widget("timer").expect("add timer");
        dashboard.add_widget("todo").expect("add todo");
        assert!(resolve_widget(&dashboard, "widget-").is_err());
        assert!(matches!(
            dashboard.widgets()[5].tag,
            WidgetTag::Custom(WidgetKind::Timer)
        ));
    }
}
