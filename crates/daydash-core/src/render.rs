use std::io::{self, IsTerminal, Write};

use chrono::Local;
use daydash_engine::timer::{TimerController, TimerPhase};
use daydash_engine::todo::{Priority, TodoController};
use daydash_engine::{Widget, WidgetBody, WidgetTag};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.color()?;
        Ok(Self { color })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, widgets))]
    pub fn print_layout(&self, widgets: &[Widget]) -> anyhow::Result<()> {
        self.write_layout(io::stdout().lock(), widgets)
    }

    pub fn write_layout<W: Write>(&self, out: W, widgets: &[Widget]) -> anyhow::Result<()> {
        let headers = ["#", "ID", "Type", "Title", "Content"]
            .map(str::to_string)
            .to_vec();

        let rows = widgets
            .iter()
            .enumerate()
            .map(|(idx, widget)| {
                let kind = match widget.tag {
                    WidgetTag::Default(_) => "default".to_string(),
                    WidgetTag::Custom(kind) => kind.tag().to_string(),
                };
                vec![
                    self.paint(&(idx + 1).to_string(), "33"),
                    widget.id.to_string(),
                    kind,
                    widget.title.clone(),
                    body_summary(&widget.body),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    #[tracing::instrument(skip(self, todo))]
    pub fn print_todo(&self, todo: &TodoController) -> anyhow::Result<()> {
        self.write_todo(io::stdout().lock(), todo)
    }

    pub fn write_todo<W: Write>(&self, mut out: W, todo: &TodoController) -> anyhow::Result<()> {
        let headers = ["ID", "Pri", "Done", "Task", "Added"]
            .map(str::to_string)
            .to_vec();

        let rows = todo
            .visible()
            .into_iter()
            .map(|task| {
                let badge = match task.priority {
                    Priority::High => self.paint(task.priority.badge(), "31"),
                    Priority::Medium => self.paint(task.priority.badge(), "33"),
                    Priority::Low => task.priority.badge().to_string(),
                };
                let done = if task.completed { "x" } else { "" };
                vec![
                    task.id.to_string(),
                    badge,
                    done.to_string(),
                    task.text.clone(),
                    task.created_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        let stats = todo.stats();
        writeln!(out, "{} (filter: {})", stats.label, todo.filter().label())?;
        Ok(())
    }

    pub fn print_timer(&self, timer: &TimerController) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let phase = match timer.phase() {
            TimerPhase::Idle => "idle".to_string(),
            TimerPhase::Running => self.paint("running", "32"),
            TimerPhase::Paused => "paused".to_string(),
            TimerPhase::Expired => self.paint("finished", "31"),
        };
        writeln!(out, "{}  {}", timer.display(), phase)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn body_summary(body: &WidgetBody) -> String {
    match body {
        WidgetBody::Text(text) => text.clone(),
        WidgetBody::Schedule(lines) => lines.join("; "),
        WidgetBody::Weather { placeholder } | WidgetBody::Note { placeholder } => {
            placeholder.lines().next().unwrap_or_default().to_string()
        }
        WidgetBody::QuickLinks(links) => links
            .iter()
            .map(|link| link.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        WidgetBody::Links(links) => links
            .iter()
            .map(|link| format!("{} <{}>", link.label, link.url))
            .collect::<Vec<_>>()
            .join(", "),
        WidgetBody::Todo => "to-do list".to_string(),
        WidgetBody::Timer => "countdown".to_string(),
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use daydash_engine::factory::WidgetFactory;
    use daydash_engine::widget::DefaultWidget;

    use super::*;

    #[test]
    fn table_pads_by_display_width() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec!["°C".to_string(), "x".to_string()],
                vec!["\x1b[31mred\x1b[0m".to_string(), "y".to_string()],
            ],
        )
        .expect("write table");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A   B ");
        assert_eq!(lines[1], "--- - ");
        assert_eq!(lines[2], "°C  x ");
        assert_eq!(strip_ansi(lines[3]), "red y ");
    }

    #[test]
    fn layout_lists_widgets_in_order() {
        let widgets = vec![
            WidgetFactory.default_widget(DefaultWidget::QuickLinks),
            WidgetFactory.default_widget(DefaultWidget::Notes),
        ];
        let mut buf = Vec::new();
        Renderer::plain()
            .write_layout(&mut buf, &widgets)
            .expect("write layout");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("quicklinks"));
        assert!(lines[2].contains("WiFi Info, Venue Map, Code of Conduct"));
        assert!(lines[3].contains("Write your notes here..."));
    }
}
