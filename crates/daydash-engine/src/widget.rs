use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Widget kinds the factory can build and the type map can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    #[serde(rename = "custom-note", alias = "note")]
    Note,
    #[serde(rename = "links")]
    Links,
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "timer")]
    Timer,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 4] = [
        WidgetKind::Note,
        WidgetKind::Links,
        WidgetKind::Todo,
        WidgetKind::Timer,
    ];

    /// Tag written to the persisted type map.
    pub fn tag(self) -> &'static str {
        match self {
            WidgetKind::Note => "custom-note",
            WidgetKind::Links => "links",
            WidgetKind::Todo => "todo",
            WidgetKind::Timer => "timer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WidgetKind::Note => "Notes",
            WidgetKind::Links => "Links",
            WidgetKind::Todo => "To-Do List",
            WidgetKind::Timer => "Timer",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for WidgetKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "custom-note" | "note" => Ok(WidgetKind::Note),
            "links" => Ok(WidgetKind::Links),
            "todo" => Ok(WidgetKind::Todo),
            "timer" => Ok(WidgetKind::Timer),
            other => Err(DashboardError::UnknownWidgetType(other.to_string())),
        }
    }
}

/// The five widgets shipped in the page markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultWidget {
    Announcements,
    Schedule,
    Weather,
    QuickLinks,
    Notes,
}

impl DefaultWidget {
    pub const ALL: [DefaultWidget; 5] = [
        DefaultWidget::Announcements,
        DefaultWidget::Schedule,
        DefaultWidget::Weather,
        DefaultWidget::QuickLinks,
        DefaultWidget::Notes,
    ];

    pub fn id(self) -> &'static str {
        match self {
            DefaultWidget::Announcements => "announcements",
            DefaultWidget::Schedule => "schedule",
            DefaultWidget::Weather => "weather",
            DefaultWidget::QuickLinks => "quicklinks",
            DefaultWidget::Notes => "notes",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|widget| widget.id() == id)
    }
}

/// Authoritative type attached to every mounted widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetTag {
    Default(DefaultWidget),
    Custom(WidgetKind),
}

impl WidgetTag {
    /// Kind recorded in the type map; defaults are rediscovered by id.
    pub fn persisted_kind(self) -> Option<WidgetKind> {
        match self {
            WidgetTag::Default(_) => None,
            WidgetTag::Custom(kind) => Some(kind),
        }
    }

    pub fn controller(self) -> Option<ControllerKind> {
        match self {
            WidgetTag::Default(DefaultWidget::Notes) | WidgetTag::Custom(WidgetKind::Note) => {
                Some(ControllerKind::Note)
            }
            WidgetTag::Custom(WidgetKind::Todo) => Some(ControllerKind::Todo),
            WidgetTag::Custom(WidgetKind::Timer) => Some(ControllerKind::Timer),
            WidgetTag::Default(_) | WidgetTag::Custom(WidgetKind::Links) => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            WidgetTag::Default(widget) => widget.id(),
            WidgetTag::Custom(kind) => kind.tag(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Note,
    Todo,
    Timer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Quick link that opens an overlay panel instead of navigating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickLink {
    pub label: String,
    pub target: String,
}

/// What the renderer draws inside the widget frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetBody {
    Text(String),
    Schedule(Vec<String>),
    Weather { placeholder: String },
    QuickLinks(Vec<QuickLink>),
    Note { placeholder: String },
    Links(Vec<Link>),
    Todo,
    Timer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub id: WidgetId,
    pub tag: WidgetTag,
    pub title: String,
    pub body: WidgetBody,
    pub draggable: bool,
}

impl Widget {
    pub fn is_default(&self) -> bool {
        matches!(self.tag, WidgetTag::Default(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_custom_and_short_note_tags() {
        assert_eq!("custom-note".parse::<WidgetKind>().unwrap(), WidgetKind::Note);
        assert_eq!("note".parse::<WidgetKind>().unwrap(), WidgetKind::Note);
        assert_eq!("timer".parse::<WidgetKind>().unwrap(), WidgetKind::Timer);
        assert_eq!(
            "clock".parse::<WidgetKind>(),
            Err(DashboardError::UnknownWidgetType("clock".to_string()))
        );
    }

    #[test]
    fn kind_serializes_to_type_map_tag() {
        let json = serde_json::to_string(&WidgetKind::Note).unwrap();
        assert_eq!(json, "\"custom-note\"");
        let parsed: WidgetKind = serde_json::from_str("\"note\"").unwrap();
        assert_eq!(parsed, WidgetKind::Note);
    }

    #[test]
    fn only_custom_widgets_are_persisted_by_kind() {
        assert_eq!(WidgetTag::Default(DefaultWidget::Notes).persisted_kind(), None);
        assert_eq!(
            WidgetTag::Custom(WidgetKind::Links).persisted_kind(),
            Some(WidgetKind::Links)
        );
    }

    #[test]
    fn default_notes_widget_binds_a_note_controller() {
        assert_eq!(
            WidgetTag::Default(DefaultWidget::Notes).controller(),
            Some(ControllerKind::Note)
        );
        assert_eq!(WidgetTag::Default(DefaultWidget::Weather).controller(), None);
        assert_eq!(WidgetTag::Custom(WidgetKind::Links).controller(), None);
    }
}
