//! Builds widget descriptors.
//!
//! Custom widgets come from a type tag (`custom-note`, `links`, `todo`,
//! `timer`); the five default widgets are built from [`DefaultWidget`].

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::DashboardResult;
use crate::widget::{DefaultWidget, Link, QuickLink, Widget, WidgetBody, WidgetId, WidgetKind, WidgetTag};

const RANDOM_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, Default)]
pub struct WidgetFactory;

impl WidgetFactory {
    /// Builds a custom widget from its type tag.
    ///
    /// An unknown tag is an error; `id` is reused when restoring a persisted
    /// widget and generated otherwise.
    pub fn create(&self, tag: &str, id: Option<WidgetId>, now: DateTime<Utc>) -> DashboardResult<Widget> {
        let kind: WidgetKind = tag.parse()?;
        let id = id.unwrap_or_else(|| generate_widget_id(now));
        debug!(widget = %id, kind = %kind, "building widget");
        Ok(self.build(kind, id))
    }

    pub fn build(&self, kind: WidgetKind, id: WidgetId) -> Widget {
        let (title, body) = match kind {
            WidgetKind::Note => (
                "My Notes",
                WidgetBody::Note {
                    placeholder: "Your custom notes here...".to_string(),
                },
            ),
            WidgetKind::Links => (
                "My Links",
                WidgetBody::Links(vec![
                    link("GitHub", "https://github.com"),
                    link("Stack Overflow", "https://stackoverflow.com"),
                ]),
            ),
            WidgetKind::Todo => ("Tasks", WidgetBody::Todo),
            WidgetKind::Timer => ("Timer", WidgetBody::Timer),
        };

        Widget {
            id,
            tag: WidgetTag::Custom(kind),
            title: title.to_string(),
            body,
            draggable: true,
        }
    }

    pub fn default_widget(&self, which: DefaultWidget) -> Widget {
        let (title, body) = match which {
            DefaultWidget::Announcements => (
                "Announcements",
                WidgetBody::Text(
                    "Welcome to Daydream Adelaide! Stay tuned for updates and exciting news \
                     throughout the event."
                        .to_string(),
                ),
            ),
            DefaultWidget::Schedule => (
                "Schedule",
                WidgetBody::Schedule(
                    [
                        "10:00 AM - Opening Ceremony",
                        "11:00 AM - Workshops",
                        "4:00 PM - Demos",
                        "6:00 PM - Networking & Dinner",
                    ]
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                ),
            ),
            DefaultWidget::Weather => (
                "Weather",
                WidgetBody::Weather {
                    placeholder: "Loading Adelaide weather...".to_string(),
                },
            ),
            DefaultWidget::QuickLinks => (
                "Quick Links",
                WidgetBody::QuickLinks(vec![
                    quick_link("WiFi Info", "wifi"),
                    quick_link("Venue Map", "map"),
                    quick_link("Code of Conduct", "conduct"),
                ]),
            ),
            DefaultWidget::Notes => (
                "Notes",
                WidgetBody::Note {
                    placeholder: "Write your notes here...\n• Ideas for your project\n• People \
                                  you've met\n• Things to remember"
                        .to_string(),
                },
            ),
        };

        Widget {
            id: WidgetId::from(which.id()),
            tag: WidgetTag::Default(which),
            title: title.to_string(),
            body,
            draggable: true,
        }
    }

    /// The default set, in page order.
    pub fn default_widgets(&self) -> Vec<Widget> {
        DefaultWidget::ALL
            .into_iter()
            .map(|which| self.default_widget(which))
            .collect()
    }
}

/// `widget-<epoch ms>-<9 base36 chars>`.
pub fn generate_widget_id(now: DateTime<Utc>) -> WidgetId {
    let mut random = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(RANDOM_SUFFIX_LEN);
    for _ in 0..RANDOM_SUFFIX_LEN {
        suffix.push(char::from(BASE36[(random % 36) as usize]));
        random /= 36;
    }
    WidgetId::new(format!("widget-{}-{suffix}", now.timestamp_millis()))
}

fn link(label: &str, url: &str) -> Link {
    Link {
        label: label.to_string(),
        url: url.to_string(),
    }
}

fn quick_link(label: &str, target: &str) -> QuickLink {
    QuickLink {
        label: label.to_string(),
        target: target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::error::DashboardError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = WidgetFactory.create("calendar", None, now()).unwrap_err();
        assert_eq!(err, DashboardError::UnknownWidgetType("calendar".to_string()));
    }

    #[test]
    fn created_widget_keeps_a_supplied_id() {
        let widget = WidgetFactory
            .create("todo", Some(WidgetId::from("widget-7-abcdefghi")), now())
            .unwrap();
        assert_eq!(widget.id.as_str(), "widget-7-abcdefghi");
        assert_eq!(widget.tag, WidgetTag::Custom(WidgetKind::Todo));
        assert_eq!(widget.body, WidgetBody::Todo);
        assert!(widget.draggable);
    }

    #[test]
    fn generated_ids_carry_timestamp_and_random_suffix() {
        let first = generate_widget_id(now());
        let second = generate_widget_id(now());

        let prefix = format!("widget-{}-", now().timestamp_millis());
        assert!(first.as_str().starts_with(&prefix));
        assert_eq!(first.as_str().len(), prefix.len() + RANDOM_SUFFIX_LEN);
        assert!(first.as_str()[prefix.len()..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(first, second);
    }

    #[test]
    fn defaults_come_in_page_order() {
        let ids: Vec<String> = WidgetFactory
            .default_widgets()
            .into_iter()
            .map(|widget| widget.id.to_string())
            .collect();
        assert_eq!(ids, vec!["announcements", "schedule", "weather", "quicklinks", "notes"]);
    }
}
