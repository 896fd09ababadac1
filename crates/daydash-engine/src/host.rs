//! Seams to the surrounding environment: user prompts and external feeds.

use tracing::{debug, info};

pub const REMOVE_WIDGET_PROMPT: &str = "Remove this widget?";
pub const CLEAR_COMPLETED_PROMPT: &str = "Clear all completed tasks?";
pub const RESET_LAYOUT_PROMPT: &str =
    "Reset dashboard to default layout? This will remove any custom widgets.";
pub const TIMER_FINISHED_NOTICE: &str = "Timer finished!";

/// Confirmation dialogs and notices shown to the user.
pub trait Prompt {
    fn confirm(&self, message: &str) -> bool;

    fn notify(&self, message: &str);
}

/// Answers every confirmation with yes and logs notices.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, message: &str) -> bool {
        debug!(message, "auto-confirming prompt");
        true
    }

    fn notify(&self, message: &str) {
        info!(message, "notice");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Weather,
    Schedule,
}

/// Collaborators that load content from outside the dashboard.
pub trait ExternalFeeds {
    fn refresh(&self, feed: Feed);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeeds;

impl ExternalFeeds for NoFeeds {
    fn refresh(&self, feed: Feed) {
        debug!(?feed, "no feed collaborator configured");
    }
}
