//! Error types shared by every engine module.

use thiserror::Error;

use crate::widget::WidgetId;

/// Failure writing to or removing from a [`crate::store::Store`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing storage rejected a write (quota, I/O, serialization).
    #[error("failed to write key {key}: {message}")]
    Write { key: String, message: String },

    /// The backing storage rejected a removal.
    #[error("failed to remove key {key}: {message}")]
    Remove { key: String, message: String },

    /// A value could not be encoded before writing.
    #[error("failed to encode value for key {key}: {message}")]
    Encode { key: String, message: String },
}

/// Errors surfaced by dashboard operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// The widget factory was asked for a type it cannot build.
    #[error("unknown widget type: {0}")]
    UnknownWidgetType(String),

    #[error("widget not found: {0}")]
    WidgetNotFound(WidgetId),

    /// The widget exists but has no controller of the requested kind.
    #[error("widget {id} is not a {expected} widget")]
    WrongWidgetKind { id: WidgetId, expected: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the external feeds (schedule list, weather report).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("invalid clock time: {0}")]
    InvalidClockTime(String),

    #[error("malformed feed payload: {0}")]
    Malformed(String),

    #[error("feed request failed: {0}")]
    Request(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Malformed(err.to_string())
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_widget_type_names_the_tag() {
        let err = DashboardError::UnknownWidgetType("clock".to_string());
        assert_eq!(err.to_string(), "unknown widget type: clock");
    }

    #[test]
    fn store_error_converts_into_dashboard_error() {
        let err: DashboardError = StoreError::Write {
            key: "dashboardOrder".to_string(),
            message: "quota exceeded".to_string(),
        }
        .into();
        assert!(matches!(err, DashboardError::Store(StoreError::Write { .. })));
        assert_eq!(
            err.to_string(),
            "failed to write key dashboardOrder: quota exceeded"
        );
    }
}
