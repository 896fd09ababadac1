pub mod dashboard;
pub mod error;
pub mod factory;
pub mod feeds;
pub mod host;
pub mod layout;
pub mod note;
pub mod reset;
pub mod settings;
pub mod store;
pub mod testing;
pub mod timer;
pub mod timing;
pub mod todo;
pub mod widget;

pub use dashboard::{Controller, Dashboard, Services};
pub use error::{DashboardError, DashboardResult, FeedError, StoreError};
pub use layout::{Placement, WidgetRect};
pub use settings::DashboardSettings;
pub use store::{MemoryStore, Store};
pub use timing::{Clock, Scheduler, TaskGuard, Wakeup};
pub use widget::{Widget, WidgetBody, WidgetId, WidgetKind, WidgetTag};
