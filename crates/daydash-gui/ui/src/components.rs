mod add_widget_modal;
mod feed_widgets;
mod links_widget;
mod note_widget;
mod overlay_panel;
mod timer_widget;
mod todo_widget;
mod toolbar;
mod widget_frame;

pub use add_widget_modal::AddWidgetModal;
pub use feed_widgets::{
  ScheduleWidget,
  WeatherWidget
};
pub use links_widget::{
  LinksWidget,
  QuickLinksWidget
};
pub use note_widget::NoteWidget;
pub use overlay_panel::OverlayPanel;
pub use timer_widget::TimerWidget;
pub use todo_widget::TodoWidget;
pub use toolbar::Toolbar;
pub use widget_frame::WidgetFrame;
