use daydash_engine::todo::{
  Priority,
  TodoFilter
};
use daydash_engine::{
  WidgetId,
  WidgetKind,
  WidgetRect
};

/// Everything a component can ask the
/// dashboard to do.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
  AddWidget(WidgetKind),
  RemoveWidget(WidgetId),
  Reset,
  DragStart(WidgetId),
  DragOver {
    target:    WidgetId,
    pointer_y: f64,
    rect:      WidgetRect
  },
  Drop,
  DragEnd,
  NoteEdit(WidgetId, String),
  NoteBlur(WidgetId),
  TodoAdd {
    widget:   WidgetId,
    text:     String,
    priority: Priority
  },
  TodoToggle(WidgetId, i64),
  TodoRemove(WidgetId, i64),
  TodoClearCompleted(WidgetId),
  TodoFilter(WidgetId, TodoFilter),
  TimerStart(WidgetId),
  TimerPause(WidgetId),
  TimerReset(WidgetId)
}
