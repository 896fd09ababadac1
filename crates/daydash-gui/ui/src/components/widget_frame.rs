use daydash_engine::{
  WidgetId,
  WidgetRect
};
use web_sys::{
  DragEvent,
  Element,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html,
  use_node_ref
};

use crate::action::DashboardAction;

#[derive(Properties, PartialEq)]
pub struct WidgetFrameProps {
  pub id:          WidgetId,
  pub title:       String,
  pub draggable:   bool,
  pub is_dragging: bool,
  /// Just added from the picker; held
  /// off-screen until the entrance
  /// transition starts.
  #[prop_or_default]
  pub entering:    bool,
  pub on_action:
    Callback<DashboardAction>,
  #[prop_or_default]
  pub children:    Html
}

#[function_component(WidgetFrame)]
pub fn widget_frame(
  props: &WidgetFrameProps
) -> Html {
  let frame = use_node_ref();

  let ondragstart = {
    let id = props.id.clone();
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |event: DragEvent| {
        if let Some(data_transfer) =
          event.data_transfer()
        {
          if let Err(error) = data_transfer
            .set_data("text/plain", "")
          {
            tracing::debug!(
              ?error,
              "failed to set drag data"
            );
          }
          data_transfer
            .set_effect_allowed("move");
        }
        on_action.emit(
          DashboardAction::DragStart(
            id.clone()
          )
        );
      }
    )
  };

  let ondragover = {
    let id = props.id.clone();
    let frame = frame.clone();
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |event: DragEvent| {
        event.prevent_default();
        let Some(element) =
          frame.cast::<Element>()
        else {
          return;
        };
        let bounds = element
          .get_bounding_client_rect();
        on_action.emit(
          DashboardAction::DragOver {
            target:    id.clone(),
            pointer_y: f64::from(
              event.client_y()
            ),
            rect:      WidgetRect::new(
              bounds.top(),
              bounds.bottom()
            )
          }
        );
      }
    )
  };

  let ondragend = {
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |_: DragEvent| {
        on_action
          .emit(DashboardAction::DragEnd);
      }
    )
  };

  let on_remove = {
    let id = props.id.clone();
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |event: MouseEvent| {
        event.stop_propagation();
        on_action.emit(
          DashboardAction::RemoveWidget(
            id.clone()
          )
        );
      }
    )
  };

  html! {
    <section
      ref={frame}
      class={classes!(
        "widget",
        props.is_dragging.then_some("dragging"),
        props.entering.then_some("entering")
      )}
      data-id={props.id.to_string()}
      draggable={if props.draggable { "true" } else { "false" }}
      {ondragstart}
      {ondragover}
      {ondragend}
    >
      <button
        class="remove-widget"
        aria-label="Remove widget"
        onclick={on_remove}
      >
        { "×" }
      </button>
      <h2>{ props.title.clone() }</h2>
      { props.children.clone() }
    </section>
  }
}
