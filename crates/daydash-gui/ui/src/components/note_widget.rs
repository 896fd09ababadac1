use daydash_engine::WidgetId;
use web_sys::{
  FocusEvent,
  HtmlTextAreaElement,
  InputEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

use crate::action::DashboardAction;

#[derive(Properties, PartialEq)]
pub struct NoteWidgetProps {
  pub id:          WidgetId,
  pub text:        String,
  pub placeholder: String,
  pub on_action:
    Callback<DashboardAction>
}

#[function_component(NoteWidget)]
pub fn note_widget(
  props: &NoteWidgetProps
) -> Html {
  let oninput = {
    let id = props.id.clone();
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlTextAreaElement =
          event.target_unchecked_into();
        on_action.emit(
          DashboardAction::NoteEdit(
            id.clone(),
            input.value()
          )
        );
      }
    )
  };

  let onblur = {
    let id = props.id.clone();
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |_: FocusEvent| {
        on_action.emit(
          DashboardAction::NoteBlur(
            id.clone()
          )
        );
      }
    )
  };

  html! {
    <textarea
      class="note-area"
      placeholder={props.placeholder.clone()}
      value={props.text.clone()}
      {oninput}
      {onblur}
    />
  }
}
