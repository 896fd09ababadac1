use daydash_engine::WidgetKind;
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct AddWidgetModalProps {
  pub on_pick:  Callback<WidgetKind>,
  pub on_close: Callback<()>
}

#[function_component(AddWidgetModal)]
pub fn add_widget_modal(
  props: &AddWidgetModalProps
) -> Html {
  let on_backdrop = {
    let on_close = props.on_close.clone();
    Callback::from(
      move |event: MouseEvent| {
        if event.target()
          == event.current_target()
        {
          on_close.emit(());
        }
      }
    )
  };
  let on_cancel = {
    let on_close = props.on_close.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_close.emit(());
      }
    )
  };

  html! {
    <div class="modal" onclick={on_backdrop}>
      <div class="modal-content">
        <h2>{ "Add Widget" }</h2>
        <div class="widget-options">
          {
            for WidgetKind::ALL.into_iter().map(|kind| {
              let on_pick = props.on_pick.clone();
              html! {
                <button
                  class="widget-option"
                  data-type={kind.tag()}
                  onclick={move |_: MouseEvent| on_pick.emit(kind)}
                >
                  { kind.label() }
                </button>
              }
            })
          }
        </div>
        <button class="close-modal" onclick={on_cancel}>{ "Cancel" }</button>
      </div>
    </div>
  }
}
