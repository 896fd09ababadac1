use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use crate::config::OverlayConfig;

#[derive(Properties, PartialEq)]
pub struct OverlayPanelProps {
  pub overlay:  OverlayConfig,
  pub on_close: Callback<()>
}

/// Closes from its button or from a
/// click on the backdrop itself.
#[function_component(OverlayPanel)]
pub fn overlay_panel(
  props: &OverlayPanelProps
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
  let on_button = {
    let on_close = props.on_close.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_close.emit(());
      }
    )
  };

  html! {
    <div
      class="overlay"
      id={format!("overlay-{}", props.overlay.target)}
      onclick={on_backdrop}
    >
      <div class="overlay-content">
        <button class="close-overlay" aria-label="Close" onclick={on_button}>
          { "×" }
        </button>
        <h2>{ props.overlay.title.clone() }</h2>
        {
          for props.overlay.lines.iter().map(|line| html! {
            <p>{ line.clone() }</p>
          })
        }
      </div>
    </div>
  }
}
