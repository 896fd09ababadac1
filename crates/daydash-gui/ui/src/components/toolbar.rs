use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ToolbarProps {
  pub on_add:   Callback<()>,
  pub on_reset: Callback<()>
}

#[function_component(Toolbar)]
pub fn toolbar(
  props: &ToolbarProps
) -> Html {
  let on_add = props.on_add.clone();
  let on_reset = props.on_reset.clone();

  html! {
    <header class="dashboard-header">
      <h1>{ "Daydream Adelaide" }</h1>
      <div class="dashboard-controls">
        <button
          id="add-widget-btn"
          class="btn"
          onclick={move |_: MouseEvent| on_add.emit(())}
        >
          { "+ Add Widget" }
        </button>
        <button
          id="reset-layout-btn"
          class="btn danger"
          onclick={move |_: MouseEvent| on_reset.emit(())}
        >
          { "Reset Layout" }
        </button>
      </div>
    </header>
  }
}
