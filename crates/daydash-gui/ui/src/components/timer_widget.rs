use daydash_engine::WidgetId;
use daydash_engine::timer::TimerPhase;
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

use crate::action::DashboardAction;

#[derive(Properties, PartialEq)]
pub struct TimerWidgetProps {
  pub id:        WidgetId,
  pub display:   String,
  pub phase:     TimerPhase,
  pub on_action:
    Callback<DashboardAction>
}

#[function_component(TimerWidget)]
pub fn timer_widget(
  props: &TimerWidgetProps
) -> Html {
  let emit = |make: fn(WidgetId) -> DashboardAction| {
    let id = props.id.clone();
    let on_action =
      props.on_action.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_action
          .emit(make(id.clone()));
      }
    )
  };

  let running =
    props.phase == TimerPhase::Running;
  let finished =
    props.phase == TimerPhase::Expired;

  html! {
    <div class="timer-container">
      <div class={classes!(
        "timer-display",
        running.then_some("running"),
        finished.then_some("finished")
      )}>
        { props.display.clone() }
      </div>
      <div class="timer-controls">
        <button
          class="timer-btn"
          disabled={running || finished}
          onclick={emit(DashboardAction::TimerStart)}
        >
          { "Start" }
        </button>
        <button
          class="timer-btn"
          disabled={!running}
          onclick={emit(DashboardAction::TimerPause)}
        >
          { "Pause" }
        </button>
        <button
          class="timer-btn"
          onclick={emit(DashboardAction::TimerReset)}
        >
          { "Reset" }
        </button>
      </div>
    </div>
  }
}
