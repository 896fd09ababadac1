use daydash_engine::feeds::WeatherSummary;
use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ScheduleWidgetProps {
  pub lines: Vec<String>
}

#[function_component(ScheduleWidget)]
pub fn schedule_widget(
  props: &ScheduleWidgetProps
) -> Html {
  html! {
    <ul class="schedule-list">
      { for props.lines.iter().map(|line| html! { <li>{ line.clone() }</li> }) }
    </ul>
  }
}

#[derive(Properties, PartialEq)]
pub struct WeatherWidgetProps {
  /// `None` until the first fetch
  /// settles.
  pub summary:     Option<WeatherSummary>,
  pub placeholder: String,
  pub location:    String
}

#[function_component(WeatherWidget)]
pub fn weather_widget(
  props: &WeatherWidgetProps
) -> Html {
  let Some(summary) = &props.summary
  else {
    return html! {
      <p class="weather-loading">{ props.placeholder.clone() }</p>
    };
  };

  html! {
    <div class="weather-info">
      <p class="weather-location">{ summary.location.clone() }</p>
      <p class="weather-headline" title={props.location.clone()}>
        { summary.headline.clone() }
      </p>
      {
        for summary.details.iter().map(|detail| html! {
          <p class="weather-detail">{ detail.clone() }</p>
        })
      }
    </div>
  }
}
