use std::time::Duration;

use chrono::Local;
use daydash_engine::feeds::{
  SCHEDULE_FAILURE_TEXT,
  WeatherSummary,
  schedule_lines,
  weather_summary
};
use daydash_engine::host::{
  ExternalFeeds,
  Feed,
  Prompt
};
use daydash_engine::timing::ScheduledTask;
use daydash_engine::{
  Scheduler,
  TaskGuard,
  Wakeup
};
use gloo::net::http::Request;
use gloo::timers::callback::{
  Interval,
  Timeout
};
use yew::Callback;

use crate::config::UiConfig;

enum BrowserTimer {
  Repeating(Option<Interval>),
  Once(Option<Timeout>)
}

// Dropping a gloo timer clears it.
impl ScheduledTask for BrowserTimer {
  fn cancel(&mut self) {
    match self {
      | BrowserTimer::Repeating(
        interval
      ) => *interval = None,
      | BrowserTimer::Once(timeout) => {
        *timeout = None
      }
    }
  }
}

/// Browser timers that hand fired
/// wakeups back to the app.
pub struct GlooScheduler {
  on_wakeup: Callback<Wakeup>
}

impl GlooScheduler {
  pub fn new(
    on_wakeup: Callback<Wakeup>
  ) -> Self {
    Self {
      on_wakeup
    }
  }
}

fn millis(period: Duration) -> u32 {
  u32::try_from(period.as_millis())
    .unwrap_or(u32::MAX)
}

// The handler may drop the timer that
// fired, so delivery waits until the
// timer callback has returned.
fn deliver(
  on_wakeup: &Callback<Wakeup>,
  wakeup: Wakeup
) {
  let on_wakeup = on_wakeup.clone();
  wasm_bindgen_futures::spawn_local(
    async move {
      on_wakeup.emit(wakeup);
    }
  );
}

impl Scheduler for GlooScheduler {
  fn every(
    &self,
    period: Duration,
    wakeup: Wakeup
  ) -> TaskGuard {
    let on_wakeup =
      self.on_wakeup.clone();
    let interval = Interval::new(
      millis(period),
      move || {
        deliver(
          &on_wakeup,
          wakeup.clone()
        );
      }
    );
    TaskGuard::new(
      BrowserTimer::Repeating(Some(
        interval
      ))
    )
  }

  fn after(
    &self,
    delay: Duration,
    wakeup: Wakeup
  ) -> TaskGuard {
    let on_wakeup =
      self.on_wakeup.clone();
    let timeout = Timeout::new(
      millis(delay),
      move || {
        deliver(&on_wakeup, wakeup);
      }
    );
    TaskGuard::new(BrowserTimer::Once(
      Some(timeout)
    ))
  }
}

/// `window.confirm` and `window.alert`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogPrompt;

impl Prompt for DialogPrompt {
  fn confirm(
    &self,
    message: &str
  ) -> bool {
    web_sys::window()
      .and_then(|window| {
        window
          .confirm_with_message(message)
          .ok()
      })
      .unwrap_or(false)
  }

  fn notify(&self, message: &str) {
    gloo::dialogs::alert(message);
  }
}

/// Fetches the weather report and the
/// event schedule.
pub struct FetchFeeds {
  weather_url:  String,
  location:     String,
  schedule_url: String,
  on_weather:   Callback<WeatherSummary>,
  on_schedule:  Callback<Vec<String>>
}

impl FetchFeeds {
  pub fn new(
    config: &UiConfig,
    on_weather: Callback<WeatherSummary>,
    on_schedule: Callback<Vec<String>>
  ) -> Self {
    Self {
      weather_url: config
        .weather
        .url
        .clone(),
      location: config
        .weather
        .location
        .clone(),
      schedule_url: config
        .schedule
        .url
        .clone(),
      on_weather,
      on_schedule
    }
  }
}

async fn fetch_text(
  url: &str
) -> Result<String, String> {
  let response = Request::get(url)
    .send()
    .await
    .map_err(|err| err.to_string())?;
  if !response.ok() {
    return Err(format!(
      "HTTP {}",
      response.status()
    ));
  }
  response
    .text()
    .await
    .map_err(|err| err.to_string())
}

impl ExternalFeeds for FetchFeeds {
  fn refresh(&self, feed: Feed) {
    match feed {
      | Feed::Weather => {
        let url =
          self.weather_url.clone();
        let location =
          self.location.clone();
        let on_weather =
          self.on_weather.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let summary =
              match fetch_text(&url)
                .await
              {
                | Ok(payload) => {
                  weather_summary(
                    &payload,
                    &location
                  )
                }
                | Err(error) => {
                  tracing::warn!(
                    %url,
                    %error,
                    "weather request failed"
                  );
                  WeatherSummary::fallback(
                    &location
                  )
                }
              };
            on_weather.emit(summary);
          }
        );
      }
      | Feed::Schedule => {
        let url =
          self.schedule_url.clone();
        let on_schedule =
          self.on_schedule.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let lines =
              match fetch_text(&url)
                .await
              {
                | Ok(payload) => {
                  schedule_lines(
                    &payload,
                    Local::now().time()
                  )
                }
                | Err(error) => {
                  tracing::warn!(
                    %url,
                    %error,
                    "schedule request failed"
                  );
                  vec![
                    SCHEDULE_FAILURE_TEXT
                      .to_string(),
                  ]
                }
              };
            on_schedule.emit(lines);
          }
        );
      }
    }
  }
}
