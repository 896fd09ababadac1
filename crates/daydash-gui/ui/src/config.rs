use daydash_engine::DashboardSettings;
use daydash_engine::feeds::WEATHER_REFRESH_MINUTES;
use serde::Deserialize;

const BUNDLED_CONFIG: &str =
  include_str!(
    "../assets/dashboard.toml"
  );

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct UiConfig {
  pub weather:   WeatherConfig,
  pub schedule:  ScheduleConfig,
  pub dashboard: DashboardSettings,
  pub overlays:  Vec<OverlayConfig>
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct WeatherConfig {
  pub location:        String,
  pub url:             String,
  pub refresh_minutes: u64
}

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
#[serde(default)]
pub struct ScheduleConfig {
  pub url: String
}

/// Panel opened by a quick link.
#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct OverlayConfig {
  pub target: String,
  pub title:  String,
  #[serde(default)]
  pub lines:  Vec<String>
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      weather:   WeatherConfig::default(),
      schedule:  ScheduleConfig::default(),
      dashboard: DashboardSettings::default(),
      overlays:  Vec::new()
    }
  }
}

impl Default for WeatherConfig {
  fn default() -> Self {
    Self {
      location:        "Adelaide"
        .to_string(),
      url:             "https://wttr.in/Adelaide?format=j1"
        .to_string(),
      refresh_minutes:
        WEATHER_REFRESH_MINUTES
    }
  }
}

impl Default for ScheduleConfig {
  fn default() -> Self {
    Self {
      url: "schedule.json".to_string()
    }
  }
}

impl UiConfig {
  pub fn overlay(
    &self,
    target: &str
  ) -> Option<&OverlayConfig> {
    self
      .overlays
      .iter()
      .find(|overlay| {
        overlay.target == target
      })
  }

  pub fn refresh_millis(&self) -> u32 {
    let minutes = self
      .weather
      .refresh_minutes
      .max(1);
    u32::try_from(minutes * 60_000)
      .unwrap_or(u32::MAX)
  }
}

pub fn load_ui_config() -> UiConfig {
  parse_ui_config(BUNDLED_CONFIG)
}

fn parse_ui_config(
  raw: &str
) -> UiConfig {
  match toml::from_str::<UiConfig>(raw)
  {
    | Ok(mut config) => {
      config.dashboard = config
        .dashboard
        .sanitized();
      tracing::debug!(
        overlays = config.overlays.len(),
        location = %config.weather.location,
        "loaded dashboard config"
      );
      config
    }
    | Err(error) => {
      tracing::error!(
        %error,
        "failed to parse \
         dashboard.toml; using \
         defaults"
      );
      UiConfig::default()
    }
  }
}
