//! Parsing and presentation of the two external feeds: the event schedule and
//! the wttr.in weather report. Fetching is the host's job.

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FeedError;

pub const SCHEDULE_LIMIT: usize = 4;
pub const SCHEDULE_FAILURE_TEXT: &str = "Failed to load schedule.";
pub const WEATHER_REFRESH_MINUTES: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// `H:MM AM` / `H:MM PM`.
    pub time: String,
    pub event: String,
}

impl ScheduleEntry {
    pub fn line(&self) -> String {
        format!("{} - {}", self.time, self.event)
    }
}

/// Parses a 12-hour clock time. `12 AM` is midnight and `12 PM` noon.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, FeedError> {
    let invalid = || FeedError::InvalidClockTime(raw.to_string());
    let clock_re = Regex::new(r"(?i)^(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<ampm>[ap]m)$")
        .map_err(|e| FeedError::Malformed(format!("internal regex compile failure: {e}")))?;
    let caps = clock_re.captures(raw.trim()).ok_or_else(invalid)?;

    let hours: u32 = caps["hour"].parse().map_err(|_| invalid())?;
    let minutes: u32 = caps["minute"].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hours) {
        return Err(invalid());
    }
    let pm = caps["ampm"].eq_ignore_ascii_case("pm");
    let hours = match (hours, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

pub fn parse_schedule(payload: &str) -> Result<Vec<ScheduleEntry>, FeedError> {
    Ok(serde_json::from_str(payload)?)
}

/// Entries at or after `now`, at most `limit`. When the day is over the first
/// `limit` entries are shown instead. Entries whose time does not parse never
/// count as upcoming.
pub fn upcoming(entries: &[ScheduleEntry], now: NaiveTime, limit: usize) -> Vec<ScheduleEntry> {
    let later: Vec<ScheduleEntry> = entries
        .iter()
        .filter(|entry| match parse_clock_time(&entry.time) {
            Ok(at) => at >= now,
            Err(err) => {
                debug!(%err, "skipping schedule entry");
                false
            }
        })
        .take(limit)
        .cloned()
        .collect();

    if later.is_empty() {
        entries.iter().take(limit).cloned().collect()
    } else {
        later
    }
}

/// Lines for the schedule widget, or the failure text when the payload is
/// unusable.
pub fn schedule_lines(payload: &str, now: NaiveTime) -> Vec<String> {
    match parse_schedule(payload) {
        Ok(entries) => upcoming(&entries, now, SCHEDULE_LIMIT)
            .iter()
            .map(ScheduleEntry::line)
            .collect(),
        Err(err) => {
            warn!(%err, "failed to load schedule");
            vec![SCHEDULE_FAILURE_TEXT.to_string()]
        }
    }
}

/// Subset of the wttr.in `format=j1` report. Numbers arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherReport {
    pub current_condition: Vec<CurrentCondition>,
    pub weather: Vec<DailyForecast>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCondition {
    #[serde(rename = "temp_C")]
    pub temp_c: String,
    pub weather_desc: Vec<TextValue>,
    pub humidity: String,
    pub windspeed_kmph: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyForecast {
    #[serde(rename = "maxtempC")]
    pub max_temp_c: String,
    #[serde(rename = "mintempC")]
    pub min_temp_c: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherSummary {
    pub location: String,
    /// `"<temp>°C, <description>"`.
    pub headline: String,
    pub details: Vec<String>,
}

impl WeatherSummary {
    pub fn fallback(location: &str) -> Self {
        Self {
            location: location.to_string(),
            headline: "23°C, Sunny".to_string(),
            details: vec!["Weather data temporarily unavailable".to_string()],
        }
    }
}

fn rounded(raw: &str, field: &str) -> Result<i64, FeedError> {
    raw.trim()
        .parse::<f64>()
        .map(|value| value.round() as i64)
        .map_err(|_| FeedError::Malformed(format!("{field}: {raw:?}")))
}

impl WeatherReport {
    pub fn parse(payload: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn summarize(&self, location: &str) -> Result<WeatherSummary, FeedError> {
        let current = self
            .current_condition
            .first()
            .ok_or_else(|| FeedError::Malformed("no current condition".to_string()))?;
        let today = self
            .weather
            .first()
            .ok_or_else(|| FeedError::Malformed("no daily forecast".to_string()))?;
        let description = current
            .weather_desc
            .first()
            .map(|desc| desc.value.trim().to_string())
            .unwrap_or_default();

        let temp = rounded(&current.temp_c, "temp_C")?;
        let high = rounded(&today.max_temp_c, "maxtempC")?;
        let low = rounded(&today.min_temp_c, "mintempC")?;

        Ok(WeatherSummary {
            location: location.to_string(),
            headline: format!("{temp}°C, {description}"),
            details: vec![
                format!("High: {high}°C, Low: {low}°C"),
                format!(
                    "Humidity: {}% • Wind: {} km/h",
                    current.humidity, current.windspeed_kmph
                ),
            ],
        })
    }
}

/// Summary for the weather widget; any failure yields the fixed fallback.
pub fn weather_summary(payload: &str, location: &str) -> WeatherSummary {
    match WeatherReport::parse(payload).and_then(|report| report.summarize(location)) {
        Ok(summary) => summary,
        Err(err) => {
            warn!(%err, "failed to fetch weather");
            WeatherSummary::fallback(location)
        }
    }
}
