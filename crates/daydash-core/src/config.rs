use std::collections::BTreeMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use daydash_engine::DashboardSettings;
use tracing::{
  debug,
  info,
  warn
};

/// Keys the dashrc understands, with
/// their defaults.
const DASHRC_KEYS: [(&str, &str); 5] = [
  ("color", "on"),
  ("data.location", "~/.daydash"),
  ("default.command", "layout"),
  ("note.debounce_ms", "500"),
  ("timer.minutes", "25")
];

#[derive(Debug, Clone)]
pub struct Config {
  values:     BTreeMap<String, String>,
  pub source: Option<PathBuf>
}

impl Config {
  /// Defaults, then the dashrc
  /// (`--dashrc`, `$DASHRC`, or
  /// `~/.dashrc`).
  #[tracing::instrument(skip(
    dashrc_override
  ))]
  pub fn load(
    dashrc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::defaults();

    let Some(path) = resolve_dashrc_path(
      dashrc_override
    ) else {
      debug!(
        "no dashrc found; using \
         defaults"
      );
      return Ok(cfg);
    };

    info!(dashrc = %path.display(), "loading dashrc");
    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    for (key, value) in
      parse_dashrc(&text, &path)?
    {
      cfg.set(key, value);
    }
    cfg.source = Some(path);

    Ok(cfg)
  }

  pub fn defaults() -> Self {
    Config {
      values: DASHRC_KEYS
        .iter()
        .map(|(key, value)| {
          (
            key.to_string(),
            value.to_string()
          )
        })
        .collect(),
      source: None
    }
  }

  /// `--rc` and `rc.key=value`
  /// arguments; they win over the
  /// dashrc.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      let key = key
        .strip_prefix("rc.")
        .map(str::to_string)
        .unwrap_or(key);
      debug!(key = %key, value = %value, "applying override");
      self.set(key, value);
    }
  }

  fn set(
    &mut self,
    key: String,
    value: String
  ) {
    if !self.values.contains_key(&key)
    {
      warn!(key = %key, "ignoring unknown dashrc key");
      return;
    }
    self.values.insert(key, value);
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<&str> {
    self
      .values
      .get(key)
      .map(String::as_str)
  }

  /// Sorted by key.
  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&str, &str)>
  {
    self.values.iter().map(
      |(key, value)| {
        (key.as_str(), value.as_str())
      }
    )
  }

  pub fn color(
    &self
  ) -> anyhow::Result<bool> {
    let raw =
      self.get("color").unwrap_or("on");
    parse_bool(raw).ok_or_else(|| {
      anyhow!(
        "invalid color setting: {raw}"
      )
    })
  }

  /// Engine tunables from
  /// `timer.minutes` and
  /// `note.debounce_ms`.
  pub fn settings(
    &self
  ) -> anyhow::Result<DashboardSettings>
  {
    let mut settings =
      DashboardSettings::default();

    if let Some(raw) =
      self.get("timer.minutes")
    {
      let minutes: u32 = raw
        .trim()
        .parse()
        .with_context(|| {
          format!(
            "invalid timer.minutes: \
             {raw}"
          )
        })?;
      if minutes == 0 {
        return Err(anyhow!(
          "timer.minutes must be at \
           least 1"
        ));
      }
      settings.timer_default_secs =
        minutes.saturating_mul(60);
    }

    if let Some(raw) =
      self.get("note.debounce_ms")
    {
      settings.note_debounce_ms = raw
        .trim()
        .parse()
        .with_context(|| {
          format!(
            "invalid \
             note.debounce_ms: {raw}"
          )
        })?;
    }

    Ok(settings.sanitized())
  }
}

/// `key = value` lines; `#` starts a
/// comment.
fn parse_dashrc(
  text: &str,
  origin: &Path
) -> anyhow::Result<Vec<(String, String)>>
{
  let mut pairs = Vec::new();
  for (idx, raw_line) in
    text.lines().enumerate()
  {
    let line = raw_line
      .split_once('#')
      .map_or(raw_line, |(before, _)| {
        before
      })
      .trim();
    if line.is_empty() {
      continue;
    }

    let (key, value) = line
      .split_once('=')
      .ok_or_else(|| {
        anyhow!(
          "invalid dashrc line {}:{}: \
           {}",
          origin.display(),
          idx + 1,
          raw_line.trim()
        )
      })?;
    pairs.push((
      key.trim().to_string(),
      value.trim().to_string()
    ));
  }
  Ok(pairs)
}

/// `--data` wins; otherwise
/// `data.location`, created when
/// missing.
#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = match override_dir {
    | Some(path) => path.to_path_buf(),
    | None => {
      let location = cfg
        .get("data.location")
        .unwrap_or("~/.daydash");
      expand_home(location)?
    }
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

fn resolve_dashrc_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  match std::env::var("DASHRC") {
    | Ok(path) if path == "/dev/null" => {
      return None;
    }
    | Ok(path) => {
      return Some(PathBuf::from(path));
    }
    | Err(_) => {}
  }

  dirs::home_dir()
    .map(|home| home.join(".dashrc"))
    .filter(|candidate| {
      candidate.exists()
    })
}

fn expand_home(
  location: &str
) -> anyhow::Result<PathBuf> {
  let Some(rest) = location
    .strip_prefix("~/")
    .or_else(|| {
      (location == "~").then_some("")
    })
  else {
    return Ok(PathBuf::from(location));
  };
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory for {location}"
      )
    })?;
  Ok(home.join(rest))
}

fn parse_bool(raw: &str) -> Option<bool> {
  match raw
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "on" | "yes" | "true" | "1" => {
      Some(true)
    }
    | "off" | "no" | "false" | "0" => {
      Some(false)
    }
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn dashrc_values_and_overrides() {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("dashrc");
    fs::write(
      &rc,
      "# dashboard\ncolor=off  # \
       no ansi\ntimer.minutes=10\n\
       note.debounce_ms = 250\n\
       theme = dark\n"
    )
    .expect("write dashrc");

    let mut cfg = Config::load(Some(&rc))
      .expect("load");
    assert!(!cfg.color().expect("color"));
    assert_eq!(cfg.source.as_deref(), Some(rc.as_path()));
    assert_eq!(cfg.get("theme"), None);
    assert_eq!(cfg.iter().count(), 5);

    let settings =
      cfg.settings().expect("settings");
    assert_eq!(settings.timer_default_secs, 600);
    assert_eq!(settings.note_debounce_ms, 250);

    cfg.apply_overrides([(
      "rc.timer.minutes".to_string(),
      "1".to_string()
    )]);
    assert_eq!(
      cfg
        .settings()
        .expect("settings")
        .timer_default_secs,
      60
    );
  }

  #[test]
  fn malformed_lines_and_values_are_errors()
  {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("dashrc");
    fs::write(&rc, "color on\n")
      .expect("write dashrc");
    let err = Config::load(Some(&rc))
      .expect_err("bad line");
    assert!(
      err.to_string().contains(":1:")
    );

    let mut cfg = Config::defaults();
    cfg.apply_overrides([
      (
        "timer.minutes".to_string(),
        "soon".to_string()
      ),
      (
        "color".to_string(),
        "sometimes".to_string()
      )
    ]);
    assert!(cfg.settings().is_err());
    assert!(cfg.color().is_err());
  }

  #[test]
  fn data_dir_override_is_created() {
    let temp =
      tempdir().expect("tempdir");
    let wanted =
      temp.path().join("nested/data");
    let dir = resolve_data_dir(
      &Config::defaults(),
      Some(&wanted)
    )
    .expect("resolve");
    assert_eq!(dir, wanted);
    assert!(dir.is_dir());
  }

  #[test]
  fn only_home_prefixes_expand() {
    assert_eq!(
      expand_home("/srv/daydash")
        .expect("absolute"),
      PathBuf::from("/srv/daydash")
    );
    assert_eq!(
      expand_home("~user/data")
        .expect("literal"),
      PathBuf::from("~user/data")
    );
  }
}
