use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::date_picker::DEFAULT_DATE_FORMAT;
use crate::slides::{
  DEFAULT_DELIMITER,
  DEFAULT_FALLBACK_TITLE
};

pub const CONFIG_FILE: &str =
  "kestrel.toml";
pub const CONFIG_ENV_VAR: &str =
  "KESTREL_CONFIG";

#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Config {
  pub site:        SiteConfig,
  pub calendar:    CalendarConfig,
  pub slides:      SlidesConfig,
  pub theme:       ThemeConfig,
  pub tooling:     ToolingConfig,
  #[serde(skip)]
  pub loaded_from: Option<PathBuf>
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct SiteConfig {
  pub name:           String,
  pub base_url:       String,
  pub title_template: String,
  pub description:    String,
  pub locale:         String,
  pub keywords:       Vec<String>,
  pub twitter_handle: Option<String>,
  pub default_image:  Option<String>,
  pub logo:           Option<String>,
  pub social_links:   Vec<String>,
  /// Path with a `{search_term_string}`
  /// placeholder, e.g. `/search?q=...`.
  pub search_path:    Option<String>,
  pub contact_email:  Option<String>
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      name:           "Kestrel".to_string(),
      base_url:       "https://example.com"
        .to_string(),
      title_template: "%s | Kestrel"
        .to_string(),
      description:    "Kestrel brand site"
        .to_string(),
      locale:         "en_US".to_string(),
      keywords:       vec![],
      twitter_handle: None,
      default_image:  None,
      logo:           None,
      social_links:   vec![],
      search_path:    None,
      contact_email:  None
    }
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct CalendarConfig {
  pub week_start:  String,
  pub timezone:    String,
  pub date_format: String
}

impl Default for CalendarConfig {
  fn default() -> Self {
    Self {
      week_start:  "sunday".to_string(),
      timezone:    "UTC".to_string(),
      date_format: DEFAULT_DATE_FORMAT
        .to_string()
    }
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct SlidesConfig {
  pub delimiter:      String,
  pub fallback_title: String
}

impl Default for SlidesConfig {
  fn default() -> Self {
    Self {
      delimiter:      DEFAULT_DELIMITER
        .to_string(),
      fallback_title:
        DEFAULT_FALLBACK_TITLE.to_string()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct ThemeConfig {
  /// Where the CLI persists the chosen
  /// theme; defaults to the user config
  /// directory.
  pub state_file: Option<PathBuf>
}

#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct ToolingConfig {
  pub standards:   StandardsConfig,
  pub perf_budget: PerfBudgetConfig
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Warning,
  Error
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct CheckCommand {
  pub name:     String,
  pub program:  String,
  #[serde(default)]
  pub args:     Vec<String>,
  #[serde(default = "default_severity")]
  pub severity: Severity
}

fn default_severity() -> Severity {
  Severity::Error
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct StandardsConfig {
  pub report_path:         PathBuf,
  pub source_dirs:         Vec<PathBuf>,
  pub extensions:          Vec<String>,
  pub max_file_lines:      usize,
  pub forbid_unwrap:       bool,
  pub forbid_dbg:          bool,
  pub todo_requires_owner: bool,
  pub commands:            Vec<CheckCommand>
}

impl Default for StandardsConfig {
  fn default() -> Self {
    Self {
      report_path:         PathBuf::from(
        "reports/standards-report.json"
      ),
      source_dirs:         vec![PathBuf::from(
        "crates"
      )],
      extensions:          vec![
        "rs".to_string(),
      ],
      max_file_lines:      800,
      forbid_unwrap:       true,
      forbid_dbg:          true,
      todo_requires_owner: false,
      commands:            vec![
        CheckCommand {
          name:     "rustfmt".to_string(),
          program:  "cargo".to_string(),
          args:     vec![
            "fmt".to_string(),
            "--all".to_string(),
            "--check".to_string(),
          ],
          severity: Severity::Warning
        },
      ]
    }
  }
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(default)]
pub struct PerfBudgetConfig {
  pub budget_file: PathBuf,
  pub dist_dir:    PathBuf,
  pub report_path: PathBuf,
  /// Usage ratio above which an asset
  /// within budget is still reported as
  /// a warning.
  pub warn_ratio:  f64
}

impl Default for PerfBudgetConfig {
  fn default() -> Self {
    Self {
      budget_file: PathBuf::from(
        "perf-budget.json"
      ),
      dist_dir:    PathBuf::from("dist"),
      report_path: PathBuf::from(
        "reports/perf-budget-report.json"
      ),
      warn_ratio:  0.9
    }
  }
}

impl Config {
  /// Loads `kestrel.toml` from the first
  /// location that applies: explicit
  /// path, `KESTREL_CONFIG`, working
  /// directory. Missing files yield
  /// defaults.
  #[tracing::instrument(skip(overrides))]
  pub fn load<I>(
    config_override: Option<&Path>,
    overrides: I
  ) -> anyhow::Result<Self>
  where
    I: IntoIterator<Item = (String, String)>
  {
    let path =
      resolve_config_path(config_override)?;
    let text = match &path {
      | Some(path) => {
        info!(config = %path.display(), "loading config");
        fs::read_to_string(path)
          .with_context(|| {
            format!(
              "failed to read {}",
              path.display()
            )
          })?
      }
      | None => {
        warn!(
          "no {CONFIG_FILE} found; using \
           defaults"
        );
        String::new()
      }
    };

    let mut cfg =
      Self::from_toml_str(&text, overrides)
        .with_context(|| match &path {
          | Some(path) => {
            format!(
              "invalid config in {}",
              path.display()
            )
          }
          | None => {
            "invalid config overrides"
              .to_string()
          }
        })?;
    cfg.loaded_from = path;
    Ok(cfg)
  }

  /// Parses TOML text, applies dotted
  /// `key=value` overrides, then
  /// sanitises.
  pub fn from_toml_str<I>(
    text: &str,
    overrides: I
  ) -> anyhow::Result<Self>
  where
    I: IntoIterator<Item = (String, String)>
  {
    let base: toml::Table =
      toml::from_str(text)
        .context("failed to parse TOML")?;
    let overrides: Vec<(String, String)> =
      overrides.into_iter().collect();
    let schema = toml::Value::try_from(
      Config::default()
    )
    .context("failed to serialise defaults")?;

    let mut table = base.clone();
    for (key, value) in &overrides {
      debug!(key = %key, value = %value, "applying override");
      apply_override(
        &mut table, &schema, key, value, true
      )?;
    }

    let mut cfg: Config =
      match toml::Value::Table(table).try_into() {
        | Ok(cfg) => cfg,
        | Err(err) if !overrides.is_empty() => {
          debug!(error = %err, "retrying untyped overrides as strings");
          let mut table = base;
          for (key, value) in &overrides {
            apply_override(
              &mut table, &schema, key, value, false
            )?;
          }
          toml::Value::Table(table)
            .try_into()
            .context(
              "config does not match the \
               expected schema"
            )?
        }
        | Err(err) => {
          return Err(anyhow::Error::new(err).context(
            "config does not match the \
             expected schema"
          ));
        }
      };
    cfg.sanitize();
    Ok(cfg)
  }

  fn sanitize(&mut self) {
    let defaults = Config::default();

    if self.site.name.trim().is_empty() {
      warn!("site.name empty; using default");
      self.site.name = defaults.site.name;
    }
    let base = self
      .site
      .base_url
      .trim()
      .trim_end_matches('/')
      .to_string();
    if base.is_empty() {
      warn!(
        "site.base_url empty; using \
         default"
      );
      self.site.base_url =
        defaults.site.base_url;
    } else {
      self.site.base_url = base;
    }
    if !self.site.title_template.contains("%s")
    {
      warn!(
        template = %self.site.title_template,
        "title template lacks %s; using default"
      );
      self.site.title_template = format!(
        "%s | {}",
        self.site.name
      );
    }
    if self
      .calendar
      .date_format
      .trim()
      .is_empty()
    {
      self.calendar.date_format =
        defaults.calendar.date_format;
    }
    if crate::datetime::parse_week_start(
      &self.calendar.week_start
    )
    .is_none()
    {
      warn!(
        week_start = %self.calendar.week_start,
        "unknown calendar week_start; using default"
      );
      self.calendar.week_start =
        defaults.calendar.week_start;
    }
    if crate::datetime::parse_timezone(
      &self.calendar.timezone
    )
    .is_none()
    {
      warn!(
        timezone = %self.calendar.timezone,
        "invalid calendar timezone; using UTC"
      );
      self.calendar.timezone =
        defaults.calendar.timezone;
    }
    if self.slides.delimiter.trim().is_empty()
    {
      self.slides.delimiter =
        defaults.slides.delimiter;
    }
    let ratio =
      self.tooling.perf_budget.warn_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
      warn!(
        ratio,
        "perf_budget.warn_ratio out of \
         range; using default"
      );
      self.tooling.perf_budget.warn_ratio =
        defaults
          .tooling
          .perf_budget
          .warn_ratio;
    }
  }

  pub fn timezone(&self) -> chrono_tz::Tz {
    crate::datetime::parse_timezone(
      &self.calendar.timezone
    )
    .unwrap_or(chrono_tz::UTC)
  }

  pub fn week_start(
    &self
  ) -> chrono::Weekday {
    crate::datetime::parse_week_start(
      &self.calendar.week_start
    )
    .unwrap_or(chrono::Weekday::Sun)
  }

  pub fn theme_state_file(
    &self
  ) -> anyhow::Result<PathBuf> {
    if let Some(path) =
      &self.theme.state_file
    {
      return Ok(path.clone());
    }
    let base =
      dirs::config_dir().ok_or_else(
        || {
          anyhow!(
            "cannot determine config \
             directory"
          )
        }
      )?;
    Ok(base.join("kestrel").join("theme"))
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    if !path.exists() {
      return Err(anyhow!(
        "config file does not exist: {}",
        path.display()
      ));
    }
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Ok(Some(PathBuf::from(
        trimmed
      )));
    }
  }

  let candidate = PathBuf::from(CONFIG_FILE);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

/// Writes `value` at the dotted `key`
/// path, creating intermediate tables.
/// The value takes the type already at
/// that key, or the default's type. Keys
/// with neither are guessed when `infer`
/// is set and kept as strings otherwise.
fn apply_override(
  table: &mut toml::Table,
  schema: &toml::Value,
  key: &str,
  value: &str,
  infer: bool
) -> anyhow::Result<()> {
  let mut parts: Vec<&str> =
    key.split('.').map(str::trim).collect();
  let leaf = parts.pop().filter(|p| {
    !p.is_empty()
  });
  let Some(leaf) = leaf else {
    return Err(anyhow!(
      "empty override key: {key:?}"
    ));
  };

  let mut default = Some(schema);
  let mut current = table;
  for part in parts {
    default = default.and_then(|d| d.get(part));
    let entry = current
      .entry(part.to_string())
      .or_insert(toml::Value::Table(
        toml::Table::new()
      ));
    current = match entry {
      | toml::Value::Table(inner) => inner,
      | _ => {
        return Err(anyhow!(
          "override {key} crosses a \
           non-table value at {part}"
        ));
      }
    };
  }

  let hint = current
    .get(leaf)
    .or_else(|| default.and_then(|d| d.get(leaf)));
  let parsed =
    parse_override_value(value, hint, infer);
  current.insert(leaf.to_string(), parsed);
  Ok(())
}

fn parse_override_value(
  raw: &str,
  hint: Option<&toml::Value>,
  infer: bool
) -> toml::Value {
  let trimmed = raw.trim();
  let text =
    || toml::Value::String(trimmed.to_string());
  match hint {
    | Some(toml::Value::String(_)) => text(),
    | Some(toml::Value::Boolean(_)) => {
      trimmed
        .parse::<bool>()
        .map_or_else(|_| text(), toml::Value::Boolean)
    }
    | Some(toml::Value::Integer(_)) => {
      trimmed
        .parse::<i64>()
        .map_or_else(|_| text(), toml::Value::Integer)
    }
    | Some(toml::Value::Float(_)) => {
      match trimmed.parse::<f64>() {
        | Ok(float) if float.is_finite() => {
          toml::Value::Float(float)
        }
        | _ => text()
      }
    }
    | Some(toml::Value::Array(items)) => {
      let item_hint = items.first();
      toml::Value::Array(
        trimmed
          .split(',')
          .map(str::trim)
          .filter(|item| !item.is_empty())
          .map(|item| {
            parse_override_value(item, item_hint, infer)
          })
          .collect()
      )
    }
    | _ if infer => infer_override_value(trimmed),
    | _ => text()
  }
}

/// Type guess for keys without a known
/// type.
fn infer_override_value(
  trimmed: &str
) -> toml::Value {
  if let Ok(flag) = trimmed.parse::<bool>() {
    return toml::Value::Boolean(flag);
  }
  if let Ok(int) = trimmed.parse::<i64>() {
    return toml::Value::Integer(int);
  }
  match trimmed.parse::<f64>() {
    | Ok(float) if float.is_finite() => {
      toml::Value::Float(float)
    }
    | _ => toml::Value::String(
      trimmed.to_string()
    )
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn parses_sections_and_sanitizes() {
    let cfg = Config::from_toml_str(
      r#"
[site]
name = "Acme"
base_url = "https://acme.test/"
title_template = "no placeholder"

[calendar]
week_start = "monday"
timezone = "Not/AZone"
"#,
      Vec::new()
    )
    .expect("parse config");

    assert_eq!(cfg.site.name, "Acme");
    assert_eq!(
      cfg.site.base_url,
      "https://acme.test"
    );
    assert_eq!(
      cfg.site.title_template,
      "%s | Acme"
    );
    assert_eq!(cfg.calendar.timezone, "UTC");
    assert_eq!(
      cfg.week_start(),
      chrono::Weekday::Mon
    );
    assert_eq!(
      cfg.slides.delimiter,
      DEFAULT_DELIMITER
    );
  }

  #[test]
  fn dotted_overrides_win() {
    let cfg = Config::from_toml_str(
      "[site]\nname = \"Acme\"\n",
      vec![
        (
          "site.name".to_string(),
          "Override".to_string()
        ),
        (
          "tooling.standards.max_file_lines"
            .to_string(),
          "120".to_string()
        ),
        (
          "tooling.standards.forbid_dbg"
            .to_string(),
          "false".to_string()
        ),
      ]
    )
    .expect("parse config");

    assert_eq!(cfg.site.name, "Override");
    assert_eq!(
      cfg.tooling.standards.max_file_lines,
      120
    );
    assert!(!cfg.tooling.standards.forbid_dbg);
  }

  #[test]
  fn week_start_accepts_short_names() {
    let short = Config::from_toml_str(
      "[calendar]\nweek_start = \"Tue\"\n",
      Vec::<(String, String)>::new()
    )
    .expect("parse config");
    assert_eq!(short.week_start(), chrono::Weekday::Tue);
    assert_eq!(short.calendar.week_start, "Tue");

    let unknown = Config::from_toml_str(
      "[calendar]\nweek_start = \"someday\"\n",
      Vec::<(String, String)>::new()
    )
    .expect("parse config");
    assert_eq!(unknown.calendar.week_start, "sunday");
    assert_eq!(unknown.week_start(), chrono::Weekday::Sun);
  }

  #[test]
  fn overrides_follow_the_target_type() {
    let pair = |k: &str, v: &str| {
      (k.to_string(), v.to_string())
    };
    let cfg = Config::from_toml_str(
      "",
      vec![
        pair("site.name", "1984"),
        pair("slides.fallback_title", "nan"),
        pair("site.keywords", "rust, 2026"),
        pair("site.twitter_handle", "42"),
        pair("tooling.perf_budget.warn_ratio", "1"),
      ]
    )
    .expect("parse config");

    assert_eq!(cfg.site.name, "1984");
    assert_eq!(cfg.slides.fallback_title, "nan");
    assert_eq!(
      cfg.site.keywords,
      vec!["rust".to_string(), "2026".to_string()]
    );
    assert_eq!(
      cfg.site.twitter_handle.as_deref(),
      Some("42")
    );
    assert_eq!(cfg.tooling.perf_budget.warn_ratio, 1.0);
  }

  #[test]
  fn override_through_scalar_fails() {
    let err = Config::from_toml_str(
      "[site]\nname = \"Acme\"\n",
      vec![(
        "site.name.inner".to_string(),
        "x".to_string()
      )]
    );
    assert!(err.is_err());
  }

  #[test]
  fn loads_explicit_file() {
    let mut file =
      tempfile::NamedTempFile::new()
        .expect("temp file");
    writeln!(
      file,
      "[slides]\nfallback_title = \"Deck\""
    )
    .expect("write config");

    let cfg = Config::load(
      Some(file.path()),
      Vec::new()
    )
    .expect("load config");
    assert_eq!(
      cfg.slides.fallback_title,
      "Deck"
    );
    assert_eq!(
      cfg.loaded_from.as_deref(),
      Some(file.path())
    );
  }

  #[test]
  fn missing_explicit_file_is_an_error() {
    let dir =
      tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    assert!(
      Config::load(
        Some(&missing),
        Vec::new()
      )
      .is_err()
    );
  }
}
