use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

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

pub const THEME_STORAGE_KEY: &str =
  "kestrel.theme";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
  Light,
  Dark,
  #[default]
  Auto
}

/// What actually gets painted.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
  Light,
  Dark
}

impl ThemeMode {
  pub fn storage_value(
    self
  ) -> &'static str {
    match self {
      | ThemeMode::Light => "light",
      | ThemeMode::Dark => "dark",
      | ThemeMode::Auto => "auto"
    }
  }

  #[must_use]
  pub fn cycled(self) -> Self {
    match self {
      | ThemeMode::Light => ThemeMode::Dark,
      | ThemeMode::Dark => ThemeMode::Auto,
      | ThemeMode::Auto => ThemeMode::Light
    }
  }

  pub fn resolve(
    self,
    system_prefers_dark: bool
  ) -> ResolvedTheme {
    match self {
      | ThemeMode::Light => {
        ResolvedTheme::Light
      }
      | ThemeMode::Dark => {
        ResolvedTheme::Dark
      }
      | ThemeMode::Auto => {
        if system_prefers_dark {
          ResolvedTheme::Dark
        } else {
          ResolvedTheme::Light
        }
      }
    }
  }
}

impl ResolvedTheme {
  pub fn class_name(
    self
  ) -> &'static str {
    match self {
      | ResolvedTheme::Light => "light",
      | ResolvedTheme::Dark => "dark"
    }
  }
}

impl fmt::Display for ThemeMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.storage_value())
  }
}

impl FromStr for ThemeMode {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "light" | "day" => {
        Ok(ThemeMode::Light)
      }
      | "dark" | "night" => {
        Ok(ThemeMode::Dark)
      }
      | "auto" | "system" => {
        Ok(ThemeMode::Auto)
      }
      | other => {
        Err(anyhow!(
          "unknown theme mode: {other}"
        ))
      }
    }
  }
}

/// Persistence for the chosen theme.
pub trait ThemeStore {
  fn load(&self) -> Option<String>;
  fn save(
    &self,
    value: &str
  ) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryThemeStore {
  value: RefCell<Option<String>>
}

impl MemoryThemeStore {
  pub fn with_value(value: &str) -> Self {
    Self {
      value: RefCell::new(Some(
        value.to_string()
      ))
    }
  }
}

impl ThemeStore for MemoryThemeStore {
  fn load(&self) -> Option<String> {
    self.value.borrow().clone()
  }

  fn save(
    &self,
    value: &str
  ) -> anyhow::Result<()> {
    *self.value.borrow_mut() =
      Some(value.to_string());
    Ok(())
  }
}

/// Stores the mode as a one-word file.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
  path: PathBuf
}

impl FileThemeStore {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }
}

impl ThemeStore for FileThemeStore {
  fn load(&self) -> Option<String> {
    match fs::read_to_string(&self.path) {
      | Ok(raw) => Some(raw.trim().to_string()),
      | Err(err) => {
        debug!(
          file = %self.path.display(),
          error = %err,
          "no stored theme"
        );
        None
      }
    }
  }

  fn save(
    &self,
    value: &str
  ) -> anyhow::Result<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)
        .with_context(|| {
          format!(
            "failed to create {}",
            parent.display()
          )
        })?;
    }
    fs::write(&self.path, value)
      .with_context(|| {
        format!(
          "failed to write {}",
          self.path.display()
        )
      })
  }
}

/// Theme state passed explicitly to
/// whatever renders, with persistence
/// injected.
pub struct ThemeController<S: ThemeStore> {
  store:               S,
  mode:                ThemeMode,
  system_prefers_dark: bool
}

impl<S: ThemeStore> ThemeController<S> {
  /// Reads the stored mode; unknown or
  /// missing values mean `auto`.
  pub fn load(
    store: S,
    system_prefers_dark: bool
  ) -> Self {
    let mode = match store.load() {
      | Some(raw) => {
        raw.parse().unwrap_or_else(
          |err: anyhow::Error| {
            warn!(stored = %raw, error = %err, "ignoring stored theme");
            ThemeMode::Auto
          }
        )
      }
      | None => ThemeMode::Auto
    };
    info!(%mode, "theme loaded");

    Self {
      store,
      mode,
      system_prefers_dark
    }
  }

  pub fn mode(&self) -> ThemeMode {
    self.mode
  }

  pub fn resolved(&self) -> ResolvedTheme {
    self.mode.resolve(
      self.system_prefers_dark
    )
  }

  pub fn set_mode(
    &mut self,
    mode: ThemeMode
  ) -> anyhow::Result<ResolvedTheme> {
    self
      .store
      .save(mode.storage_value())?;
    self.mode = mode;
    debug!(%mode, "theme saved");
    Ok(self.resolved())
  }

  pub fn toggle(
    &mut self
  ) -> anyhow::Result<ThemeMode> {
    let next = self.mode.cycled();
    self.set_mode(next)?;
    Ok(next)
  }

  /// System colour-scheme change; only
  /// visible in `auto`.
  pub fn set_system_preference(
    &mut self,
    prefers_dark: bool
  ) -> ResolvedTheme {
    self.system_prefers_dark = prefers_dark;
    self.resolved()
  }

  pub fn store(&self) -> &S {
    &self.store
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_stored_value_falls_back_to_auto(
  ) {
    let ctl = ThemeController::load(
      MemoryThemeStore::with_value(
        "sepia"
      ),
      true
    );
    assert_eq!(ctl.mode(), ThemeMode::Auto);
    assert_eq!(
      ctl.resolved(),
      ResolvedTheme::Dark
    );
  }

  #[test]
  fn toggle_cycles_and_persists() {
    let mut ctl = ThemeController::load(
      MemoryThemeStore::with_value(
        "light"
      ),
      false
    );
    assert_eq!(
      ctl.toggle().expect("toggle"),
      ThemeMode::Dark
    );
    assert_eq!(
      ctl.store().load().as_deref(),
      Some("dark")
    );
    assert_eq!(
      ctl.toggle().expect("toggle"),
      ThemeMode::Auto
    );
    assert_eq!(
      ctl.set_system_preference(true),
      ResolvedTheme::Dark
    );
  }

  #[test]
  fn file_store_round_trips() {
    let dir =
      tempfile::tempdir().expect("tempdir");
    let path =
      dir.path().join("nested").join("theme");
    let mut ctl = ThemeController::load(
      FileThemeStore::new(path.clone()),
      false
    );
    assert_eq!(ctl.mode(), ThemeMode::Auto);
    ctl
      .set_mode(ThemeMode::Dark)
      .expect("save theme");

    let reloaded = ThemeController::load(
      FileThemeStore::new(path),
      false
    );
    assert_eq!(
      reloaded.mode(),
      ThemeMode::Dark
    );
  }
}
