use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use regex::Regex;
use tracing::info;

pub const DEFAULT_OUT_DIR: &str =
  "tests/components";

/// `DatePicker` -> `date_picker`.
pub fn snake_case(name: &str) -> String {
  let mut out = String::with_capacity(name.len() + 4);
  let chars: Vec<char> = name.chars().collect();
  for (idx, ch) in chars.iter().enumerate() {
    if ch.is_ascii_uppercase() {
      let prev_lower = idx > 0
        && chars[idx - 1].is_ascii_lowercase();
      let next_lower = chars
        .get(idx + 1)
        .is_some_and(|c| c.is_ascii_lowercase());
      let prev_upper = idx > 0
        && chars[idx - 1].is_ascii_uppercase();
      if prev_lower || (prev_upper && next_lower) {
        out.push('_');
      }
      out.push(ch.to_ascii_lowercase());
    } else {
      out.push(*ch);
    }
  }
  out
}

pub fn validate_name(
  name: &str
) -> anyhow::Result<()> {
  let re = Regex::new(r"^[A-Z][A-Za-z0-9]*$")
    .map_err(|e| {
      anyhow!("internal regex compile failure: {e}")
    })?;
  if !re.is_match(name) {
    return Err(anyhow!(
      "component name must be PascalCase, got: {name}"
    ));
  }
  Ok(())
}

pub fn render(name: &str) -> String {
  let snake = snake_case(name);
  format!(
    "//! Behaviour tests for the {name} component.

use chrono::NaiveDate;

fn today() -> NaiveDate {{
  NaiveDate::from_ymd_opt(2026, 1, 15).expect(\"valid date\")
}}

#[test]
#[ignore = \"fill in {name} default state\"]
fn {snake}_default_state() {{
  let _today = today();
}}

#[test]
#[ignore = \"fill in {name} interaction\"]
fn {snake}_handles_interaction() {{
  let _today = today();
}}

#[test]
#[ignore = \"fill in {name} controlled mode\"]
fn {snake}_follows_controlled_value() {{
  let _today = today();
}}
"
  )
}

/// Writes the skeleton; an existing file is
/// only replaced with `force`.
#[tracing::instrument]
pub fn generate(
  root: &Path,
  out_dir: &Path,
  name: &str,
  force: bool
) -> anyhow::Result<PathBuf> {
  validate_name(name)?;
  let dir = root.join(out_dir);
  let path =
    dir.join(format!("{}_test.rs", snake_case(name)));

  if path.exists() && !force {
    return Err(anyhow!(
      "{} already exists; pass --force to overwrite",
      path.display()
    ));
  }

  fs::create_dir_all(&dir).with_context(|| {
    format!("failed to create {}", dir.display())
  })?;
  fs::write(&path, render(name)).with_context(|| {
    format!("failed to write {}", path.display())
  })?;
  info!(file = %path.display(), "test template written");
  Ok(path)
}
