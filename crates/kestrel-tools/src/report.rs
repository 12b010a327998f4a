use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use chrono::{
  DateTime,
  Utc
};
use kestrel_core::config::Severity;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
  pub severity: Severity,
  pub rule:     String,
  pub message:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file:     Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub line:     Option<usize>
}

impl Issue {
  pub fn new(
    severity: Severity,
    rule: &str,
    message: impl Into<String>
  ) -> Self {
    Self {
      severity,
      rule: rule.to_string(),
      message: message.into(),
      file: None,
      line: None
    }
  }

  #[must_use]
  pub fn at(
    mut self,
    file: &Path,
    line: Option<usize>
  ) -> Self {
    self.file = Some(file.to_path_buf());
    self.line = line;
    self
  }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Summary {
  pub errors:   usize,
  pub warnings: usize
}

/// JSON report written by every tool.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T: Serialize> {
  pub tool:         &'static str,
  pub generated_at: DateTime<Utc>,
  pub passed:       bool,
  pub summary:      Summary,
  pub issues:       Vec<Issue>,
  pub details:      T
}

impl<T: Serialize> Report<T> {
  pub fn new(
    tool: &'static str,
    issues: Vec<Issue>,
    details: T
  ) -> Self {
    let summary = summarize(&issues);
    Self {
      tool,
      generated_at: Utc::now(),
      passed: summary.errors == 0,
      summary,
      issues,
      details
    }
  }

  pub fn has_errors(&self) -> bool {
    self.summary.errors > 0
  }

  #[tracing::instrument(skip(self), fields(tool = self.tool))]
  pub fn write(
    &self,
    path: &Path
  ) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
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
    let json = serde_json::to_string_pretty(self)
      .context("failed to serialize report")?;
    fs::write(path, json).with_context(|| {
      format!(
        "failed to write report {}",
        path.display()
      )
    })?;
    info!(
      report = %path.display(),
      errors = self.summary.errors,
      warnings = self.summary.warnings,
      "report written"
    );
    Ok(())
  }

  pub fn print_summary(&self) {
    println!(
      "{}: {} error(s), {} warning(s)",
      self.tool,
      self.summary.errors,
      self.summary.warnings
    );
    for issue in &self.issues {
      let label = match issue.severity {
        | Severity::Error => "error",
        | Severity::Warning => "warning"
      };
      let location = match (&issue.file, issue.line) {
        | (Some(file), Some(line)) => {
          format!(" {}:{line}", file.display())
        }
        | (Some(file), None) => {
          format!(" {}", file.display())
        }
        | _ => String::new()
      };
      println!(
        "  {label}[{}]{location}: {}",
        issue.rule, issue.message
      );
    }
  }
}

pub fn summarize(issues: &[Issue]) -> Summary {
  issues.iter().fold(
    Summary::default(),
    |mut acc, issue| {
      match issue.severity {
        | Severity::Error => acc.errors += 1,
        | Severity::Warning => acc.warnings += 1
      }
      acc
    }
  )
}

#[cfg(test)]
mod tests {
  use serde_json::{
    Value,
    json
  };

  use super::*;

  #[test]
  fn warnings_alone_still_pass() {
    let report = Report::new(
      "standards",
      vec![Issue::new(
        Severity::Warning,
        "max-file-lines",
        "too long"
      )],
      json!({})
    );
    assert!(report.passed);
    assert!(!report.has_errors());
  }

  #[test]
  fn writes_nested_report_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reports").join("x.json");
    let report = Report::new(
      "perf-budget",
      vec![
        Issue::new(Severity::Error, "budget", "over")
          .at(Path::new("dist/app.wasm"), None),
      ],
      json!({ "assets": 1 })
    );
    report.write(&path).expect("write");

    let raw = fs::read_to_string(&path).expect("read");
    let value: Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["passed"], false);
    assert_eq!(value["summary"]["errors"], 1);
    assert_eq!(value["issues"][0]["file"], "dist/app.wasm");
    assert!(value["issues"][0].get("line").is_none());
  }
}
