use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::process::{
  Command,
  Stdio
};

use anyhow::{
  Context,
  anyhow
};
use kestrel_core::config::{
  CheckCommand,
  Severity,
  StandardsConfig
};
use ignore::WalkBuilder;
use regex::Regex;
use serde::Serialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::report::Issue;

/// A regex applied to each source line.
struct LineRule {
  id:       &'static str,
  severity: Severity,
  pattern:  Regex,
  message:  &'static str
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
  pub name:    String,
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub code:    Option<i32>
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StandardsDetails {
  pub files_scanned: usize,
  pub commands:      Vec<CommandOutcome>
}

fn line_rules(
  cfg: &StandardsConfig
) -> anyhow::Result<Vec<LineRule>> {
  let compile = |raw: &str| {
    Regex::new(raw).map_err(|e| {
      anyhow!("internal regex compile failure: {e}")
    })
  };

  let mut rules = Vec::new();
  if cfg.forbid_unwrap {
    rules.push(LineRule {
      id:       "no-unwrap",
      severity: Severity::Error,
      pattern:  compile(r"\.unwrap\(\)")?,
      message:  "unwrap() outside tests; propagate the error instead"
    });
  }
  if cfg.forbid_dbg {
    rules.push(LineRule {
      id:       "no-dbg",
      severity: Severity::Error,
      pattern:  compile(r"\bdbg!\s*\(")?,
      message:  "leftover dbg! macro"
    });
  }
  if cfg.todo_requires_owner {
    rules.push(LineRule {
      id:       "todo-owner",
      severity: Severity::Warning,
      pattern:  compile(r"\b(TODO|FIXME)\b[^(]|\b(TODO|FIXME)$")?,
      message:  "TODO without an owner, write TODO(name)"
    });
  }
  Ok(rules)
}

/// Source files under `dir`, honouring
/// `.gitignore`, `.ignore` and hidden
/// entries.
fn collect_sources(
  dir: &Path,
  extensions: &[String],
  out: &mut Vec<PathBuf>
) -> anyhow::Result<()> {
  let walker = WalkBuilder::new(dir)
    .require_git(false)
    .build();
  for entry in walker {
    let entry = entry.with_context(|| {
      format!("failed to walk {}", dir.display())
    })?;
    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
      continue;
    }
    let matches_ext = entry
      .path()
      .extension()
      .is_some_and(|ext| {
        extensions
          .iter()
          .any(|want| ext.to_string_lossy() == want.as_str())
      });
    if matches_ext {
      out.push(entry.into_path());
    }
  }
  Ok(())
}

fn is_test_file(path: &Path) -> bool {
  path
    .components()
    .any(|c| c.as_os_str() == "tests")
}

/// Applies line rules to one file. Lines
/// after `#[cfg(test)]` are exempt from
/// error rules.
fn scan_source(
  path: &Path,
  text: &str,
  cfg: &StandardsConfig,
  rules: &[LineRule]
) -> Vec<Issue> {
  let mut issues = Vec::new();
  let line_count = text.lines().count();
  if line_count > cfg.max_file_lines {
    issues.push(
      Issue::new(
        Severity::Warning,
        "max-file-lines",
        format!(
          "{line_count} lines (limit {})",
          cfg.max_file_lines
        )
      )
      .at(path, None)
    );
  }

  let mut in_tests = is_test_file(path);
  for (idx, line) in text.lines().enumerate() {
    let trimmed = line.trim_start();
    if trimmed.starts_with("#[cfg(test)]") {
      in_tests = true;
    }
    let is_comment = trimmed.starts_with("//");
    for rule in rules {
      if rule.severity == Severity::Error
        && (in_tests || is_comment)
      {
        continue;
      }
      if rule.pattern.is_match(line) {
        issues.push(
          Issue::new(rule.severity, rule.id, rule.message)
            .at(path, Some(idx + 1))
        );
      }
    }
  }
  issues
}

fn run_check(
  root: &Path,
  check: &CheckCommand
) -> (CommandOutcome, Option<Issue>) {
  debug!(name = %check.name, program = %check.program, args = ?check.args, "running check");
  let output = Command::new(&check.program)
    .args(&check.args)
    .current_dir(root)
    .stdin(Stdio::null())
    .output();

  match output {
    | Err(err) => {
      warn!(name = %check.name, error = %err, "check could not start");
      (
        CommandOutcome {
          name:    check.name.clone(),
          success: false,
          code:    None
        },
        Some(Issue::new(
          Severity::Warning,
          &check.name,
          format!("could not run {}: {err}", check.program)
        ))
      )
    }
    | Ok(out) => {
      let outcome = CommandOutcome {
        name:    check.name.clone(),
        success: out.status.success(),
        code:    out.status.code()
      };
      if out.status.success() {
        return (outcome, None);
      }
      let stderr = String::from_utf8_lossy(&out.stderr);
      let stdout = String::from_utf8_lossy(&out.stdout);
      let tail = stderr
        .lines()
        .chain(stdout.lines())
        .find(|l| !l.trim().is_empty())
        .unwrap_or("no output")
        .trim()
        .to_string();
      (
        outcome,
        Some(Issue::new(
          check.severity,
          &check.name,
          format!("{} failed: {tail}", check.program)
        ))
      )
    }
  }
}

#[tracing::instrument(skip(cfg))]
pub fn run(
  root: &Path,
  cfg: &StandardsConfig
) -> anyhow::Result<(Vec<Issue>, StandardsDetails)> {
  let rules = line_rules(cfg)?;
  let mut files = Vec::new();
  let mut issues = Vec::new();

  for dir in &cfg.source_dirs {
    let dir = root.join(dir);
    if !dir.is_dir() {
      issues.push(
        Issue::new(
          Severity::Warning,
          "source-dir",
          "configured source directory is missing"
        )
        .at(&dir, None)
      );
      continue;
    }
    collect_sources(&dir, &cfg.extensions, &mut files)?;
  }
  files.sort();

  for file in &files {
    let text = fs::read_to_string(file).with_context(|| {
      format!("failed to read {}", file.display())
    })?;
    let rel = file.strip_prefix(root).unwrap_or(file.as_path());
    issues.extend(scan_source(rel, &text, cfg, &rules));
  }
  info!(files = files.len(), "scanned sources");

  let mut details = StandardsDetails {
    files_scanned: files.len(),
    commands:      Vec::new()
  };
  for check in &cfg.commands {
    let (outcome, issue) = run_check(root, check);
    details.commands.push(outcome);
    issues.extend(issue);
  }

  Ok((issues, details))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cfg() -> StandardsConfig {
    StandardsConfig {
      max_file_lines: 5,
      todo_requires_owner: true,
      commands: vec![],
      ..StandardsConfig::default()
    }
  }

  #[test]
  fn flags_unwrap_outside_tests_only() {
    let cfg = cfg();
    let rules = line_rules(&cfg).expect("rules");
    let text = "fn a() {\n  x.unwrap();\n  // y.unwrap()\n}\n#[cfg(test)]\nmod t { fn b() { z.unwrap(); dbg!(1); } }\n";
    let issues = scan_source(Path::new("src/lib.rs"), text, &cfg, &rules);

    let ids: Vec<(&str, Option<usize>)> = issues
      .iter()
      .map(|i| (i.rule.as_str(), i.line))
      .collect();
    assert_eq!(
      ids,
      vec![("max-file-lines", None), ("no-unwrap", Some(2))]
    );
  }

  #[test]
  fn todo_needs_owner() {
    let cfg = cfg();
    let rules = line_rules(&cfg).expect("rules");
    let issues = scan_source(
      Path::new("tests/flow.rs"),
      "// TODO tidy\n// TODO(ana): ok\n",
      &cfg,
      &rules
    );
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule, "todo-owner");
    assert_eq!(issues[0].severity, Severity::Warning);
  }

  #[test]
  fn missing_program_is_a_warning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (outcome, issue) = run_check(
      dir.path(),
      &CheckCommand {
        name:     "lint".to_string(),
        program:  "kestrel-no-such-binary".to_string(),
        args:     vec![],
        severity: Severity::Error
      }
    );
    assert!(!outcome.success);
    assert_eq!(
      issue.map(|i| i.severity),
      Some(Severity::Warning)
    );
  }

  #[test]
  fn walks_nested_sources() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("crates").join("a").join("src");
    fs::create_dir_all(&src).expect("mkdir");
    fs::create_dir_all(dir.path().join("crates").join("target"))
      .expect("mkdir");
    fs::write(src.join("lib.rs"), "fn f() { dbg!(2); }\n")
      .expect("write");
    fs::write(
      dir.path().join("crates").join(".gitignore"),
      "target/\n"
    )
    .expect("write ignore");
    fs::write(
      dir.path().join("crates").join("target").join("gen.rs"),
      "fn g() { dbg!(3); }\n"
    )
    .expect("write");

    let cfg = StandardsConfig {
      commands: vec![],
      ..StandardsConfig::default()
    };
    let (issues, details) = run(dir.path(), &cfg).expect("run");
    assert_eq!(details.files_scanned, 1);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule, "no-dbg");
    assert_eq!(
      issues[0].file.as_deref(),
      Some(Path::new("crates/a/src/lib.rs"))
    );
  }
}
