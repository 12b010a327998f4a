use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use globset::{
  GlobBuilder,
  GlobSet,
  GlobSetBuilder
};
use ignore::WalkBuilder;
use kestrel_core::config::{
  PerfBudgetConfig,
  Severity
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info
};

use crate::report::Issue;

/// Contents of `perf-budget.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetFile {
  pub budgets:  Vec<Budget>,
  #[serde(default)]
  pub total_kb: Option<f64>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Budget {
  /// Glob over paths relative to the dist
  /// directory, e.g. `*.wasm`.
  pub pattern: String,
  pub max_kb:  f64
}

#[derive(Debug, Clone, Serialize)]
pub struct Asset {
  pub path:  PathBuf,
  pub bytes: u64
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetUsage {
  pub pattern: String,
  pub files:   usize,
  pub used_kb: f64,
  pub max_kb:  f64,
  pub ratio:   f64
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PerfDetails {
  pub total_kb: f64,
  pub budgets:  Vec<BudgetUsage>,
  pub assets:   Vec<Asset>
}

/// `*` stays within one path segment,
/// `**/` crosses segments. A pattern
/// without `/` matches the file name at
/// any depth.
pub fn budget_globs(
  budgets: &[Budget]
) -> anyhow::Result<GlobSet> {
  let mut set = GlobSetBuilder::new();
  for entry in budgets {
    let pattern = if entry.pattern.contains('/') {
      entry.pattern.clone()
    } else {
      format!("**/{}", entry.pattern)
    };
    let glob = GlobBuilder::new(&pattern)
      .literal_separator(true)
      .build()
      .with_context(|| {
        format!("invalid budget pattern {}", entry.pattern)
      })?;
    set.add(glob);
  }
  set.build().context("failed to build budget globs")
}

fn collect_assets(
  dist: &Path
) -> anyhow::Result<Vec<Asset>> {
  let mut out = Vec::new();
  let walker = WalkBuilder::new(dist)
    .standard_filters(false)
    .build();
  for entry in walker {
    let entry = entry.with_context(|| {
      format!("failed to walk {}", dist.display())
    })?;
    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
      continue;
    }
    let bytes = entry
      .metadata()
      .with_context(|| {
        format!("failed to stat {}", entry.path().display())
      })?
      .len();
    let rel = entry
      .path()
      .strip_prefix(dist)
      .unwrap_or(entry.path())
      .to_path_buf();
    out.push(Asset { path: rel, bytes });
  }
  out.sort_by(|a, b| a.path.cmp(&b.path));
  Ok(out)
}

fn to_kb(bytes: u64) -> f64 {
  bytes as f64 / 1024.0
}

/// Checks assets against the budgets.
/// Over budget is an error; above
/// `warn_ratio` is a warning.
pub fn evaluate(
  budget: &BudgetFile,
  assets: &[Asset],
  warn_ratio: f64
) -> anyhow::Result<(Vec<Issue>, PerfDetails)> {
  let globs = budget_globs(&budget.budgets)?;
  let mut matched = vec![(0usize, 0u64); budget.budgets.len()];
  for asset in assets {
    for idx in globs.matches(&asset.path) {
      matched[idx].0 += 1;
      matched[idx].1 += asset.bytes;
    }
  }

  let mut issues = Vec::new();
  let mut usages = Vec::new();

  for (entry, &(files, bytes)) in
    budget.budgets.iter().zip(&matched)
  {
    let used_kb = to_kb(bytes);
    let ratio = if entry.max_kb > 0.0 {
      used_kb / entry.max_kb
    } else {
      f64::INFINITY
    };
    debug!(pattern = %entry.pattern, files, used_kb, "budget evaluated");

    if files == 0 {
      issues.push(Issue::new(
        Severity::Warning,
        "budget-unmatched",
        format!("no assets match {}", entry.pattern)
      ));
    } else if ratio > 1.0 {
      issues.push(Issue::new(
        Severity::Error,
        "over-budget",
        format!(
          "{} uses {used_kb:.1} KiB of {:.1} KiB",
          entry.pattern, entry.max_kb
        )
      ));
    } else if ratio >= warn_ratio {
      issues.push(Issue::new(
        Severity::Warning,
        "near-budget",
        format!(
          "{} at {:.0}% of budget",
          entry.pattern,
          ratio * 100.0
        )
      ));
    }

    usages.push(BudgetUsage {
      pattern: entry.pattern.clone(),
      files,
      used_kb,
      max_kb: entry.max_kb,
      ratio: if ratio.is_finite() { ratio } else { 0.0 }
    });
  }

  let total_kb =
    to_kb(assets.iter().map(|a| a.bytes).sum());
  if let Some(limit) = budget.total_kb
    && total_kb > limit
  {
    issues.push(Issue::new(
      Severity::Error,
      "over-total-budget",
      format!(
        "dist totals {total_kb:.1} KiB, limit {limit:.1} KiB"
      )
    ));
  }

  Ok((issues, PerfDetails {
    total_kb,
    budgets: usages,
    assets: assets.to_vec()
  }))
}

#[tracing::instrument(skip(cfg))]
pub fn run(
  root: &Path,
  cfg: &PerfBudgetConfig
) -> anyhow::Result<(Vec<Issue>, PerfDetails)> {
  let budget_path = root.join(&cfg.budget_file);
  let raw = fs::read_to_string(&budget_path)
    .with_context(|| {
      format!(
        "failed to read budget file {}",
        budget_path.display()
      )
    })?;
  let budget: BudgetFile = serde_json::from_str(&raw)
    .with_context(|| {
      format!(
        "invalid budget file {}",
        budget_path.display()
      )
    })?;

  let dist = root.join(&cfg.dist_dir);
  if !dist.is_dir() {
    let issue = Issue::new(
      Severity::Error,
      "dist-missing",
      "build output not found; build the site first"
    )
    .at(&dist, None);
    return Ok((vec![issue], PerfDetails::default()));
  }

  let assets = collect_assets(&dist)?;
  info!(assets = assets.len(), "collected build assets");

  evaluate(&budget, &assets, cfg.warn_ratio)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn asset(path: &str, kb: u64) -> Asset {
    Asset {
      path:  PathBuf::from(path),
      bytes: kb * 1024
    }
  }

  fn budget(pattern: &str) -> Budget {
    Budget {
      pattern: pattern.to_string(),
      max_kb:  1.0
    }
  }

  #[test]
  fn globs_respect_segments() {
    let set = budget_globs(&[
      budget("*.wasm"),
      budget("assets/*.css"),
      budget("assets/**/*.css"),
    ])
    .expect("globs");

    assert_eq!(set.matches("kestrel_web_bg.wasm"), vec![0]);
    assert_eq!(set.matches("pkg/kestrel_web_bg.wasm"), vec![0]);
    assert!(set.matches("kestrel.wasm.map").is_empty());
    assert_eq!(set.matches("assets/site.css"), vec![1, 2]);
    assert_eq!(set.matches("assets/vendor/x.css"), vec![2]);
  }

  #[test]
  fn bad_pattern_is_reported() {
    let err = budget_globs(&[budget("assets/[.css")])
      .expect_err("unclosed class");
    assert!(err.to_string().contains("assets/[.css"));
  }

  #[test]
  fn grades_budgets() {
    let budget = BudgetFile {
      budgets:  vec![
        Budget {
          pattern: "*.wasm".to_string(),
          max_kb:  100.0
        },
        Budget {
          pattern: "*.js".to_string(),
          max_kb:  9.5
        },
        Budget {
          pattern: "*.css".to_string(),
          max_kb:  50.0
        },
        Budget {
          pattern: "*.png".to_string(),
          max_kb:  50.0
        },
      ],
      total_kb: Some(130.0)
    };
    let assets = [
      asset("app_bg.wasm", 120),
      asset("app.js", 9),
      asset("style.css", 10),
    ];
    let (issues, details) =
      evaluate(&budget, &assets, 0.9).expect("evaluate");

    let rules: Vec<(&str, Severity)> = issues
      .iter()
      .map(|i| (i.rule.as_str(), i.severity))
      .collect();
    assert_eq!(
      rules,
      vec![
        ("over-budget", Severity::Error),
        ("near-budget", Severity::Warning),
        ("budget-unmatched", Severity::Warning),
        ("over-total-budget", Severity::Error),
      ]
    );
    assert_eq!(details.total_kb, 139.0);
  }

  #[test]
  fn missing_dist_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
      dir.path().join("perf-budget.json"),
      r#"{ "budgets": [ { "pattern": "*.js", "max_kb": 1 } ] }"#
    )
    .expect("write budget");

    let (issues, _) =
      run(dir.path(), &PerfBudgetConfig::default())
        .expect("run");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule, "dist-missing");
  }

  #[test]
  fn reads_dist_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
      dir.path().join("perf-budget.json"),
      r#"{ "budgets": [ { "pattern": "*.js", "max_kb": 1 } ] }"#
    )
    .expect("write budget");
    let nested = dir.path().join("dist").join("js");
    fs::create_dir_all(&nested).expect("mkdir");
    fs::write(nested.join("app.js"), vec![b'x'; 2048])
      .expect("write asset");
    fs::write(
      dir.path().join("dist").join(".gitignore"),
      "*.map\n"
    )
    .expect("write ignore");
    fs::write(nested.join("app.js.map"), b"{}")
      .expect("write map");

    let (issues, details) =
      run(dir.path(), &PerfBudgetConfig::default())
        .expect("run");
    let paths: Vec<&Path> = details
      .assets
      .iter()
      .map(|a| a.path.as_path())
      .collect();
    assert_eq!(
      paths,
      vec![
        Path::new(".gitignore"),
        Path::new("js/app.js"),
        Path::new("js/app.js.map"),
      ]
    );
    assert_eq!(issues[0].rule, "over-budget");
  }
}
