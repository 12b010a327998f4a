mod perf_budget;
mod report;
mod standards;
mod test_template;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{
  ArgAction,
  Parser,
  Subcommand
};
use kestrel_core::cli::KeyVal;
use kestrel_core::config::Config;
use tracing::{
  debug,
  info
};

use crate::report::Report;

#[derive(Parser, Debug)]
#[command(
  name = "kestrel-tools",
  about = "Quality gates for the Kestrel site: standards, perf budget, test templates"
)]
struct Args {
  /// Repository root the tools operate on.
  #[arg(long, default_value = ".", global = true)]
  root: PathBuf,

  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[arg(
    long = "set",
    value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
    action = ArgAction::Append,
    global = true
  )]
  overrides: Vec<KeyVal>,

  #[arg(long, default_value = "warn", global = true)]
  log_level: String,

  #[command(subcommand)]
  tool: Tool
}

#[derive(Subcommand, Debug)]
enum Tool {
  /// Source rules plus configured check
  /// commands.
  Standards {
    #[arg(long)]
    report: Option<PathBuf>
  },
  /// Built asset sizes against
  /// perf-budget.json.
  PerfBudget {
    #[arg(long)]
    dist: Option<PathBuf>,
    #[arg(long)]
    budget: Option<PathBuf>,
    #[arg(long)]
    report: Option<PathBuf>
  },
  /// Write a test skeleton for a component.
  TestTemplate {
    component: String,
    #[arg(long, default_value = test_template::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,
    #[arg(long)]
    force: bool
  }
}

fn main() -> ExitCode {
  match run() {
    | Ok(true) => ExitCode::SUCCESS,
    | Ok(false) => ExitCode::FAILURE,
    | Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

/// Returns whether the run passed.
fn run() -> anyhow::Result<bool> {
  let args = Args::parse();
  init_tracing(&args.log_level)?;

  let config_path =
    args.config.clone().or_else(|| {
      let local = args.root.join(kestrel_core::config::CONFIG_FILE);
      local.exists().then_some(local)
    });
  let cfg = Config::load(
    config_path.as_deref(),
    args.overrides.into_iter().map(|kv| (kv.key, kv.value))
  )?;
  debug!(config = ?cfg.loaded_from, root = %args.root.display(), "tools starting");

  match args.tool {
    | Tool::Standards { report } => {
      let standards = &cfg.tooling.standards;
      let (issues, details) =
        standards::run(&args.root, standards)?;
      let report_path = report
        .unwrap_or_else(|| args.root.join(&standards.report_path));
      let report = Report::new("standards", issues, details);
      report.write(&report_path)?;
      report.print_summary();
      Ok(!report.has_errors())
    }
    | Tool::PerfBudget {
      dist,
      budget,
      report
    } => {
      let mut perf = cfg.tooling.perf_budget.clone();
      if let Some(dist) = dist {
        perf.dist_dir = dist;
      }
      if let Some(budget) = budget {
        perf.budget_file = budget;
      }
      let (issues, details) =
        perf_budget::run(&args.root, &perf)?;
      let report_path = report
        .unwrap_or_else(|| args.root.join(&perf.report_path));
      let report = Report::new("perf-budget", issues, details);
      report.write(&report_path)?;
      report.print_summary();
      Ok(!report.has_errors())
    }
    | Tool::TestTemplate {
      component,
      out_dir,
      force
    } => {
      let path = test_template::generate(
        &args.root, &out_dir, &component, force
      )?;
      info!(component = %component, "template generated");
      println!("wrote {}", path.display());
      Ok(true)
    }
  }
}

fn init_tracing(
  level: &str
) -> anyhow::Result<()> {
  let filter =
    tracing_subscriber::EnvFilter::try_from_default_env()
      .or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(level)
      })
      .or_else(|_| {
        tracing_subscriber::EnvFilter::try_new("warn")
      })
      .map_err(|e| anyhow!("invalid log level: {e}"))?;

  let init_result = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(true)
    .with_ansi(std::io::stderr().is_terminal())
    .try_init();

  if let Err(err) = init_result {
    debug!(error = %err, "tracing subscriber already set, continuing");
  }

  Ok(())
}
