use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::{
  NaiveDate,
  Weekday
};
use clap::{
  ArgAction,
  Args,
  Parser,
  Subcommand,
  ValueEnum
};
use regex::Regex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::datetime::{
  parse_iso_date,
  parse_week_start
};
use crate::selection::SelectionMode;
use crate::theme::ThemeMode;

/// `LEFT=RIGHT` pair used by several
/// flags.
#[derive(Debug, Clone)]
pub struct KeyVal {
  pub key:   String,
  pub value: String
}

impl std::str::FromStr for KeyVal {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let (k, v) =
      s.split_once('=').ok_or_else(|| {
        anyhow!(
          "expected KEY=VALUE, got: {s}"
        )
      })?;
    Ok(Self {
      key:   k.trim().to_string(),
      value: v.trim().to_string()
    })
  }
}

/// Dotted config override such as
/// `site.name=Acme`.
fn parse_override(
  s: &str
) -> anyhow::Result<KeyVal> {
  let kv: KeyVal = s.parse()?;
  let key_re = Regex::new(
    r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)+$"
  )
  .map_err(|e| {
    anyhow!("internal regex compile failure: {e}")
  })?;
  if !key_re.is_match(&kv.key) {
    return Err(anyhow!(
      "override key must look like \
       section.field, got: {}",
      kv.key
    ));
  }
  Ok(kv)
}

fn parse_week_start_arg(
  s: &str
) -> anyhow::Result<Weekday> {
  parse_week_start(s).ok_or_else(|| {
    anyhow!("unknown weekday: {s}")
  })
}

#[derive(Parser, Debug, Clone)]
#[command(
  name = "kestrel",
  version,
  about = "Kestrel: site components, \
           slides and SEO metadata from \
           the command line",
  disable_help_subcommand = true
)]
pub struct GlobalCli {
  #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
  pub verbose: u8,

  #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
  pub quiet: u8,

  /// Path to kestrel.toml.
  #[arg(long = "config", global = true)]
  pub config: Option<PathBuf>,

  /// Override a config value, e.g.
  /// `--set calendar.week_start=monday`.
  #[arg(
    long = "set",
    value_parser = clap::builder::ValueParser::new(parse_override),
    action = ArgAction::Append,
    global = true
  )]
  pub overrides: Vec<KeyVal>,

  #[arg(long = "no-color", global = true)]
  pub no_color: bool,

  #[command(subcommand)]
  pub command: Command
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
  /// Print a month grid, optionally
  /// replaying clicks through the date
  /// picker.
  Calendar(CalendarArgs),
  /// Split a markdown deck into slides.
  Slides(SlidesArgs),
  /// Print SEO head tags for a page.
  Meta(MetaArgs),
  /// Print JSON-LD structured data.
  Jsonld(JsonLdArgs),
  /// Show or change the stored theme.
  Theme(ThemeArgs)
}

#[derive(Args, Debug, Clone)]
pub struct CalendarArgs {
  /// Month to show as YYYY-MM; defaults
  /// to the selection or today.
  #[arg(long)]
  pub month: Option<String>,

  #[arg(long, default_value = "single")]
  pub mode: SelectionMode,

  /// Date to click, in order. Repeatable.
  #[arg(
    long = "click",
    action = ArgAction::Append,
    value_parser = clap::builder::ValueParser::new(parse_iso_date)
  )]
  pub clicks: Vec<NaiveDate>,

  #[arg(long, value_parser = clap::builder::ValueParser::new(parse_iso_date))]
  pub min: Option<NaiveDate>,

  #[arg(long, value_parser = clap::builder::ValueParser::new(parse_iso_date))]
  pub max: Option<NaiveDate>,

  #[arg(
    long = "disable",
    action = ArgAction::Append,
    value_parser = clap::builder::ValueParser::new(parse_iso_date)
  )]
  pub disabled: Vec<NaiveDate>,

  #[arg(long)]
  pub disable_weekends: bool,

  /// Pretend today is this date.
  #[arg(long, value_parser = clap::builder::ValueParser::new(parse_iso_date))]
  pub today: Option<NaiveDate>,

  /// Weekday name such as `monday` or
  /// `mon`; overrides the config.
  #[arg(long, value_parser = clap::builder::ValueParser::new(parse_week_start_arg))]
  pub week_start: Option<Weekday>,

  /// Attach a time, e.g. `3:15pm`.
  #[arg(long)]
  pub time: Option<String>,

  /// Print the selection as JSON.
  #[arg(long)]
  pub json: bool
}

#[derive(Args, Debug, Clone)]
pub struct SlidesArgs {
  /// Markdown file, or `-` for stdin.
  pub file: PathBuf,

  /// Table of slides instead of HTML.
  #[arg(long)]
  pub outline: bool,

  #[arg(long, short = 'o')]
  pub output: Option<PathBuf>,

  /// Deck title for the HTML document.
  #[arg(long)]
  pub title: Option<String>,

  #[arg(long)]
  pub delimiter: Option<String>
}

#[derive(Args, Debug, Clone)]
pub struct MetaArgs {
  #[arg(long)]
  pub title: Option<String>,

  #[arg(long)]
  pub description: Option<String>,

  #[arg(long, default_value = "/")]
  pub path: String,

  #[arg(long)]
  pub image: Option<String>,

  #[arg(long, value_delimiter = ',')]
  pub keywords: Vec<String>,

  #[arg(long)]
  pub article: bool,

  #[arg(long)]
  pub noindex: bool,

  #[arg(long)]
  pub nofollow: bool,

  #[arg(long)]
  pub json: bool
}

#[derive(
  ValueEnum, Debug, Clone, Copy, PartialEq,
  Eq,
)]
pub enum JsonLdKind {
  Organization,
  Website,
  Webpage,
  Breadcrumbs,
  Article,
  Faq
}

#[derive(Args, Debug, Clone)]
pub struct JsonLdArgs {
  pub kind: JsonLdKind,

  #[arg(long, default_value = "/")]
  pub path: String,

  #[arg(long)]
  pub title: Option<String>,

  #[arg(long)]
  pub description: Option<String>,

  /// Breadcrumb as NAME=PATH. Repeatable.
  #[arg(long = "crumb", action = ArgAction::Append)]
  pub crumbs: Vec<KeyVal>,

  /// FAQ entry as QUESTION=ANSWER.
  #[arg(long = "faq", action = ArgAction::Append)]
  pub faq: Vec<KeyVal>,

  #[arg(long)]
  pub author: Option<String>,

  /// RFC 3339 publication time.
  #[arg(long)]
  pub published: Option<String>,

  /// Wrap in a `<script>` element.
  #[arg(long)]
  pub script: bool
}

#[derive(Args, Debug, Clone)]
pub struct ThemeArgs {
  /// New mode: light, dark or auto.
  pub mode: Option<ThemeMode>,

  /// Advance light, dark, auto.
  #[arg(long, conflicts_with = "mode")]
  pub cycle: bool,

  /// Resolve `auto` as if the system
  /// prefers dark.
  #[arg(long)]
  pub system_dark: bool
}

pub fn init_tracing(
  verbose: u8,
  quiet: u8
) -> anyhow::Result<()> {
  let default_level = if quiet >= 2 {
    "error"
  } else if quiet == 1 {
    "warn"
  } else if verbose >= 3 {
    "trace"
  } else if verbose == 2 {
    "debug"
  } else if verbose == 1 {
    "info"
  } else {
    "warn"
  };

  let env_filter =
    EnvFilter::try_from_default_env()
      .or_else(|_| {
        EnvFilter::try_new(default_level)
      })
      .map_err(|e| {
        anyhow!(
          "invalid RUST_LOG / log filter: {e}"
        )
      })?;

  let init_result =
    tracing_subscriber::fmt()
      .with_env_filter(env_filter)
      .with_writer(std::io::stderr)
      .with_target(true)
      .with_level(true)
      .with_ansi(
        std::io::stderr().is_terminal()
      )
      .try_init();

  if let Err(err) = init_result {
    debug!(error = %err, "tracing subscriber already set, continuing");
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_global_flags_after_subcommand(
  ) {
    let cli = GlobalCli::try_parse_from([
      "kestrel",
      "calendar",
      "--mode",
      "range",
      "--click",
      "2026-10-05",
      "--click",
      "2026-10-02",
      "-vv",
      "--set",
      "calendar.week_start=monday",
    ])
    .expect("parse");

    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.overrides.len(), 1);
    assert_eq!(
      cli.overrides[0].key,
      "calendar.week_start"
    );
    let Command::Calendar(args) = cli.command
    else {
      panic!("expected calendar command");
    };
    assert_eq!(args.mode, SelectionMode::Range);
    assert_eq!(args.clicks.len(), 2);
  }

  #[test]
  fn calendar_flags_use_shared_parsers() {
    let cli = GlobalCli::try_parse_from([
      "kestrel",
      "calendar",
      "--week-start",
      "Mon",
      "--min",
      "2026-10-01",
    ])
    .expect("parse");
    let Command::Calendar(args) = cli.command
    else {
      panic!("expected calendar command");
    };
    assert_eq!(args.week_start, Some(Weekday::Mon));
    assert_eq!(
      args.min,
      NaiveDate::from_ymd_opt(2026, 10, 1)
    );

    for bad in [
      ["--week-start", "someday"],
      ["--min", "10/01/2026"],
    ] {
      assert!(
        GlobalCli::try_parse_from(
          ["kestrel", "calendar"]
            .into_iter()
            .chain(bad)
        )
        .is_err()
      );
    }
  }

  #[test]
  fn rejects_bare_override_keys() {
    assert!(
      GlobalCli::try_parse_from([
        "kestrel", "--set", "name=x", "theme",
      ])
      .is_err()
    );
    assert!(parse_override("site.name=").is_ok());
  }

  #[test]
  fn theme_mode_and_cycle_conflict() {
    assert!(
      GlobalCli::try_parse_from([
        "kestrel", "theme", "dark", "--cycle",
      ])
      .is_err()
    );
  }
}
