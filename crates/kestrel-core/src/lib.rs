pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controllable;
pub mod date_picker;
pub mod datetime;
pub mod metadata;
pub mod render;
pub mod scroll_spy;
pub mod selection;
pub mod slides;
pub mod structured_data;
pub mod tabs;
pub mod theme;
pub mod time_picker;
pub mod toast;

use std::ffi::OsString;

use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = cli::GlobalCli::parse_from(
    raw_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting kestrel CLI"
  );
  debug!(?cli.overrides, "config overrides");

  let cfg = config::Config::load(
    cli.config.as_deref(),
    cli
      .overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;

  let renderer =
    render::Renderer::new(!cli.no_color);

  commands::dispatch(
    &cfg,
    &renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}
