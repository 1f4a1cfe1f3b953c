pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod render;
pub mod watch;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use prazo_core::Lifecycle;
use prazo_core::theme::load_theme;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting prazo CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.prazorc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let store =
    datastore::FileStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;

  let mut lifecycle =
    Lifecycle::open(store);
  let theme =
    load_theme(lifecycle.backend());
  let mut renderer =
    render::Renderer::new(&cfg, theme)?;

  let command = match cli.command {
    | Some(command) => command,
    | None => cli::Command::from_default(
      &cfg
        .get("default.command")
        .unwrap_or_else(|| {
          "list".to_string()
        })
    )?
  };

  commands::dispatch(
    &mut lifecycle,
    &cfg,
    &mut renderer,
    command
  )?;

  info!("done");
  Ok(())
}
