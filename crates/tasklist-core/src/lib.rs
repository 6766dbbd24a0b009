pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod store;
pub mod sync;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

pub use client::{HttpTaskApi, TaskApi};
pub use error::{SyncError, ValidationError};
pub use store::{EditState, TaskStore};
pub use sync::{Notice, SyncController};
pub use task::{Draft, Task, TaskPayload};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting tasklist CLI"
    );

    let mut cfg = config::Config::load(cli.config.as_deref())?;
    cfg.apply_overrides(
        cli.rc_overrides
            .iter()
            .map(|kv| (kv.key.clone(), kv.value.clone())),
    );
    if let Some(url) = cli.api_url.as_deref() {
        cfg.set("api.url", url);
    }
    debug!(api_url = %cfg.api_url(), files = ?cfg.loaded_files, "configuration resolved");

    let api = HttpTaskApi::new(&cfg.api_url(), cfg.api_timeout()?).with_context(|| {
        format!("failed to set up task API client for {}", cfg.api_url())
    })?;
    let renderer = render::Renderer::new(&cfg)?;
    let command = cli.command_or_default();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut controller = SyncController::new(api);
    runtime.block_on(commands::dispatch(&mut controller, &renderer, command))?;

    info!("done");
    Ok(())
}
