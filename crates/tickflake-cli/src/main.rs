mod cli;
mod commands;
mod telemetry;

use clap::Parser;
use cli::{CliArgs, Command, HostConfig};
use telemetry::init_tracing;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = HostConfig::try_from(args)?;

    init_tracing();
    log_startup_info(&config);

    commands::run(&config)
}

fn log_startup_info(config: &HostConfig) {
    if cfg!(debug_assertions) {
        tracing::debug!("Running with full config: {:#?}", config);
    } else if let Command::Generate { threads, .. } = config.command {
        tracing::debug!(
            "Minting as machine {} with {} thread(s)",
            config.machine_id,
            threads
        );
    }
}
