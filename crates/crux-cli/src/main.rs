//! Crux command-line interface
//!
//! Operator commands over the provider configuration engine:
//!
//! - `crux providers`         list resolved providers, optionally checking them
//! - `crux models`            list usable models and the current selection
//! - `crux update-providers`  refresh the provider catalog cache
//! - `crux set-model`         choose the model of a slot

mod args;
mod commands;
mod console;
mod router;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --debug
    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    router::route(cli).await
}
