//! Command routing

use crate::args::{Cli, Commands};
use crate::commands;
use tracing::debug;

pub async fn route(cli: Cli) -> anyhow::Result<()> {
    let working_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    debug!("Working directory: {}", working_dir.display());

    match cli.command {
        Commands::Providers { check } => commands::providers::list(&working_dir, check).await,
        Commands::Models { provider } => {
            commands::models::list(&working_dir, provider.as_deref()).await
        }
        Commands::UpdateProviders { source, embedded } => {
            commands::update::update_providers(&working_dir, source.as_deref(), embedded).await
        }
        Commands::SetModel { slot, model } => {
            commands::set_model::set_model(&working_dir, slot, &model).await
        }
    }
}
