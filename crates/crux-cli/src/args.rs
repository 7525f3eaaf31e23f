//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use crux_core::config::SelectedModelType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crux")]
#[command(about = "Crux - provider configuration and model selection")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true, env = "CRUX_DEBUG")]
    pub debug: bool,

    /// Directory to resolve project configuration from
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured providers
    Providers {
        /// Check that each enabled provider accepts its credentials
        #[arg(long)]
        check: bool,
    },

    /// List models of enabled providers
    Models {
        /// Only show models of this provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Refresh the cached provider catalog
    UpdateProviders {
        /// Catalog service URL or path to a JSON provider list
        source: Option<String>,

        /// Reset the cache to the built-in catalog
        #[arg(long, conflicts_with = "source")]
        embedded: bool,
    },

    /// Choose the model for a slot
    SetModel {
        /// Slot to change
        #[arg(value_parser = parse_slot)]
        slot: SelectedModelType,

        /// Model as `provider/model`
        model: String,
    },
}

fn parse_slot(s: &str) -> Result<SelectedModelType, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_model() {
        let cli = Cli::parse_from(["crux", "set-model", "small", "openai/gpt-5"]);
        match cli.command {
            Commands::SetModel { slot, model } => {
                assert_eq!(slot, SelectedModelType::Small);
                assert_eq!(model, "openai/gpt-5");
            }
            _ => panic!("expected set-model"),
        }
    }

    #[test]
    fn test_embedded_conflicts_with_source() {
        let result = Cli::try_parse_from(["crux", "update-providers", "--embedded", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_debug_flag() {
        let cli = Cli::parse_from(["crux", "providers", "--debug"]);
        assert!(cli.debug);
    }
}
