//! CLI definitions for Teller.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Teller CLI.
#[derive(Parser)]
#[command(name = "teller")]
#[command(about = "Run banking dashboard workflows from the terminal")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.teller/config.toml when present)
    #[arg(short, long, global = true, env = "TELLER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the registered workflows
    List {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Start a workflow and drive it from stdin
    Run {
        /// Workflow id
        workflow_id: String,

        /// Start parameters as a JSON object. Sessions start with one
        /// checking account, A1, for product-activation.
        #[arg(short, long, default_value = "{}")]
        params: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Validate the configuration file
    Check,

    /// Print the effective configuration as TOML
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["teller", "run", "loan", "--params", r#"{"amount":5000}"#]);
        match cli.command {
            Commands::Run {
                workflow_id,
                params,
            } => {
                assert_eq!(workflow_id, "loan");
                assert_eq!(params, r#"{"amount":5000}"#);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::parse_from(["teller", "config", "check", "--config", "/tmp/teller.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/teller.toml")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Check
            }
        ));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
