//! Configuration schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Workflow manager settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Buffered lifecycle events per subscriber.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Result message when the user dismisses the focused workflow.
    #[serde(default = "default_dismiss_message")]
    pub dismiss_message: String,

    /// Result message for workflows cancelled because an ancestor was cancelled.
    #[serde(default = "default_cascade_message")]
    pub cascade_message: String,

    /// Result message for workflows still running at shutdown.
    #[serde(default = "default_teardown_message")]
    pub teardown_message: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            dismiss_message: default_dismiss_message(),
            cascade_message: default_cascade_message(),
            teardown_message: default_teardown_message(),
        }
    }
}

fn default_event_capacity() -> usize {
    64
}

fn default_dismiss_message() -> String {
    "Dismissed by user".to_string()
}

fn default_cascade_message() -> String {
    "Cancelled because the parent workflow was cancelled".to_string()
}

fn default_teardown_message() -> String {
    "Workflow host shut down".to_string()
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for the rolling log file. `~` is expanded.
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Emit JSON lines on the console instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: default_log_directory(),
            file_prefix: default_file_prefix(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".teller").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".teller/logs"))
}

fn default_file_prefix() -> String {
    "teller.log".to_string()
}

/// Which workflows are offered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Workflow ids left out of the registry.
    #[serde(default)]
    pub disabled: Vec<String>,
}
