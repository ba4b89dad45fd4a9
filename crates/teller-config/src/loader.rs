//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
});

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        config.logging.directory = Self::expand_path_buf(&config.logging.directory);
        Ok(config)
    }

    /// Load `path` if given, otherwise `~/.teller/config.toml` when it exists,
    /// otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".teller").join("config.toml"))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.teller`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        match path.to_str() {
            Some(s) => PathBuf::from(Self::expand_path(s)),
            None => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.engine.event_capacity, 64);
        assert!(config.catalog.disabled.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [engine]
            event_capacity = 16
            dismiss_message = "Closed by teller"

            [logging]
            level = "debug"
            directory = "/var/log/teller"
            json = true

            [catalog]
            disabled = ["product-activation"]
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.engine.event_capacity, 16);
        assert_eq!(config.engine.dismiss_message, "Closed by teller");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, PathBuf::from("/var/log/teller"));
        assert!(config.logging.json);
        assert_eq!(config.catalog.disabled, vec!["product-activation"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[engine]").unwrap();
        writeln!(file, "event_capacity = 8").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.engine.event_capacity, 8);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/teller.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_explicit_missing() {
        let result = ConfigLoader::load_or_default(Some(Path::new("/nonexistent/teller.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("engine = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: unique test-only variable
        unsafe {
            std::env::set_var("TELLER_TEST_DISMISS", "Closed");
        }
        let content = "[engine]\ndismiss_message = \"${TELLER_TEST_DISMISS}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.engine.dismiss_message, "Closed");
        unsafe {
            std::env::remove_var("TELLER_TEST_DISMISS");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${TELLER_NONEXISTENT_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(v)) if v == "TELLER_NONEXISTENT_VAR_12345"));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        assert_eq!(ConfigLoader::expand_env_vars(content).unwrap(), content);
    }

    #[test]
    fn test_log_directory_tilde_expanded() {
        let config = ConfigLoader::load_str("[logging]\ndirectory = \"~/teller-logs\"").unwrap();
        let directory = config.logging.directory.to_string_lossy().to_string();
        assert!(!directory.starts_with('~'));
        assert!(directory.ends_with("teller-logs"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/usr/local/bin"), "/usr/local/bin");
    }
}
