//! `teller config` subcommands.

use anyhow::bail;

use teller_config::{Config, ConfigValidator};
use teller_workflows_banking::workflow_ids;

use crate::cli::ConfigAction;

pub(crate) fn handle_config_command(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Check => check(config),
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}

fn check(config: &Config) -> anyhow::Result<()> {
    let result = ConfigValidator::validate(config, &workflow_ids());

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        bail!("configuration has {} error(s)", result.errors.len());
    }
    println!("Configuration OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_default_config() {
        assert!(check(&Config::default()).is_ok());
    }

    #[test]
    fn test_check_invalid_config() {
        let mut config = Config::default();
        config.engine.event_capacity = 0;
        assert!(check(&config).is_err());
    }
}
