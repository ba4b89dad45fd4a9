//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate against the catalog of workflow ids the host knows about.
    pub fn validate(config: &Config, known_workflows: &[&str]) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_engine(config, &mut result);
        Self::validate_logging(config, &mut result);
        Self::validate_catalog(config, known_workflows, &mut result);
        result
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;
        if engine.event_capacity == 0 {
            result.add_error(ValidationError::new(
                "engine.event_capacity",
                "event_capacity must be greater than 0",
            ));
        } else if engine.event_capacity > 10_000 {
            result.add_warning(ValidationWarning::new(
                "engine.event_capacity",
                "event_capacity is very high (>10000), slow subscribers will hold a lot of events",
            ));
        }

        for (path, message) in [
            ("engine.dismiss_message", &engine.dismiss_message),
            ("engine.cascade_message", &engine.cascade_message),
            ("engine.teardown_message", &engine.teardown_message),
        ] {
            if message.trim().is_empty() {
                result.add_error(ValidationError::new(path, "message cannot be empty"));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        // Only plain levels are checked; full filter directives pass through.
        let level = config.logging.level.to_lowercase();
        if !level.contains('=') && !level.contains(',') && !LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }

        if config.logging.file_prefix.is_empty() {
            result.add_error(ValidationError::new(
                "logging.file_prefix",
                "file_prefix cannot be empty",
            ));
        }
    }

    fn validate_catalog(config: &Config, known: &[&str], result: &mut ValidationResult) {
        for id in &config.catalog.disabled {
            if !known.contains(&id.as_str()) {
                result.add_warning(ValidationWarning::new(
                    "catalog.disabled",
                    format!("Unknown workflow '{}' is listed as disabled", id),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
