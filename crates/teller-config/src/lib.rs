//! # Teller Config
//!
//! TOML configuration for the Teller host: engine messages, logging and the
//! workflow catalog.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
