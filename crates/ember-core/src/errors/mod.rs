//! Error handling for Ember.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod persistence_error;

pub use config_error::ConfigError;
pub use error_code::EmberErrorCode;
pub use persistence_error::PersistenceError;

/// Top-level error aggregating subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum EmberError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl EmberErrorCode for EmberError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Persistence(e) => e.error_code(),
        }
    }
}

/// Convenience alias used across the workspace.
pub type EmberResult<T> = Result<T, EmberError>;
