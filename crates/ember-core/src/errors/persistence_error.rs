//! Learning snapshot (de)serialization errors.
//!
//! These never escape the control tick: callers on the hot path use the
//! lenient loaders, which log the error and fall back to a zero state.

use super::error_code::{self, EmberErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("malformed snapshot: {message}")]
    Malformed { message: String },

    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("failed to serialize snapshot: {message}")]
    Serialize { message: String },
}

impl EmberErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => error_code::SNAPSHOT_MALFORMED,
            Self::UnsupportedVersion { .. } => error_code::SNAPSHOT_VERSION,
            Self::Serialize { .. } => error_code::SNAPSHOT_SERIALIZE,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed {
            message: e.to_string(),
        }
    }
}
