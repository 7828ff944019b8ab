//! EmberErrorCode trait for the host integration boundary.

/// Trait giving every Ember error a stable, structured code string so the
/// host integration can react without parsing messages.
pub trait EmberErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted boundary string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SNAPSHOT_MALFORMED: &str = "SNAPSHOT_MALFORMED";
pub const SNAPSHOT_VERSION: &str = "SNAPSHOT_VERSION";
pub const SNAPSHOT_SERIALIZE: &str = "SNAPSHOT_SERIALIZE";
