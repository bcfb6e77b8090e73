//! ConcordErrorCode trait for stable report codes.

/// Trait for tagging Concord errors with stable code strings.
/// Every error enum implements this so that reports and logs carry a
/// machine-matchable code alongside the human-readable message.
pub trait ConcordErrorCode {
    /// Returns the stable error code string (e.g., "SHAPE_MISMATCH").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted report string: `[ERROR_CODE] message`.
    fn report_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants for the reporting contract.
pub const SHAPE_MISMATCH: &str = "SHAPE_MISMATCH";
pub const ILLEGAL_CONVERSION: &str = "ILLEGAL_CONVERSION";
pub const UNKNOWN_MASK: &str = "UNKNOWN_MASK";
pub const DEGENERATE_INPUT: &str = "DEGENERATE_INPUT";
pub const STORE_ERROR: &str = "STORE_ERROR";
pub const AMBIGUOUS_DUPLICATE: &str = "AMBIGUOUS_DUPLICATE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
