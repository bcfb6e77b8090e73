//! Error handling for Concord.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod mask_error;
pub mod session_error;
pub mod stats_error;
pub mod storage_error;
pub mod store_error;

pub use config_error::ConfigError;
pub use error_code::ConcordErrorCode;
pub use mask_error::MaskError;
pub use session_error::SessionError;
pub use stats_error::StatsError;
pub use storage_error::StorageError;
pub use store_error::StoreError;
