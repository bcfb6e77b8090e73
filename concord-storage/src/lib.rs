//! SQLite persistence for Concord evaluation sessions.
//!
//! One snapshot per database file: the frozen rating store, the mask
//! registry in registration order and the evaluation config, written in
//! a single transaction. Loading replays the snapshot into a ready
//! [`concord_analysis::Session`] whose dense indices and mask arrays
//! are bit-for-bit what was saved.

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
pub use queries::session::{load_session, save_session};
