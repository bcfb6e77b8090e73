//! Query modules for the snapshot tables.

pub mod session;
