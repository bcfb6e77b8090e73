//! Configuration system for Concord.
//! TOML-based, 3-layer resolution: env > project file > defaults.

pub mod eval_config;

pub use eval_config::EvalConfig;
