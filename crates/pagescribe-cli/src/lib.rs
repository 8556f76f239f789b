//! Pagescribe command-line host: extract, watch, and apply page snapshots.

pub mod commands;
pub mod config;
pub mod status;

pub use config::{load_config, resolve_config_path};
pub use status::Status;
