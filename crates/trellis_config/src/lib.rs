//! Parsing and validation of `trellis.toml` simulator configuration files.
//!
//! The file is optional. When it is absent every setting takes its default,
//! see [`TrellisConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_config_or_default, CONFIG_FILE_NAME};
pub use types::*;
