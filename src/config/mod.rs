// src/config/mod.rs

//! Launcher configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Locate and load the config file (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//!
//! Per-run settings come from the command line ([`crate::options`]); this
//! file only carries machine-wide choices such as which engine executable to
//! use and how the log rotates.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, discover, load_and_validate, load_from_path};
pub use model::{EngineSection, LauncherConfig, LogSection, RawLauncherConfig};
