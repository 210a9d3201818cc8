// src/config/mod.rs

//! Task file loading and validation for taskdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a task file from disk (`loader.rs`).
//! - Validate names and references (`validate.rs`).
//! - Build a task registry from the validated file (`wiring.rs`).

pub mod loader;
pub mod model;
pub mod validate;
pub mod wiring;

pub use loader::{config_root_dir, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
pub use wiring::build_registry;
