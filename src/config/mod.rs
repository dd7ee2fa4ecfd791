// src/config/mod.rs

//! Configuration loading and validation for the `workdag` binary.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Parse durations (`duration.rs`).
//! - Validate and resolve a raw file into a typed [`ConfigFile`] (`validate.rs`).
//!
//! The library core never reads configuration; it is only used to turn a
//! TOML file into command jobs and a DAG.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, JobConfig, JobSpec, PollSpec, RawConfigFile};
pub use validate::validate_config;
