//! Shared types, error model, and configuration for tablesift.
//!
//! This crate is the foundation depended on by all other tablesift crates.
//! It provides:
//! - [`TableSiftError`] for the unified error type
//! - Domain types ([`RawTable`], [`Cell`], [`Label`], [`NormalizedRecord`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OutputConfig, RunConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, parse_delimiter, write_default_config,
};
pub use error::{Result, TableSiftError};
pub use types::{Cell, Label, NormalizedRecord, OUTPUT_COLUMNS, RawTable, SourceRef, Value};
