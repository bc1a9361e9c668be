//! Core pipeline and table-cleaning logic for tablesift.
//!
//! This crate ties together file discovery, table extraction, title
//! resolution, normalization, and CSV output into one batch run
//! ([`pipeline::run`]).

pub mod coerce;
pub mod discover;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod title;

pub use normalize::{NormalizedTable, normalize_table};
pub use output::OutputWriter;
pub use pipeline::{ProgressReporter, RunSummary, SilentProgress, Skip, SkipKind, run};
pub use title::resolve_title;
