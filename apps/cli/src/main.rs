//! tablesift CLI: batch extraction of HTML report tables into one CSV.
//!
//! Scans a folder of HTML files, cleans every table into long-form
//! `(label, row, key, value, source)` records, and writes them to a CSV file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
