//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tablesift_core::{ProgressReporter, RunSummary, Skip};
use tablesift_shared::{
    AppConfig, RunConfig, SourceRef, config_file_path, init_config, load_config,
    load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tablesift: turn HTML report tables into one tidy CSV.
#[derive(Parser)]
#[command(
    name = "tablesift",
    version,
    about = "Extract and normalize tables from a folder of HTML files into a single CSV.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.tablesift/tablesift.toml.
    #[arg(long, global = true, env = "TABLESIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract, clean and write every table found in a folder of HTML files.
    Run {
        /// Folder containing the HTML files (defaults to the configured input_dir).
        folder: Option<PathBuf>,

        /// Output CSV file (defaults to the configured output_file).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr; stdout carries the progress lines and the summary.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tablesift=warn",
        1 => "tablesift=info",
        2 => "tablesift=debug",
        _ => "tablesift=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Run { folder, output } => cmd_run(config_path, folder, output),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the config file named on the command line, or the default one.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    })
}

/// Merge CLI overrides into the runtime config.
fn build_run_config(
    config: &AppConfig,
    folder: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<RunConfig> {
    let mut run_config = RunConfig::try_from(config)?;
    if let Some(folder) = folder {
        run_config.input_dir = folder;
    }
    if let Some(output) = output {
        run_config.output_file = output;
    }
    if run_config.extensions.is_empty() {
        return Err(eyre!("no input file extensions configured"));
    }
    Ok(run_config)
}

fn cmd_run(config_path: Option<&Path>, folder: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let run_config = build_run_config(&config, folder, output)?;

    info!(
        input = %run_config.input_dir.display(),
        output = %run_config.output_file.display(),
        "starting run"
    );

    let reporter = CliProgress::new();
    let summary = tablesift_core::run(&run_config, &reporter)?;

    print_summary(&summary, &run_config.output_file);
    Ok(())
}

fn print_summary(summary: &RunSummary, output: &Path) {
    println!();
    println!("  Run complete.");
    println!("  Files:    {} detected, {} parsed", summary.files_detected, summary.files_parsed);
    println!(
        "  Tables:   {} found, {} written, {} skipped",
        summary.tables_found,
        summary.tables_written,
        summary.tables_found - summary.tables_written
    );
    println!("  Records:  {}", summary.records_written);
    println!("  Output:   {}", output.display());
    println!("  Time:     {:.1}s", summary.elapsed.as_secs_f64());

    if !summary.skipped.is_empty() {
        println!();
        println!("  Skipped:");
        for skip in &summary.skipped {
            println!("    - {skip}");
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter: an indicatif spinner plus one stdout line per step.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    /// Print a line to stdout without tearing the spinner.
    fn line(&self, text: String) {
        self.spinner.suspend(|| println!("{text}"));
    }
}

impl ProgressReporter for CliProgress {
    fn files_detected(&self, files: &[PathBuf]) {
        let names: Vec<String> = files
            .iter()
            .map(|p| SourceRef::new(p).file_name())
            .collect();
        self.line(format!(">>> Detected {} HTML file(s): {}", files.len(), names.join(", ")));
    }

    fn file_extracting(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {}", path.display()));
    }

    fn file_extracted(&self, path: &Path, tables: usize) {
        self.line(format!(">>> Extracted {} ... {tables} table(s)", path.display()));
    }

    fn table_cleaning(&self, source: &SourceRef, index: usize, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Cleaning [{current}/{total}] {} table #{index}",
            source.file_name()
        ));
    }

    fn table_written(&self, source: &SourceRef, index: usize, records: usize) {
        self.line(format!(
            ">>> Cleaned {} table #{index} ... {records} record(s)",
            source.file_name()
        ));
    }

    fn skipped(&self, skip: &Skip) {
        let prefix = if skip.kind.is_error() { "!!!" } else { "---" };
        self.line(format!("{prefix} Skipped {skip}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let source = match config_path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    println!("# {}", source.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_folder_and_output() {
        let cli = Cli::try_parse_from(["tablesift", "-vv", "run", "reports", "-o", "out.csv"])
            .expect("valid args");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run { folder, output } => {
                assert_eq!(folder, Some(PathBuf::from("reports")));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            Command::Config { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn run_arguments_are_optional() {
        let cli = Cli::try_parse_from(["tablesift", "run"]).expect("valid args");
        assert!(matches!(cli.command, Command::Run { folder: None, output: None }));
    }

    #[test]
    fn cli_overrides_config() {
        let config = AppConfig::default();
        let run = build_run_config(
            &config,
            Some(PathBuf::from("in")),
            Some(PathBuf::from("custom.csv")),
        )
        .unwrap();
        assert_eq!(run.input_dir, PathBuf::from("in"));
        assert_eq!(run.output_file, PathBuf::from("custom.csv"));
        assert_eq!(run.delimiter, b',');
    }

    #[test]
    fn config_defaults_apply_without_flags() {
        let run = build_run_config(&AppConfig::default(), None, None).unwrap();
        assert_eq!(run.input_dir, PathBuf::from("html"));
        assert_eq!(run.output_file, PathBuf::from("final_result.csv"));
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let mut config = AppConfig::default();
        config.defaults.extensions.clear();
        assert!(build_run_config(&config, None, None).is_err());
    }
}
