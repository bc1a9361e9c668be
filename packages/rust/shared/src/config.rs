//! Application configuration for tablesift.
//!
//! User config lives at `~/.tablesift/tablesift.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableSiftError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tablesift.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tablesift";

// ---------------------------------------------------------------------------
// Config structs (matching tablesift.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// CSV output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Folder scanned for HTML files when none is given on the command line.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// CSV file the records are written to.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// File extensions (without dot, case-insensitive) treated as HTML.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_file: default_output_file(),
            extensions: default_extensions(),
        }
    }
}

fn default_input_dir() -> String {
    "html".into()
}
fn default_output_file() -> String {
    "final_result.csv".into()
}
fn default_extensions() -> Vec<String> {
    vec!["html".into(), "htm".into()]
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Field delimiter; must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    ",".into()
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for one batch run, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Folder containing the HTML files.
    pub input_dir: PathBuf,
    /// Destination CSV file (truncated at the start of the run).
    pub output_file: PathBuf,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    /// CSV field delimiter.
    pub delimiter: u8,
}

impl TryFrom<&AppConfig> for RunConfig {
    type Error = TableSiftError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            input_dir: PathBuf::from(&config.defaults.input_dir),
            output_file: PathBuf::from(&config.defaults.output_file),
            extensions: config
                .defaults
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            delimiter: parse_delimiter(&config.output.delimiter)?,
        })
    }
}

/// Validate a delimiter string and return its byte.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    match s.as_bytes() {
        [b] if b.is_ascii() && !matches!(*b, b'"' | b'\n' | b'\r') => Ok(*b),
        _ => Err(TableSiftError::config(format!(
            "delimiter must be a single ASCII character other than quote or newline, got {s:?}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tablesift/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TableSiftError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tablesift/tablesift.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TableSiftError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        TableSiftError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    write_default_config(&dir)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn write_default_config(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| TableSiftError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| TableSiftError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TableSiftError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
