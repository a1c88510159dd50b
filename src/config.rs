//! Run configuration for the command-line driver.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::facts::DEFAULT_DELIMITER;

/// Output directory value that sends every output relation to stdout.
pub const STDOUT: &str = "-";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("delimiter must be a single character, got {0:?}")]
    Delimiter(String),
}

/// Where facts come from, where results go, and how fields are separated.
///
/// ```toml
/// fact_dir = "facts"
/// output_dir = "out"
/// delimiter = ","
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub fact_dir: PathBuf,
    /// `-` writes to stdout.
    pub output_dir: PathBuf,
    pub delimiter: char,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            fact_dir: PathBuf::from("."),
            output_dir: PathBuf::from(STDOUT),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// True if output relations go to stdout rather than files.
    pub fn writes_to_stdout(&self) -> bool {
        self.output_dir.as_os_str() == STDOUT
    }

    /// Path of the fact file for an input relation.
    pub fn fact_file(&self, relation: &str) -> PathBuf {
        self.fact_dir.join(format!("{relation}.facts"))
    }

    /// Path of the output file for an output relation.
    pub fn output_file(&self, relation: &str) -> PathBuf {
        self.output_dir.join(format!("{relation}.csv"))
    }
}

/// Parse a delimiter given on the command line. `\t` is accepted as an escape.
pub fn parse_delimiter(text: &str) -> Result<char, ConfigError> {
    if text == "\\t" {
        return Ok('\t');
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::Delimiter(text.to_string())),
    }
}
