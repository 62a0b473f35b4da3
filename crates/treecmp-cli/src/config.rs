//! TOML configuration, overridden by command-line flags.
//!
//! ```toml
//! [compare]
//! workers = 4
//! buffer_size = 131072
//!
//! [output]
//! format = "json"
//! summary = false
//! color = false
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use treecmp_diff::CompareOptions;

use crate::cli::{Cli, OutputFormat};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compare: CompareOptions,
    pub output: OutputConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Print the summary block after the per-path lines (text format).
    pub summary: bool,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            summary: true,
            color: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Build the effective configuration for an invocation.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(workers) = cli.parallel {
            self.compare.workers = workers;
        }
        if let Some(buffer_size) = cli.buffer_size {
            self.compare.buffer_size = buffer_size;
        }
        if let Some(format) = cli.format {
            self.output.format = format;
        }
        if cli.no_summary {
            self.output.summary = false;
        }
        if cli.no_color {
            self.output.color = false;
        }
    }
}
