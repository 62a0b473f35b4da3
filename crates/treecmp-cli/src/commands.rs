use std::io;
use std::time::Instant;

use anyhow::Context;
use tracing::info;
use treecmp_diff::compare;
use treecmp_fs::LocalFileSystem;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::report::{self, Labels};

/// What a completed run found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Identical,
    Differences,
}

pub fn run_command(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = Config::resolve(cli)?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    let started = Instant::now();
    let result = compare(&LocalFileSystem, &cli.left, &cli.right, &config.compare)?;
    let elapsed = started.elapsed();
    info!(paths = result.len(), differences = result.differences().count(), "done");

    let labels = Labels::new(&cli.left, &cli.right);
    let mut out = io::stdout().lock();
    let show_summary = config.output.summary;
    match config.output.format {
        OutputFormat::Text => report::write_text(&mut out, &result, &labels, show_summary, elapsed),
        OutputFormat::Json => report::write_json(&mut out, &result, &labels, elapsed),
    }
    .context("failed to write report")?;

    Ok(if result.is_identical() {
        Outcome::Identical
    } else {
        Outcome::Differences
    })
}
