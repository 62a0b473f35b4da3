use std::path::PathBuf;

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "treecmp",
    about = "Compare two directory trees and report files that differ",
    version
)]
pub struct Cli {
    /// Left directory (usually the source)
    pub left: PathBuf,

    /// Right directory (usually the backup)
    pub right: PathBuf,

    /// Number of parallel content comparisons (0 = sequential)
    #[arg(short, long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Bytes read per chunk when comparing content
    #[arg(long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Log progress to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Skip the summary block
    #[arg(long)]
    pub no_summary: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Read defaults from a TOML file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
