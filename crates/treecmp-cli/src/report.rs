//! Rendering of comparison results.

use std::cmp::Ordering;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use colored::{ColoredString, Colorize};
use serde::Serialize;
use treecmp_diff::{
    Classification, ComparisonResult, ComparisonSummary, ContentCheck, PathComparison,
};

/// Display names for the two roots.
#[derive(Clone, Debug)]
pub struct Labels {
    pub left: String,
    pub right: String,
}

impl Labels {
    pub fn new(left: &Path, right: &Path) -> Self {
        Self {
            left: left.display().to_string(),
            right: right.display().to_string(),
        }
    }
}

/// One line per non-identical path, then the summary and timing.
pub fn write_text<W: Write>(
    out: &mut W,
    result: &ComparisonResult,
    labels: &Labels,
    show_summary: bool,
    elapsed: Duration,
) -> io::Result<()> {
    for comparison in result.differences() {
        writeln!(out, "{}", describe(comparison, labels))?;
    }
    if show_summary {
        writeln!(out)?;
        write_summary(out, &result.summary(), labels)?;
    }
    writeln!(out, "Comparison finished in {}.", format_elapsed(elapsed))
}

/// `path: tag, detail, detail`
pub fn describe(comparison: &PathComparison, labels: &Labels) -> String {
    let mut parts = vec![tag(&comparison.classification, labels).to_string()];

    if let Some(delta) = &comparison.delta {
        if !delta.kinds_match() {
            parts.push(format!(
                "{} is {}, {} is {}",
                labels.left,
                delta.left_kind.describe(),
                labels.right,
                delta.right_kind.describe()
            ));
        } else if !comparison.classification.is_identical() {
            match delta.mtime {
                Ordering::Greater => parts.push(format!("{} is newer", labels.left)),
                Ordering::Less => parts.push(format!("{} is newer", labels.right)),
                Ordering::Equal => {}
            }
            match delta.size {
                Ordering::Greater => parts.push(format!("size of {} is larger", labels.left)),
                Ordering::Less => parts.push(format!("size of {} is larger", labels.right)),
                Ordering::Equal => {}
            }
            if delta.content == ContentCheck::Differ {
                parts.push("content differs".to_string());
            }
        }
    }

    format!("{}: {}", comparison.path, parts.join(", "))
}

fn tag(classification: &Classification, labels: &Labels) -> ColoredString {
    match classification {
        Classification::OnlyInLeft => format!("only in {}", labels.left).yellow(),
        Classification::OnlyInRight => format!("only in {}", labels.right).cyan(),
        Classification::Identical => "identical".green(),
        Classification::DifferentMetadataSameContent => "metadata only".blue(),
        Classification::Different => "modified".red(),
        Classification::ReadError { message } => format!("read error: {message}").red().bold(),
    }
}

pub fn write_summary<W: Write>(
    out: &mut W,
    s: &ComparisonSummary,
    labels: &Labels,
) -> io::Result<()> {
    writeln!(out, "{}", "--- Comparison Summary ---".bold())?;
    writeln!(out, "Paths compared: {}", s.total())?;
    writeln!(out, "Files in both: {}", s.in_both)?;
    writeln!(out, "Files only in {}: {}", labels.left, s.only_in_left)?;
    writeln!(out, "Files only in {}: {}", labels.right, s.only_in_right)?;
    writeln!(out, "Files in both ({} is newer): {}", labels.left, s.left_newer)?;
    writeln!(out, "Files in both ({} is newer): {}", labels.right, s.right_newer)?;
    writeln!(out, "Files in both (same time, different size): {}", s.same_time_different_size)?;
    writeln!(
        out,
        "Files in both (same time and size, different content): {}",
        s.same_time_size_different_content
    )?;
    writeln!(out, "Files with same content, different time: {}", s.metadata_only)?;
    writeln!(out, "Read errors: {}", s.read_errors)?;
    let verdict = if s.total_differences() == 0 {
        "Trees are identical.".green().bold()
    } else {
        format!("{} path(s) differ.", s.total_differences()).red().bold()
    };
    writeln!(out, "{verdict}")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    left: &'a str,
    right: &'a str,
    identical: bool,
    entries: Vec<&'a PathComparison>,
    summary: ComparisonSummary,
    elapsed_ms: u64,
}

/// Non-identical entries and the summary as a single JSON document.
pub fn write_json<W: Write>(
    out: &mut W,
    result: &ComparisonResult,
    labels: &Labels,
    elapsed: Duration,
) -> io::Result<()> {
    let report = JsonReport {
        left: &labels.left,
        right: &labels.right,
        identical: result.is_identical(),
        entries: result.differences().collect(),
        summary: result.summary(),
        elapsed_ms: elapsed.as_millis() as u64,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

/// `HH:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
