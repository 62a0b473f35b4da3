use std::cmp::Ordering;

use serde::Serialize;

use crate::classification::{Classification, ContentCheck, PathComparison};

/// Aggregate counters over a comparison result.
///
/// The `in_both` breakdown follows a fixed precedence: a newer side wins
/// over a size difference, which wins over a content difference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub in_both: usize,
    pub only_in_left: usize,
    pub only_in_right: usize,
    pub identical: usize,
    pub metadata_only: usize,
    pub different: usize,
    pub read_errors: usize,
    pub left_newer: usize,
    pub right_newer: usize,
    pub same_time_different_size: usize,
    pub same_time_size_different_content: usize,
}

impl ComparisonSummary {
    pub fn update(&mut self, comparison: &PathComparison) {
        match &comparison.classification {
            Classification::OnlyInLeft => self.only_in_left += 1,
            Classification::OnlyInRight => self.only_in_right += 1,
            Classification::Identical => self.identical += 1,
            Classification::DifferentMetadataSameContent => self.metadata_only += 1,
            Classification::Different => self.different += 1,
            Classification::ReadError { .. } => self.read_errors += 1,
        }

        let Some(delta) = &comparison.delta else {
            return;
        };
        self.in_both += 1;
        match delta.mtime {
            Ordering::Greater => self.left_newer += 1,
            Ordering::Less => self.right_newer += 1,
            Ordering::Equal if delta.size != Ordering::Equal => self.same_time_different_size += 1,
            Ordering::Equal if delta.content == ContentCheck::Differ => {
                self.same_time_size_different_content += 1
            }
            Ordering::Equal => {}
        }
    }

    /// Paths that were not `Identical`.
    pub fn total_differences(&self) -> usize {
        self.only_in_left
            + self.only_in_right
            + self.metadata_only
            + self.different
            + self.read_errors
    }

    /// Every path counted.
    pub fn total(&self) -> usize {
        self.total_differences() + self.identical
    }
}
