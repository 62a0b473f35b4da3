use std::collections::BTreeMap;

use treecmp_fs::RelativePath;

use crate::classification::{Classification, PathComparison};
use crate::summary::ComparisonSummary;

/// Every path of both trees with exactly one classification.
///
/// Backed by a `BTreeMap`, so iteration is in path order no matter how the
/// trees were walked or how many workers compared them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComparisonResult {
    entries: BTreeMap<RelativePath, PathComparison>,
}

impl ComparisonResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for a path.
    ///
    /// Returns the previous record if the path was already present; the
    /// engine never inserts a path twice.
    pub fn insert(&mut self, comparison: PathComparison) -> Option<PathComparison> {
        self.entries.insert(comparison.path.clone(), comparison)
    }

    pub fn get(&self, path: &RelativePath) -> Option<&PathComparison> {
        self.entries.get(path)
    }

    /// Classification of a path, if it was seen at all.
    pub fn classification(&self, path: &RelativePath) -> Option<&Classification> {
        self.get(path).map(|c| &c.classification)
    }

    /// All records, in path order.
    pub fn iter(&self) -> impl Iterator<Item = &PathComparison> {
        self.entries.values()
    }

    /// Records whose classification is anything but `Identical`.
    pub fn differences(&self) -> impl Iterator<Item = &PathComparison> {
        self.iter().filter(|c| !c.classification.is_identical())
    }

    /// `true` when every path is `Identical` (vacuously true for two empty trees).
    pub fn is_identical(&self) -> bool {
        self.differences().next().is_none()
    }

    pub fn has_errors(&self) -> bool {
        self.iter().any(|c| c.classification.is_error())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> ComparisonSummary {
        let mut summary = ComparisonSummary::default();
        for comparison in self.iter() {
            summary.update(comparison);
        }
        summary
    }
}

impl<'a> IntoIterator for &'a ComparisonResult {
    type Item = &'a PathComparison;
    type IntoIter = std::collections::btree_map::Values<'a, RelativePath, PathComparison>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
