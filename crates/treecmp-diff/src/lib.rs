//! Directory diff engine.
//!
//! Walks two roots, joins their entries on [`RelativePath`], and assigns every
//! path exactly one [`Classification`]. Metadata is checked first; content is
//! streamed in fixed-size chunks only when sizes match.
//!
//! # Key Types
//!
//! - [`compare`] -- the whole run: two roots in, [`ComparisonResult`] out
//! - [`enumerate`] / [`Enumeration`] -- lazy walk of one root
//! - [`ComparisonResult`] / [`PathComparison`] -- per-path outcomes, sorted by path
//! - [`Classification`] / [`MetadataDelta`] -- what differed and how
//! - [`ComparisonSummary`] -- aggregate counters for reporting
//! - [`CompareOptions`] -- worker count and chunk size
//!
//! [`RelativePath`]: treecmp_fs::RelativePath

pub mod classification;
pub mod content;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod options;
pub mod result;
pub mod summary;

pub use classification::{Classification, ContentCheck, MetadataDelta, PathComparison};
pub use content::ContentComparer;
pub use engine::compare;
pub use enumerate::{enumerate, Enumeration, TreeListing};
pub use error::{CompareError, CompareResult};
pub use options::{CompareOptions, DEFAULT_BUFFER_SIZE};
pub use result::ComparisonResult;
pub use summary::ComparisonSummary;
