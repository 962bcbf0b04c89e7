//! Output types returned by the conversion entry points.

use crate::model::Document;
use serde::{Deserialize, Serialize};

/// Complete output of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled document model, ready for a serializer.
    pub document: Document,
    /// Counts and timings for the run.
    pub stats: ConversionStats,
}

/// Aggregate statistics for a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Top-level paragraphs in the document body.
    pub blocks: usize,
    /// Footnote definitions kept after merging.
    pub footnotes: usize,
    /// Distinct images resolved.
    pub images: usize,
    /// Wall-clock time of the image resolution pass.
    pub resolve_duration_ms: u64,
    /// Wall-clock time of transform and assembly.
    pub transform_duration_ms: u64,
    /// Total wall-clock time.
    pub total_duration_ms: u64,
}
