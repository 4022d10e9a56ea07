//! Result types returned by the padding pipeline.

use serde::{Deserialize, Serialize};

/// A padded document ready to be streamed or written to disk.
#[derive(Debug, Clone)]
pub struct PaddedDocument {
    /// Serialised output PDF.
    pub pdf: Vec<u8>,
    /// One entry per page, in document order.
    pub pages: Vec<PageSummary>,
    pub stats: PaddingStats,
}

/// Geometry of a single page before and after padding, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-indexed page number.
    pub page_num: usize,
    pub source_width: u32,
    pub source_height: u32,
    pub padded_width: u32,
    pub padded_height: u32,
}

/// Timings and sizes for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingStats {
    pub page_count: usize,
    pub render_ms: u64,
    pub pad_ms: u64,
    pub assemble_ms: u64,
    pub total_ms: u64,
    pub output_bytes: usize,
}
