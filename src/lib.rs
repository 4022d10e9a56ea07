//! # pdf-margin
//!
//! Add white margins around every page of a PDF document.
//!
//! Each page is rasterised with pdfium, padded with a white border of a
//! configurable width on each side, and the padded bitmaps are written back
//! out as a new image-only PDF. The same pipeline is available as a library,
//! as an HTTP endpoint, and as a local command.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Input     `.pdf` filename and `%PDF` header checks
//!  ├─ 2. Render    rasterise pages at dpi / 72 via pdfium (spawn_blocking)
//!  ├─ 3. Pad       white canvas of (w + l + r) × (h + t + b), page pasted at (l, t)
//!  └─ 4. Assemble  one image page per bitmap → output PDF bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_margin::{pad_document, Margins, PipelineConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("document.pdf")?;
//!     let config = Arc::new(PipelineConfig::default());
//!     let padded = pad_document(bytes, Margins::uniform(50), config).await?;
//!     std::fs::write("margined.pdf", &padded.pdf)?;
//!     eprintln!("{} pages in {}ms", padded.stats.page_count, padded.stats.total_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-margin` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when embedding only the library or the HTTP router:
//! ```toml
//! pdf-margin = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod server;
pub mod ui;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ColorMode, ImageEncoding, Margins, PipelineConfig, PipelineConfigBuilder, ServerConfig,
    UiConfig,
};
pub use convert::{pad_document, pad_document_blocking, pad_file, pad_pages};
pub use error::MarginError;
pub use output::{PaddedDocument, PageSummary, PaddingStats};
pub use progress::{NoopProgressCallback, PaddingProgressCallback, ProgressCallback};
