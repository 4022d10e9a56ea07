//! Pipeline stages for margin padding.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ pad ──▶ assemble
//! (checks)  (pdfium)   (image)  (lopdf)
//! ```
//!
//! 1. [`input`]    — filename suffix and `%PDF` header checks
//! 2. [`render`]   — rasterise every page at `dpi / 72` scale; blocking
//! 3. [`pad`]      — white border around each bitmap, color mode preserved
//! 4. [`assemble`] — one image page per bitmap in a fresh PDF

pub mod assemble;
pub mod input;
pub mod pad;
pub mod render;
