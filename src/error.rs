//! Error types for the pdf-margin library.
//!
//! A single closed taxonomy, [`MarginError`], covers every way a padding
//! request can fail. The HTTP layer only needs two buckets (client error vs.
//! everything else) but callers of the library can match on the variant to
//! tell a bad upload from a corrupt document or an encoder failure.
//!
//! There is no partial success: any error aborts the whole document.

use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-margin library.
#[derive(Debug, Error)]
pub enum MarginError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Uploaded filename does not carry the `.pdf` extension.
    #[error("Invalid file type. Only PDF files are allowed.")]
    InvalidInput { filename: String },

    /// Multipart body had no `file` field.
    #[error("No file uploaded: expected a multipart field named 'file'")]
    MissingFile,

    /// Multipart body or one of its fields could not be read.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// A margin was negative.
    #[error("Invalid {side} margin {value}: margins must be >= 0 pixels")]
    InvalidMargin { side: &'static str, value: i64 },

    // ── Rasterizer errors ─────────────────────────────────────────────────
    /// Bytes could not be parsed as a PDF document.
    #[error("Error processing PDF: {detail}")]
    DocumentDecode { detail: String },

    /// PDF requires a password but none was configured.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// A password was configured but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// pdfium failed to rasterise a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The document decoded but has no pages.
    #[error("PDF contains no pages; nothing to pad")]
    EmptyDocument,

    /// Page-count ceiling from the pipeline configuration.
    #[error("PDF has {pages} pages, more than the configured limit of {limit}")]
    PageLimitExceeded { pages: usize, limit: usize },

    /// Per-page pixel budget from the pipeline configuration.
    #[error("Page {page} would rasterise to {pixels} pixels, over the budget of {limit}")]
    PixelBudgetExceeded { page: usize, pixels: u64, limit: u64 },

    // ── Compositor / assembler errors ─────────────────────────────────────
    /// Padded page dimensions do not fit in `u32`.
    #[error("Padded page would be {width}x{height} px, larger than a bitmap can hold")]
    CanvasTooLarge { width: u64, height: u64 },

    /// Assembler received zero bitmaps.
    #[error("Cannot assemble a PDF from an empty page sequence")]
    EmptySequence,

    /// Pages do not share one color mode.
    #[error("Page {page} has color mode {found}, expected {expected} like page 1")]
    ColorModeMismatch {
        page: usize,
        expected: String,
        found: String,
    },

    /// Pixel layout the compositor or encoder cannot handle.
    #[error("Unsupported color mode: {mode}")]
    UnsupportedColorMode { mode: String },

    /// PDF serialisation failed.
    #[error("Failed to encode output PDF: {detail}")]
    Encoding { detail: String },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or place the library next to the executable."
    )]
    PdfiumBindingFailed(String),

    // ── Config / I/O errors ───────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not read the input file (CLI / file API).
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarginError {
    /// `true` for failures caused by the request itself rather than by
    /// processing the document.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MarginError::InvalidInput { .. }
                | MarginError::MissingFile
                | MarginError::MalformedRequest(_)
                | MarginError::InvalidMargin { .. }
        )
    }

    /// HTTP status the request handler reports for this error.
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Message placed in the HTTP error body.
    ///
    /// Client errors are reported verbatim; processing errors are prefixed
    /// the same way for every cause.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            format!("An error occurred: {self}")
        }
    }
}

impl From<lopdf::Error> for MarginError {
    fn from(e: lopdf::Error) -> Self {
        MarginError::Encoding {
            detail: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_bad_request() {
        let e = MarginError::InvalidInput {
            filename: "notes.txt".into(),
        };
        assert!(e.is_client_error());
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            e.public_message(),
            "Invalid file type. Only PDF files are allowed."
        );
    }

    #[test]
    fn negative_margin_is_bad_request() {
        let e = MarginError::InvalidMargin {
            side: "left",
            value: -3,
        };
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        assert!(e.to_string().contains("left"));
        assert!(e.to_string().contains("-3"));
    }

    #[test]
    fn processing_errors_are_server_errors() {
        let errors = [
            MarginError::DocumentDecode {
                detail: "bad xref".into(),
            },
            MarginError::RenderFailed {
                page: 4,
                detail: "oom".into(),
            },
            MarginError::EmptySequence,
            MarginError::EmptyDocument,
            MarginError::Encoding {
                detail: "boom".into(),
            },
        ];
        for e in errors {
            assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR, "{e}");
            assert!(e.public_message().starts_with("An error occurred: "));
        }
    }

    #[test]
    fn oversized_canvas_is_server_error() {
        let e = MarginError::CanvasTooLarge {
            width: u64::from(u32::MAX) + 2650,
            height: 3400,
        };
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.to_string().contains("3400"));
    }

    #[test]
    fn decode_message_carries_detail() {
        let e = MarginError::DocumentDecode {
            detail: "missing %PDF header".into(),
        };
        assert!(e.public_message().contains("missing %PDF header"));
    }

    #[test]
    fn color_mode_mismatch_display() {
        let e = MarginError::ColorModeMismatch {
            page: 2,
            expected: "Rgb8".into(),
            found: "L8".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 2"), "got: {msg}");
        assert!(msg.contains("Rgb8"));
    }
}
