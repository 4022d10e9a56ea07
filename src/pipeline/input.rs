//! Input validation: reject uploads before any document work starts.
//!
//! Two cheap checks run ahead of pdfium. The filename check is the request
//! contract (client error); the magic-byte check turns obviously non-PDF
//! payloads into a decode error without binding the engine.

use crate::error::MarginError;
use tracing::{debug, warn};

/// Required filename suffix for uploads.
pub const PDF_EXTENSION: &str = ".pdf";

const PDF_MAGIC: &[u8] = b"%PDF";

/// Validate an uploaded filename. The suffix match is case-sensitive.
pub fn validate_filename(filename: &str) -> Result<(), MarginError> {
    if filename.ends_with(PDF_EXTENSION) {
        Ok(())
    } else {
        warn!("Rejected upload '{}': not a {} file", filename, PDF_EXTENSION);
        Err(MarginError::InvalidInput {
            filename: filename.to_string(),
        })
    }
}

/// Verify the payload starts with the `%PDF` header.
pub fn sniff_pdf(bytes: &[u8]) -> Result<(), MarginError> {
    if bytes.is_empty() {
        return Err(MarginError::DocumentDecode {
            detail: "uploaded file is empty".into(),
        });
    }
    if !bytes.starts_with(PDF_MAGIC) {
        let head: Vec<u8> = bytes.iter().take(4).copied().collect();
        return Err(MarginError::DocumentDecode {
            detail: format!("missing %PDF header (first bytes: {head:?})"),
        });
    }
    debug!("PDF header present, {} bytes", bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_suffix_accepted() {
        assert!(validate_filename("report.pdf").is_ok());
        assert!(validate_filename("a.b.pdf").is_ok());
    }

    #[test]
    fn other_suffixes_rejected() {
        for name in ["report.txt", "report.pdf.zip", "report", "", "report.PDF"] {
            let err = validate_filename(name).unwrap_err();
            assert!(err.is_client_error(), "{name}");
        }
    }

    #[test]
    fn sniff_accepts_header() {
        assert!(sniff_pdf(b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn sniff_rejects_garbage_and_empty() {
        assert!(matches!(
            sniff_pdf(b"PK\x03\x04zip"),
            Err(MarginError::DocumentDecode { .. })
        ));
        assert!(matches!(
            sniff_pdf(b""),
            Err(MarginError::DocumentDecode { .. })
        ));
    }
}
