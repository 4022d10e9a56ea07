//! Pipeline entry points.
//!
//! [`pad_document`] is what the HTTP handler calls: it moves the whole
//! blocking pipeline onto tokio's blocking pool. [`pad_document_blocking`] is
//! the same pipeline for synchronous callers, and [`pad_file`] wraps it for
//! local files with an atomic write.
//!
//! Pages are processed strictly in sequence and every page is rasterised
//! before the first margin is applied.

use crate::config::{Margins, PipelineConfig};
use crate::error::MarginError;
use crate::output::{PaddedDocument, PageSummary, PaddingStats};
use crate::pipeline::{assemble, input, pad, render};
use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Pad every page of an in-memory PDF.
///
/// # Errors
/// Any stage failure aborts the document; see [`MarginError`].
pub async fn pad_document(
    bytes: Vec<u8>,
    margins: Margins,
    config: Arc<PipelineConfig>,
) -> Result<PaddedDocument, MarginError> {
    tokio::task::spawn_blocking(move || pad_document_blocking(&bytes, margins, &config))
        .await
        .map_err(|e| MarginError::Internal(format!("Padding task panicked: {e}")))?
}

/// Blocking implementation of [`pad_document`].
pub fn pad_document_blocking(
    bytes: &[u8],
    margins: Margins,
    config: &PipelineConfig,
) -> Result<PaddedDocument, MarginError> {
    let total_start = Instant::now();
    info!("Padding document ({} bytes, {})", bytes.len(), margins);

    // ── Step 1: Sniff header ─────────────────────────────────────────────
    input::sniff_pdf(bytes)?;

    // ── Step 2: Rasterise ────────────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = render::rasterize(bytes, config)?;
    let render_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", rendered.len(), render_ms);

    // ── Steps 3–4: Pad and assemble ──────────────────────────────────────
    let mut document = pad_pages(&rendered, margins, config)?;
    document.stats.render_ms = render_ms;
    document.stats.total_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Padded {} pages in {}ms → {} bytes",
        document.stats.page_count, document.stats.total_ms, document.stats.output_bytes
    );
    Ok(document)
}

/// Pad already-rasterised pages and assemble the output PDF.
///
/// Rejects an empty page list before it reaches the assembler.
pub fn pad_pages(
    pages: &[DynamicImage],
    margins: Margins,
    config: &PipelineConfig,
) -> Result<PaddedDocument, MarginError> {
    if pages.is_empty() {
        return Err(MarginError::EmptyDocument);
    }
    let total = pages.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_loaded(total);
    }

    let pad_start = Instant::now();
    let mut padded = Vec::with_capacity(total);
    let mut summaries = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        pad::check_pixel_budget(idx + 1, page, margins, config.max_page_pixels)?;
        let out = pad::add_margin(page, margins)?;
        summaries.push(PageSummary {
            page_num: idx + 1,
            source_width: page.width(),
            source_height: page.height(),
            padded_width: out.width(),
            padded_height: out.height(),
        });
        debug!(
            "Padded page {} → {}x{} px",
            idx + 1,
            out.width(),
            out.height()
        );
        padded.push(out);
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_padded(idx + 1, total);
        }
    }
    let pad_ms = pad_start.elapsed().as_millis() as u64;

    let assemble_start = Instant::now();
    let pdf = assemble::assemble(&padded, config)?;
    let assemble_ms = assemble_start.elapsed().as_millis() as u64;
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_assembled(total, pdf.len());
    }

    let stats = PaddingStats {
        page_count: total,
        render_ms: 0,
        pad_ms,
        assemble_ms,
        total_ms: pad_ms + assemble_ms,
        output_bytes: pdf.len(),
    };

    Ok(PaddedDocument {
        pdf,
        pages: summaries,
        stats,
    })
}

/// Pad a local PDF file and write the result to `output_path`.
///
/// Uses atomic write (temp file in the destination directory + rename) so a
/// failed run never leaves a truncated PDF behind.
pub fn pad_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    margins: Margins,
    config: &PipelineConfig,
) -> Result<PaddedDocument, MarginError> {
    let input_path = input_path.as_ref();
    let path = output_path.as_ref();

    let bytes = std::fs::read(input_path).map_err(|e| MarginError::InputReadFailed {
        path: input_path.to_path_buf(),
        source: e,
    })?;
    let document = pad_document_blocking(&bytes, margins, config)?;

    let write_err = |source: std::io::Error| MarginError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(&document.pdf).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::PaddingProgressCallback;
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PaddingProgressCallback for Recorder {
        fn on_document_loaded(&self, total_pages: usize) {
            self.events.lock().unwrap().push(format!("loaded {total_pages}"));
        }
        fn on_page_padded(&self, page_num: usize, _total_pages: usize) {
            self.events.lock().unwrap().push(format!("page {page_num}"));
        }
        fn on_document_assembled(&self, total_pages: usize, _output_bytes: usize) {
            self.events.lock().unwrap().push(format!("assembled {total_pages}"));
        }
    }

    fn page(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([0, 0, 0])))
    }

    #[test]
    fn empty_page_list_rejected_before_assembly() {
        let err = pad_pages(&[], Margins::default(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, MarginError::EmptyDocument));
    }

    #[test]
    fn summaries_follow_page_order() {
        let pages = vec![page(10, 10), page(20, 30)];
        let m = Margins::try_new(1, 2, 3, 4).unwrap();
        let doc = pad_pages(&pages, m, &PipelineConfig::default()).unwrap();

        assert_eq!(doc.stats.page_count, 2);
        assert_eq!(doc.pages[0].page_num, 1);
        assert_eq!((doc.pages[0].padded_width, doc.pages[0].padded_height), (13, 17));
        assert_eq!((doc.pages[1].padded_width, doc.pages[1].padded_height), (23, 37));
        assert_eq!(doc.stats.output_bytes, doc.pdf.len());

        let parsed = lopdf::Document::load_mem(&doc.pdf).unwrap();
        assert_eq!(parsed.get_pages().len(), 2);
    }

    #[test]
    fn progress_events_fire_in_order() {
        let recorder = Arc::new(Recorder::default());
        let config = PipelineConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        pad_pages(&[page(2, 2), page(2, 2)], Margins::uniform(1), &config).unwrap();

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events, vec!["loaded 2", "page 1", "page 2", "assembled 2"]);
    }

    #[test]
    fn padded_size_over_budget_rejected_before_allocation() {
        let config = PipelineConfig::builder().max_page_pixels(500).build().unwrap();
        // 20x20 = 400 px fits; padded to 40x40 = 1600 px does not.
        let err = pad_pages(&[page(20, 20)], Margins::uniform(10), &config).unwrap_err();
        assert!(matches!(
            err,
            MarginError::PixelBudgetExceeded { page: 1, pixels: 1600, limit: 500 }
        ));
    }

    #[test]
    fn huge_margin_reports_error_instead_of_panicking() {
        let m = Margins::try_new(i64::from(u32::MAX), 0, 0, 0).unwrap();
        let err = pad_pages(&[page(4, 4)], m, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, MarginError::CanvasTooLarge { .. }));
    }

    #[test]
    fn non_pdf_bytes_fail_before_rendering() {
        let err = pad_document_blocking(b"hello world", Margins::default(), &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(err, MarginError::DocumentDecode { .. }));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn async_entry_point_reports_decode_error() {
        let err = pad_document(
            b"GIF89a".to_vec(),
            Margins::default(),
            Arc::new(PipelineConfig::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MarginError::DocumentDecode { .. }));
    }

    #[test]
    fn pad_file_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = pad_file(
            dir.path().join("missing.pdf"),
            dir.path().join("out.pdf"),
            Margins::default(),
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MarginError::InputReadFailed { .. }));
        assert!(!dir.path().join("out.pdf").exists());
    }
}
