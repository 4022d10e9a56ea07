//! End-to-end tests for the full rasterise → pad → assemble pipeline.
//!
//! Input PDFs are generated on the fly with `lopdf`, so no fixtures are
//! needed. Every test needs a pdfium shared library; when none can be bound
//! the test prints a notice and returns.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use lopdf::Document;
use pdf_margin::{
    pad_document, pad_document_blocking, pad_file, ColorMode, ImageEncoding, Margins,
    MarginError, PipelineConfig,
};
use std::sync::Arc;

#[macro_use]
mod common;

use common::{letter_pdf, media_box};

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_single_letter_page_default_margins() {
    skip_without_pdfium!();

    let config = PipelineConfig::default();
    let doc = pad_document_blocking(&letter_pdf(1), Margins::default(), &config).unwrap();

    assert_eq!(doc.stats.page_count, 1);
    let page = &doc.pages[0];
    assert_eq!((page.source_width, page.source_height), (2550, 3300));
    assert_eq!((page.padded_width, page.padded_height), (2650, 3400));

    let parsed = Document::load_mem(&doc.pdf).unwrap();
    let pages = parsed.get_pages();
    assert_eq!(pages.len(), 1);
    let mb = media_box(&parsed, pages[&1]);
    assert_eq!(mb, vec![0.0, 0.0, 2650.0, 3400.0]);
}

#[test]
fn test_page_count_and_order_preserved() {
    skip_without_pdfium!();

    let config = PipelineConfig::default();
    let margins = Margins::try_new(10, 20, 30, 40).unwrap();
    let doc = pad_document_blocking(&letter_pdf(3), margins, &config).unwrap();

    assert_eq!(doc.pages.len(), 3);
    for (i, page) in doc.pages.iter().enumerate() {
        assert_eq!(page.page_num, i + 1);
        assert_eq!(page.padded_width, page.source_width + 30);
        assert_eq!(page.padded_height, page.source_height + 70);
    }
    let parsed = Document::load_mem(&doc.pdf).unwrap();
    assert_eq!(parsed.get_pages().len(), 3);
}

#[test]
fn test_zero_margins_keep_render_size() {
    skip_without_pdfium!();

    let config = PipelineConfig::builder().dpi(72).build().unwrap();
    let doc = pad_document_blocking(&letter_pdf(1), Margins::zero(), &config).unwrap();
    assert_eq!((doc.pages[0].padded_width, doc.pages[0].padded_height), (612, 792));
}

#[test]
fn test_gray_jpeg_output_parses() {
    skip_without_pdfium!();

    let config = PipelineConfig::builder()
        .dpi(100)
        .color_mode(ColorMode::Gray)
        .encoding(ImageEncoding::Jpeg { quality: 80 })
        .build()
        .unwrap();
    let doc = pad_document_blocking(&letter_pdf(2), Margins::uniform(5), &config).unwrap();
    let parsed = Document::load_mem(&doc.pdf).unwrap();
    assert_eq!(parsed.get_pages().len(), 2);
}

#[test]
fn test_zero_page_document_rejected() {
    skip_without_pdfium!();

    let err = pad_document_blocking(&letter_pdf(0), Margins::default(), &PipelineConfig::default())
        .unwrap_err();
    // pdfium opens an empty page tree fine and reports zero pages.
    assert!(matches!(err, MarginError::EmptyDocument), "got: {err:?}");
    assert!(!err.is_client_error());
}

#[test]
fn test_page_limit_enforced() {
    skip_without_pdfium!();

    let config = PipelineConfig::builder().max_pages(2).build().unwrap();
    let err = pad_document_blocking(&letter_pdf(3), Margins::default(), &config).unwrap_err();
    assert!(matches!(
        err,
        MarginError::PageLimitExceeded { pages: 3, limit: 2 }
    ));
}

#[test]
fn test_pixel_budget_enforced() {
    skip_without_pdfium!();

    let config = PipelineConfig::builder()
        .max_page_pixels(1_000_000)
        .build()
        .unwrap();
    let err = pad_document_blocking(&letter_pdf(1), Margins::default(), &config).unwrap_err();
    assert!(matches!(
        err,
        MarginError::PixelBudgetExceeded { page: 1, pixels: 8_415_000, .. }
    ));
}

#[test]
fn test_pad_file_writes_output() {
    skip_without_pdfium!();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("nested/out.pdf");
    std::fs::write(&input, letter_pdf(2)).unwrap();

    let config = PipelineConfig::builder().dpi(72).build().unwrap();
    let doc = pad_file(&input, &output, Margins::uniform(1), &config).unwrap();

    let written = std::fs::read(&output).unwrap();
    assert_eq!(written, doc.pdf);
    assert!(written.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_async_entry_point() {
    skip_without_pdfium!();

    let config = Arc::new(PipelineConfig::builder().dpi(72).build().unwrap());
    let doc = pad_document(letter_pdf(1), Margins::uniform(8), config)
        .await
        .unwrap();
    assert_eq!((doc.pages[0].padded_width, doc.pages[0].padded_height), (628, 808));
}
