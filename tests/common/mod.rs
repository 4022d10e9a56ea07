//! Helpers shared by the integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Skip this test when pdfium is not available on this machine.
macro_rules! skip_without_pdfium {
    () => {{
        $crate::common::init_tracing();
        if let Err(e) = pdf_margin::engine::bind_pdfium(None) {
            println!("SKIP — pdfium not available: {e}");
            return;
        }
    }};
}

/// Build a US-Letter PDF with `pages` pages, each carrying a filled grey
/// rectangle so the render is not blank.
pub fn letter_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages);
    for i in 0..pages {
        let grey = 0.2 + 0.1 * (i % 5) as f32;
        let content = Content {
            operations: vec![
                Operation::new("g", vec![grey.into()]),
                Operation::new("re", vec![72.into(), 72.into(), 200.into(), 300.into()]),
                Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save generated pdf");
    out
}

pub fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> Vec<f32> {
    let page = doc.get_dictionary(page_id).expect("page dict");
    page.get(b"MediaBox")
        .and_then(Object::as_array)
        .expect("MediaBox")
        .iter()
        .map(|o| o.as_float().expect("number"))
        .collect()
}

/// Route library logs through the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
