//! PDF assembly: one output page per padded bitmap.
//!
//! Each page holds a single image XObject scaled to cover the full MediaBox.
//! Page size follows from `PipelineConfig::output_dpi`; no further scaling or
//! margin work happens here.
//!
//! ```text
//! Catalog ─▶ Pages ─┬▶ Page 1 ─▶ Contents ("q w 0 0 h 0 0 cm /Im0 Do Q")
//!                   │          └▶ Resources /XObject /Im0 ─▶ Image (+ /SMask)
//!                   └▶ Page N …
//! ```

use crate::config::{ImageEncoding, PipelineConfig};
use crate::error::MarginError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use tracing::debug;

const PRODUCER: &str = concat!("pdf-margin ", env!("CARGO_PKG_VERSION"));
const IMAGE_NAME: &str = "Im0";

/// Encode `images` as a multi-page PDF, preserving order.
///
/// Every bitmap must share the first one's color mode.
pub fn assemble(images: &[DynamicImage], config: &PipelineConfig) -> Result<Vec<u8>, MarginError> {
    let first = images.first().ok_or(MarginError::EmptySequence)?;
    check_color_modes(first.color(), images)?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(images.len());

    for (idx, image) in images.iter().enumerate() {
        let page_id = add_page(&mut doc, pages_id, image, config)?;
        debug!("Assembled page {} ({}x{} px)", idx + 1, image.width(), image.height());
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(images.len() as i64),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| MarginError::Encoding {
        detail: e.to_string(),
    })?;
    Ok(out)
}

fn check_color_modes(expected: ColorType, images: &[DynamicImage]) -> Result<(), MarginError> {
    for (idx, image) in images.iter().enumerate().skip(1) {
        if image.color() != expected {
            return Err(MarginError::ColorModeMismatch {
                page: idx + 1,
                expected: format!("{expected:?}"),
                found: format!("{:?}", image.color()),
            });
        }
    }
    Ok(())
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    image: &DynamicImage,
    config: &PipelineConfig,
) -> Result<ObjectId, MarginError> {
    let (width, height) = (image.width(), image.height());
    let xobject = encode_image(image, config.encoding)?;

    let smask_id = match xobject.alpha {
        Some(alpha) => Some(doc.add_object(image_stream(
            width,
            height,
            "DeviceGray",
            "FlateDecode",
            flate(&alpha)?,
            None,
        ))),
        None => None,
    };
    let image_id = doc.add_object(image_stream(
        width,
        height,
        xobject.color_space,
        xobject.filter,
        xobject.data,
        smask_id,
    ));

    let (page_w, page_h) = config.page_size_points(width, height);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w),
                    0.into(),
                    0.into(),
                    Object::Real(page_h),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(page_w), Object::Real(page_h)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });
    Ok(page_id)
}

/// Encoded pixel data plus the dictionary entries describing it.
struct EncodedImage {
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
    /// Raw 8-bit alpha plane, stored as a separate `/SMask`.
    alpha: Option<Vec<u8>>,
}

fn encode_image(image: &DynamicImage, encoding: ImageEncoding) -> Result<EncodedImage, MarginError> {
    let (color_space, samples, alpha, color) = match image {
        DynamicImage::ImageLuma8(buf) => ("DeviceGray", buf.as_raw().clone(), None, ExtendedColorType::L8),
        DynamicImage::ImageRgb8(buf) => ("DeviceRGB", buf.as_raw().clone(), None, ExtendedColorType::Rgb8),
        DynamicImage::ImageLumaA8(buf) => {
            let (gray, alpha) = split_alpha(buf.as_raw(), 2);
            ("DeviceGray", gray, Some(alpha), ExtendedColorType::L8)
        }
        DynamicImage::ImageRgba8(buf) => {
            let (rgb, alpha) = split_alpha(buf.as_raw(), 4);
            ("DeviceRGB", rgb, Some(alpha), ExtendedColorType::Rgb8)
        }
        other => {
            return Err(MarginError::UnsupportedColorMode {
                mode: format!("{:?}", other.color()),
            })
        }
    };

    let (filter, data) = match encoding {
        ImageEncoding::Flate => ("FlateDecode", flate(&samples)?),
        ImageEncoding::Jpeg { quality } => {
            let mut buf = Vec::new();
            JpegEncoder::new_with_quality(&mut buf, quality)
                .encode(&samples, image.width(), image.height(), color)
                .map_err(|e| MarginError::Encoding {
                    detail: format!("JPEG encoding failed: {e}"),
                })?;
            ("DCTDecode", buf)
        }
    };

    Ok(EncodedImage {
        color_space,
        filter,
        data,
        alpha,
    })
}

/// Split interleaved samples into colour channels and the trailing alpha.
fn split_alpha(raw: &[u8], channels: usize) -> (Vec<u8>, Vec<u8>) {
    let pixels = raw.len() / channels;
    let mut color = Vec::with_capacity(pixels * (channels - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for px in raw.chunks_exact(channels) {
        color.extend_from_slice(&px[..channels - 1]);
        alpha.push(px[channels - 1]);
    }
    (color, alpha)
}

fn flate(data: &[u8]) -> Result<Vec<u8>, MarginError> {
    let compress_err = |e: std::io::Error| MarginError::Encoding {
        detail: format!("zlib compression failed: {e}"),
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}

fn image_stream(
    width: u32,
    height: u32,
    color_space: &str,
    filter: &str,
    data: Vec<u8>,
    smask: Option<ObjectId>,
) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", "XObject");
    dict.set("Subtype", "Image");
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", color_space);
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", filter);
    if let Some(id) = smask {
        dict.set("SMask", id);
    }
    Stream::new(dict, data)
}
