//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! pdfium is not async-safe, so everything here is blocking; callers in an
//! async context go through `spawn_blocking` (see [`crate::convert`]).
//!
//! The whole document is rendered before any page is padded. Peak memory is
//! therefore proportional to page count × scale², which is what the optional
//! `max_pages` and `max_page_pixels` ceilings exist to bound.

use crate::config::{ColorMode, PipelineConfig};
use crate::engine;
use crate::error::MarginError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Pixel size pdfium produces for a page of `width_pt × height_pt` points.
pub fn expected_pixel_size(width_pt: f32, height_pt: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / crate::config::POINTS_PER_INCH;
    (
        (width_pt * scale).round().max(1.0) as u32,
        (height_pt * scale).round().max(1.0) as u32,
    )
}

/// Rasterise every page of `bytes`, in page order.
///
/// Any failure aborts the whole document; no partial result is returned.
pub fn rasterize(bytes: &[u8], config: &PipelineConfig) -> Result<Vec<DynamicImage>, MarginError> {
    let pdfium = engine::bind_pdfium(config.pdfium_lib_path.as_deref())?;
    let password = config.password.as_deref();

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| classify_load_error(&format!("{e:?}"), password.is_some()))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    if total_pages == 0 {
        return Err(MarginError::EmptyDocument);
    }
    if let Some(limit) = config.max_pages {
        if total_pages > limit {
            return Err(MarginError::PageLimitExceeded {
                pages: total_pages,
                limit,
            });
        }
    }

    let render_config = PdfRenderConfig::new().scale_page_by_factor(config.scale_factor());
    let mut images = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        if let Some(limit) = config.max_page_pixels {
            let (w, h) = expected_pixel_size(page.width().value, page.height().value, config.dpi);
            let pixels = u64::from(w) * u64::from(h);
            if pixels > limit {
                return Err(MarginError::PixelBudgetExceeded {
                    page: page_num,
                    pixels,
                    limit,
                });
            }
        }

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| MarginError::RenderFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        let image = normalize(bitmap.as_image(), config.color_mode);
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}

/// Convert a rendered bitmap to the document-wide color mode.
pub fn normalize(image: DynamicImage, mode: ColorMode) -> DynamicImage {
    match (mode, image) {
        (ColorMode::Rgb, img @ DynamicImage::ImageRgb8(_)) => img,
        (ColorMode::Gray, img @ DynamicImage::ImageLuma8(_)) => img,
        (ColorMode::Rgb, img) => DynamicImage::ImageRgb8(img.to_rgb8()),
        (ColorMode::Gray, img) => DynamicImage::ImageLuma8(img.to_luma8()),
    }
}

fn classify_load_error(detail: &str, had_password: bool) -> MarginError {
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            MarginError::WrongPassword
        } else {
            MarginError::PasswordRequired
        }
    } else {
        MarginError::DocumentDecode {
            detail: detail.to_string(),
        }
    }
}
