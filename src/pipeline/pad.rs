//! Margin compositing: paste a page bitmap onto a larger white canvas.
//!
//! The canvas keeps the source's exact pixel layout. "White" is the maximum
//! value of every channel, alpha included, so padded RGBA pages come out
//! opaque rather than transparent.
//!
//! Canvas size is checked before allocation: an overflowing side is an
//! error, and [`check_pixel_budget`] applies `max_page_pixels` to the padded
//! size rather than the rendered one.

use crate::config::Margins;
use crate::error::MarginError;
use image::{imageops, DynamicImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

/// Pad `image` with a white border of the given widths.
///
/// The result measures `(w + left + right) × (h + top + bottom)` with the
/// source copied at `(left, top)`.
pub fn add_margin(image: &DynamicImage, margins: Margins) -> Result<DynamicImage, MarginError> {
    let padded = match image {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(pad_buffer(buf, Luma([u8::MAX]), margins)?)
        }
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(pad_buffer(buf, LumaA([u8::MAX; 2]), margins)?)
        }
        DynamicImage::ImageRgb8(buf) => {
            DynamicImage::ImageRgb8(pad_buffer(buf, Rgb([u8::MAX; 3]), margins)?)
        }
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(pad_buffer(buf, Rgba([u8::MAX; 4]), margins)?)
        }
        DynamicImage::ImageLuma16(buf) => {
            DynamicImage::ImageLuma16(pad_buffer(buf, Luma([u16::MAX]), margins)?)
        }
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLumaA16(pad_buffer(buf, LumaA([u16::MAX; 2]), margins)?)
        }
        DynamicImage::ImageRgb16(buf) => {
            DynamicImage::ImageRgb16(pad_buffer(buf, Rgb([u16::MAX; 3]), margins)?)
        }
        DynamicImage::ImageRgba16(buf) => {
            DynamicImage::ImageRgba16(pad_buffer(buf, Rgba([u16::MAX; 4]), margins)?)
        }
        DynamicImage::ImageRgb32F(buf) => {
            DynamicImage::ImageRgb32F(pad_buffer(buf, Rgb([1.0; 3]), margins)?)
        }
        DynamicImage::ImageRgba32F(buf) => {
            DynamicImage::ImageRgba32F(pad_buffer(buf, Rgba([1.0; 4]), margins)?)
        }
        other => {
            return Err(MarginError::UnsupportedColorMode {
                mode: format!("{:?}", other.color()),
            })
        }
    };
    Ok(padded)
}

/// Reject a page whose padded size exceeds `limit` pixels.
///
/// `page_num` is 1-based and only used for the error.
pub fn check_pixel_budget(
    page_num: usize,
    image: &DynamicImage,
    margins: Margins,
    limit: Option<u64>,
) -> Result<(), MarginError> {
    let (width, height) = margins.padded_size(image.width(), image.height())?;
    if let Some(limit) = limit {
        let pixels = u64::from(width) * u64::from(height);
        if pixels > limit {
            return Err(MarginError::PixelBudgetExceeded {
                page: page_num,
                pixels,
                limit,
            });
        }
    }
    Ok(())
}

fn pad_buffer<P: Pixel>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    white: P,
    margins: Margins,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, MarginError> {
    let (width, height) = margins.padded_size(src.width(), src.height())?;
    let mut canvas = ImageBuffer::from_pixel(width, height, white);
    imageops::replace(
        &mut canvas,
        src,
        i64::from(margins.left),
        i64::from(margins.top),
    );
    Ok(canvas)
}
