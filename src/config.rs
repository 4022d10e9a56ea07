//! Configuration types for margin padding.
//!
//! Per-request input is a [`Margins`] value; everything that stays fixed for
//! the lifetime of a process (resolution, encoding, resource ceilings) lives
//! in [`PipelineConfig`], built via its [`PipelineConfigBuilder`]. The two
//! surface processes get their own small structs, [`ServerConfig`] and
//! [`UiConfig`], so neither ever falls back to a hard-coded address.

use crate::error::MarginError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default margin on every side, in pixels.
pub const DEFAULT_MARGIN: u32 = 50;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

// ── Margins ──────────────────────────────────────────────────────────────

/// White border added around every page bitmap, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN)
    }
}

impl Margins {
    /// Same margin on all four sides.
    pub const fn uniform(px: u32) -> Self {
        Self {
            left: px,
            right: px,
            top: px,
            bottom: px,
        }
    }

    /// No border at all.
    pub const fn zero() -> Self {
        Self::uniform(0)
    }

    /// Validate signed request values.
    ///
    /// Negative values are rejected, never clamped.
    pub fn try_new(left: i64, right: i64, top: i64, bottom: i64) -> Result<Self, MarginError> {
        Ok(Self {
            left: side("left", left)?,
            right: side("right", right)?,
            top: side("top", top)?,
            bottom: side("bottom", bottom)?,
        })
    }

    /// Dimensions of a `width × height` bitmap once padded.
    ///
    /// Fails with [`MarginError::CanvasTooLarge`] when either side overflows
    /// `u32`.
    pub fn padded_size(&self, width: u32, height: u32) -> Result<(u32, u32), MarginError> {
        let w = width
            .checked_add(self.left)
            .and_then(|w| w.checked_add(self.right));
        let h = height
            .checked_add(self.top)
            .and_then(|h| h.checked_add(self.bottom));
        match (w, h) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(MarginError::CanvasTooLarge {
                width: u64::from(width) + u64::from(self.left) + u64::from(self.right),
                height: u64::from(height) + u64::from(self.top) + u64::from(self.bottom),
            }),
        }
    }
}

fn side(name: &'static str, value: i64) -> Result<u32, MarginError> {
    u32::try_from(value).map_err(|_| MarginError::InvalidMargin { side: name, value })
}

impl fmt::Display for Margins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left={} right={} top={} bottom={}",
            self.left, self.right, self.top, self.bottom
        )
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Pixel encoding every rasterised page is normalised to.
///
/// A single mode for the whole document keeps the assembler's cross-page
/// consistency check trivially satisfied for rendered input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// 8-bit RGB. (default)
    #[default]
    Rgb,
    /// 8-bit grayscale; roughly a third of the RGB output size.
    Gray,
}

/// How page bitmaps are stored inside the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ImageEncoding {
    /// Lossless zlib (`/FlateDecode`). (default)
    #[default]
    Flate,
    /// Lossy JPEG (`/DCTDecode`) at the given quality, 1–100.
    Jpeg { quality: u8 },
}

// ── PipelineConfig ───────────────────────────────────────────────────────

/// Process-wide settings for the rasterise → pad → assemble pipeline.
///
/// # Example
/// ```rust
/// use pdf_margin::{ColorMode, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .dpi(150)
///     .color_mode(ColorMode::Gray)
///     .max_pages(200)
///     .build()
///     .unwrap();
/// assert!((config.scale_factor() - 150.0 / 72.0).abs() < f32::EPSILON);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Rasterisation resolution. Range: 72–600. Default: 300.
    ///
    /// Pages are rendered at `dpi / 72` times their size in points.
    pub dpi: u32,

    /// Resolution used to place padded bitmaps on output pages. Default: 72.
    ///
    /// At 72 one bitmap pixel maps to one PDF point, so a 2650 × 3400 px
    /// bitmap produces a 2650 × 3400 pt page.
    pub output_dpi: u32,

    /// Pixel encoding of rasterised pages. Default: [`ColorMode::Rgb`].
    pub color_mode: ColorMode,

    /// Image stream encoding in the output PDF. Default: [`ImageEncoding::Flate`].
    pub encoding: ImageEncoding,

    /// Reject documents with more pages than this. Default: unlimited.
    pub max_pages: Option<usize>,

    /// Reject any page whose rasterised bitmap would exceed this many pixels.
    /// Default: unlimited.
    pub max_page_pixels: Option<u64>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit pdfium library path. Falls back to `PDFIUM_LIB_PATH`, then
    /// the executable's directory, then the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            output_dpi: 72,
            color_mode: ColorMode::default(),
            encoding: ImageEncoding::default(),
            max_pages: None,
            max_page_pixels: None,
            password: None,
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("dpi", &self.dpi)
            .field("output_dpi", &self.output_dpi)
            .field("color_mode", &self.color_mode)
            .field("encoding", &self.encoding)
            .field("max_pages", &self.max_pages)
            .field("max_page_pixels", &self.max_page_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PaddingProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Render scale relative to the 72-DPI page coordinate space.
    pub fn scale_factor(&self) -> f32 {
        self.dpi as f32 / POINTS_PER_INCH
    }

    /// Size in points of an output page holding a `width × height` bitmap.
    pub fn page_size_points(&self, width: u32, height: u32) -> (f32, f32) {
        let ratio = POINTS_PER_INCH / self.output_dpi as f32;
        (width as f32 * ratio, height as f32 * ratio)
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn output_dpi(mut self, dpi: u32) -> Self {
        self.config.output_dpi = dpi;
        self
    }

    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.config.color_mode = mode;
        self
    }

    pub fn encoding(mut self, encoding: ImageEncoding) -> Self {
        self.config.encoding = match encoding {
            ImageEncoding::Jpeg { quality } => ImageEncoding::Jpeg {
                quality: quality.clamp(1, 100),
            },
            other => other,
        };
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn max_page_pixels(mut self, px: u64) -> Self {
        self.config.max_page_pixels = Some(px);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, MarginError> {
        let c = &self.config;
        if !(72..=600).contains(&c.dpi) {
            return Err(MarginError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !(1..=2400).contains(&c.output_dpi) {
            return Err(MarginError::InvalidConfig(format!(
                "Output DPI must be 1–2400, got {}",
                c.output_dpi
            )));
        }
        if c.max_pages == Some(0) {
            return Err(MarginError::InvalidConfig("max_pages must be ≥ 1".into()));
        }
        if c.max_page_pixels == Some(0) {
            return Err(MarginError::InvalidConfig(
                "max_page_pixels must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Surface configs ──────────────────────────────────────────────────────

/// Default request body ceiling for uploads: 64 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Bind settings for the HTTP API process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bind settings for the form UI process plus the API it talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the API process, e.g. `http://10.0.0.5:8000`.
    pub api_url: String,
    pub max_upload_bytes: usize,
}

impl UiConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8501,
            api_url: api_url.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full endpoint URL for the given margins.
    pub fn endpoint_url(&self, margins: &Margins) -> String {
        format!(
            "{}/pdf_to_pdf_with_margin/?left={}&right={}&top={}&bottom={}",
            self.api_url.trim_end_matches('/'),
            margins.left,
            margins.right,
            margins.top,
            margins.bottom
        )
    }
}
