//! CLI binary for pdf-margin.
//!
//! A thin shim over the library crate: `serve` runs the HTTP API, `ui` runs
//! the companion form, and `pad` processes a local file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_margin::config::DEFAULT_MAX_UPLOAD_BYTES;
use pdf_margin::{
    pad_file, ColorMode, ImageEncoding, Margins, PaddingProgressCallback, PipelineConfig,
    ProgressCallback, ServerConfig, UiConfig,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Rendering");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PaddingProgressCallback for CliProgressCallback {
    fn on_document_loaded(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Padding");
    }

    fn on_page_padded(&self, _page_num: usize, _total_pages: usize) {
        self.bar.inc(1);
    }

    fn on_document_assembled(&self, total_pages: usize, output_bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages assembled  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{output_bytes} bytes")),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP API on port 8000
  pdf-margin serve --host 0.0.0.0 --port 8000

  # Run the form UI, pointing at the API
  pdf-margin ui --api-url http://127.0.0.1:8000

  # Pad a local file with 50 px on every side
  pdf-margin pad document.pdf -o margined.pdf

  # Asymmetric margins, grayscale JPEG output
  pdf-margin pad scan.pdf -o out.pdf --left 120 --right 40 --color gray --jpeg-quality 85

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (otherwise next to the executable or system)
  PDF_MARGIN_HOST         Bind host for serve / ui
  PDF_MARGIN_PORT         Bind port for serve / ui
  PDF_MARGIN_API_URL      API base URL used by the ui subcommand
  RUST_LOG                Override log filter (e.g. pdf_margin=debug)
"#;

/// Add white margins around every page of a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-margin",
    version,
    about = "Add white margins around every page of a PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF_MARGIN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF_MARGIN_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Run the companion form UI.
    Ui(UiArgs),
    /// Pad a local PDF file.
    Pad(PadArgs),
}

/// Rendering knobs shared by `serve` and `pad`.
#[derive(Args, Debug, Clone)]
struct PipelineArgs {
    /// Rasterisation DPI (72–600).
    #[arg(long, env = "PDF_MARGIN_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Pixels per inch when placing padded bitmaps on output pages.
    #[arg(long, env = "PDF_MARGIN_OUTPUT_DPI", default_value_t = 72)]
    output_dpi: u32,

    /// Color mode of rendered pages: rgb or gray.
    #[arg(long, env = "PDF_MARGIN_COLOR", value_enum, default_value = "rgb")]
    color: ColorArg,

    /// Store pages as JPEG at this quality (1–100) instead of lossless Flate.
    #[arg(long, env = "PDF_MARGIN_JPEG_QUALITY")]
    jpeg_quality: Option<u8>,

    /// Reject documents with more pages than this.
    #[arg(long, env = "PDF_MARGIN_MAX_PAGES")]
    max_pages: Option<usize>,

    /// Reject pages that would rasterise to more pixels than this.
    #[arg(long, env = "PDF_MARGIN_MAX_PAGE_PIXELS")]
    max_page_pixels: Option<u64>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF_MARGIN_PASSWORD")]
    password: Option<String>,

    /// Explicit path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Bind host.
    #[arg(long, env = "PDF_MARGIN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Bind port.
    #[arg(long, env = "PDF_MARGIN_PORT", default_value_t = 8000)]
    port: u16,

    /// Largest accepted upload in bytes.
    #[arg(long, env = "PDF_MARGIN_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
struct UiArgs {
    /// Base URL of the API process.
    #[arg(long, env = "PDF_MARGIN_API_URL")]
    api_url: String,

    /// Bind host.
    #[arg(long, env = "PDF_MARGIN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Bind port.
    #[arg(long, env = "PDF_MARGIN_PORT", default_value_t = 8501)]
    port: u16,

    /// Largest accepted upload in bytes.
    #[arg(long, env = "PDF_MARGIN_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,
}

#[derive(Args, Debug)]
struct PadArgs {
    /// Input PDF file.
    input: PathBuf,

    /// Output PDF file.
    #[arg(short, long, env = "PDF_MARGIN_OUTPUT")]
    output: PathBuf,

    /// Left margin in pixels.
    #[arg(long, default_value_t = 50)]
    left: u32,

    /// Right margin in pixels.
    #[arg(long, default_value_t = 50)]
    right: u32,

    /// Top margin in pixels.
    #[arg(long, default_value_t = 50)]
    top: u32,

    /// Bottom margin in pixels.
    #[arg(long, default_value_t = 50)]
    bottom: u32,

    /// Print padding statistics as JSON on stdout.
    #[arg(long, env = "PDF_MARGIN_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF_MARGIN_NO_PROGRESS")]
    no_progress: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ColorArg {
    Rgb,
    Gray,
}

impl From<ColorArg> for ColorMode {
    fn from(v: ColorArg) -> Self {
        match v {
            ColorArg::Rgb => ColorMode::Rgb,
            ColorArg::Gray => ColorMode::Gray,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs for `pad`.
    let show_progress = match &cli.command {
        Command::Pad(args) => !cli.quiet && !args.no_progress && !args.json,
        _ => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => {
            let pipeline = build_config(&args.pipeline, None)?;
            let server = ServerConfig {
                host: args.host,
                port: args.port,
                max_upload_bytes: args.max_upload_bytes,
            };
            pdf_margin::server::serve(server, pipeline)
                .await
                .context("API server failed")?;
        }
        Command::Ui(args) => {
            let ui = UiConfig {
                host: args.host,
                port: args.port,
                api_url: args.api_url,
                max_upload_bytes: args.max_upload_bytes,
            };
            pdf_margin::ui::serve(ui).await.context("UI server failed")?;
        }
        Command::Pad(args) => run_pad(args, show_progress, cli.quiet).await?,
    }

    Ok(())
}

async fn run_pad(args: PadArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PaddingProgressCallback>)
    } else {
        None
    };
    let config = build_config(&args.pipeline, progress)?;
    let margins = Margins {
        left: args.left,
        right: args.right,
        top: args.top,
        bottom: args.bottom,
    };

    let input = args.input.clone();
    let output = args.output.clone();
    let document = tokio::task::spawn_blocking(move || pad_file(&input, &output, margins, &config))
        .await
        .context("Padding task panicked")?
        .with_context(|| format!("Failed to pad {}", args.input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "pages": document.pages,
            "stats": document.stats,
        }))
        .context("Failed to serialise stats")?;
        println!("{json}");
    } else if !quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            document.stats.page_count,
            document.stats.total_ms,
            bold(&args.output.display().to_string()),
        );
    }
    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(args: &PipelineArgs, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .dpi(args.dpi)
        .output_dpi(args.output_dpi)
        .color_mode(args.color.clone().into());

    if let Some(quality) = args.jpeg_quality {
        builder = builder.encoding(ImageEncoding::Jpeg { quality });
    }
    if let Some(n) = args.max_pages {
        builder = builder.max_pages(n);
    }
    if let Some(px) = args.max_page_pixels {
        builder = builder.max_page_pixels(px);
    }
    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref path) = args.pdfium_lib {
        builder = builder.pdfium_lib_path(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
