//! CLI binary for pdf2image.
//!
//! A thin shim over the library crate: maps CLI flags to `RenderSettings` /
//! `ConverterConfig`, drives the `Converter` operations in order, and writes
//! the resulting archive.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2image::{
    format_file_size, inspect, ConversionProgressCallback, Converter, ConverterConfig, FileInfo,
    OutputFormat, PageImage, PdfBackend, PdfiumBackend, ProgressCallback, RenderSettings,
    SourceDocument,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn page_elapsed(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut t) = self.page_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, encoded_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format_file_size(encoded_len as u64)),
            dim(&format!("{:.1}s", self.page_elapsed())),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(error),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages rendered",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every page to PNG at the default 2x scale
  pdf2image document.pdf

  # Sharper JPEGs into ./out
  pdf2image --quality 150 --format jpg -o out document.pdf

  # Drop the cover and the last page before packing
  pdf2image --delete 1,12 slides.pdf

  # Page count and file info only
  pdf2image --inspect-only document.pdf

QUALITY LEVELS:
  50 → 1.0x   75 → 1.5x   100 → 2.0x (default)   150 → 3.0x   200 → 4.0x
  Any other value falls back to 100.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override the log filter
"#;

/// Convert PDF pages to images and pack them into a zip archive.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2image",
    version,
    about = "Convert PDF pages to PNG / JPEG / WebP images packed in a zip archive",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory to write `{name}_images.zip` into.
    #[arg(short, long, env = "PDF2IMAGE_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Quality level: 50, 75, 100, 150 or 200.
    #[arg(long, env = "PDF2IMAGE_QUALITY", default_value_t = 100)]
    quality: u32,

    /// Output image format: png, jpg (or jpeg), webp.
    #[arg(long, env = "PDF2IMAGE_FORMAT", default_value = "png")]
    format: String,

    /// Lossy encode quality for jpg / webp (1–100).
    #[arg(long, env = "PDF2IMAGE_ENCODE_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    encode_quality: u8,

    /// Largest accepted input in MB.
    #[arg(long, env = "PDF2IMAGE_MAX_SIZE_MB", default_value_t = 100)]
    max_size_mb: u64,

    /// Page numbers to leave out of the archive, e.g. 1,4,7.
    #[arg(long, value_delimiter = ',')]
    delete: Vec<usize>,

    /// Print file info and page count only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON summary instead of the human-readable one.
    #[arg(long, env = "PDF2IMAGE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMAGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMAGE_QUIET")]
    quiet: bool,
}

#[derive(Serialize)]
struct InspectSummary {
    file: FileInfo,
    page_count: usize,
}

#[derive(Serialize)]
struct ConversionSummary {
    file: Option<FileInfo>,
    settings: RenderSettings,
    pages: Vec<PageImage>,
    archive: PathBuf,
    archive_bytes: usize,
    duration_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    let backend: Arc<dyn PdfBackend> =
        Arc::new(PdfiumBackend::bind().context("PDF engine unavailable")?);

    let document = SourceDocument::from_path(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let file = document.info();
        let page_count = inspect(backend, document)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            let summary = InspectSummary { file, page_count };
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
            );
        } else {
            println!("File:   {}", file.file_name);
            println!("Size:   {}", file.size_label);
            println!("Type:   {}", file.mime_type);
            println!("Pages:  {}", page_count);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let settings = RenderSettings::builder()
        .quality_percent(cli.quality)
        .format(parse_format(&cli.format)?)
        .build();
    if settings.quality.percent() != cli.quality {
        warn!(
            "Quality {} is not a defined level, using {}",
            cli.quality, settings.quality
        );
    }

    let mut builder = ConverterConfig::builder()
        .max_file_bytes(cli.max_size_mb.saturating_mul(1024 * 1024))
        .encode_quality(cli.encode_quality);
    if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        builder = builder.progress_callback(cb as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let start = Instant::now();
    let mut converter = Converter::new(backend, config);

    converter
        .select_file(Some(document))
        .context("File rejected")?;
    converter
        .convert(settings)
        .await
        .context("Conversion failed")?;

    for page_number in &cli.delete {
        let position = converter
            .pages()
            .pages()
            .iter()
            .position(|p| p.page_number == *page_number);
        match position {
            Some(index) => {
                converter.set_current(index);
                converter.delete_page();
            }
            None => warn!("--delete {}: no such page, ignoring", page_number),
        }
    }
    if converter.pages().is_empty() {
        anyhow::bail!("Every page was deleted; nothing to pack");
    }

    let artifact = converter.download().await.context("Packing failed")?;
    let path = artifact
        .write_to(&cli.output_dir)
        .await
        .context("Failed to save archive")?;

    // ── Summary ──────────────────────────────────────────────────────────
    let snapshot = converter.snapshot();
    if cli.json {
        let summary = ConversionSummary {
            file: snapshot.file,
            settings: snapshot.settings,
            pages: snapshot.pages,
            archive: path,
            archive_bytes: artifact.bytes.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} images  {}  →  {}",
            green("✔"),
            snapshot.pages.len(),
            dim(&format_file_size(artifact.bytes.len() as u64)),
            bold(&path.display().to_string()),
        );
    }

    Ok(())
}

/// Parse `--format` into an `OutputFormat`.
fn parse_format(s: &str) -> Result<OutputFormat> {
    OutputFormat::parse(s)
        .with_context(|| format!("Unsupported format '{}' (expected png, jpg or webp)", s.trim()))
}
