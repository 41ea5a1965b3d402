//! # pdf2image
//!
//! Convert a PDF document into one raster image per page, preview and prune
//! the pages, and pack what is left into a single zip archive.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Select    validate type (MIME / extension) and size (≤ 100 MB)
//!  ├─ 2. Render    rasterise pages 1..N in order via pdfium (spawn_blocking)
//!  ├─ 3. Encode    png (lossless) / jpg / webp (quality 90)
//!  ├─ 4. Collect   ordered PageCollection with a "current page" pointer
//!  └─ 5. Pack      page-001.<ext> … page-NNN.<ext> → {name}_images.zip
//! ```
//!
//! The [`Converter`] owns all of that state and exposes it as
//! [`StateSnapshot`]s; rendering is delegated to a [`PdfBackend`], which is
//! [`PdfiumBackend`] in production and any fake in tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2image::{Converter, ConverterConfig, PdfiumBackend, RenderSettings, SourceDocument};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(PdfiumBackend::bind()?);
//!     let mut converter = Converter::new(backend, ConverterConfig::default());
//!
//!     converter.select_file(Some(SourceDocument::from_path("document.pdf").await?))?;
//!     converter.convert(RenderSettings::default()).await?;
//!     converter.delete_page(); // drop page 1
//!
//!     let archive = converter.download().await?;
//!     archive.write_to(".").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2image` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Quality Levels
//!
//! | Level | Scale | A4 page at 72 pt/in |
//! |-------|-------|---------------------|
//! | 50    | 1.0×  | 595 × 842 px        |
//! | 75    | 1.5×  | 893 × 1263 px       |
//! | 100   | 2.0×  | 1190 × 1684 px      |
//! | 150   | 3.0×  | 1785 × 2526 px      |
//! | 200   | 4.0×  | 2380 × 3368 px      |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod collection;
pub mod config;
pub mod converter;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use archive::{pack, ArchiveArtifact};
pub use collection::{PageCollection, PageImage};
pub use config::{ConverterConfig, ConverterConfigBuilder, OutputFormat, QualityLevel, RenderSettings};
pub use converter::{ConversionState, Converter, PageProgress, StateSnapshot};
pub use document::{format_file_size, FileInfo, SourceDocument};
pub use error::{Pdf2ImgError, ValidationError};
pub use pipeline::backend::{BackendError, PdfBackend, RasterDocument};
pub use pipeline::rasterize::{inspect, rasterize};
pub use pipeline::render::PdfiumBackend;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
