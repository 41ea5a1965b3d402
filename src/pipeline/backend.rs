//! Capability interface over an external PDF renderer.
//!
//! Only two things are needed from a renderer: open a byte buffer and report
//! its page count, then draw one page at a given scale into a pixel buffer.
//! [`crate::pipeline::render::PdfiumBackend`] is the production
//! implementation.

use image::DynamicImage;
use thiserror::Error;

/// Failure reported by a backend; the rasteriser adds page context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Opens PDF byte buffers.
pub trait PdfBackend: Send + Sync {
    /// Parse `bytes` as a PDF. Errors here mean the buffer is not a usable document.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>, BackendError>;
}

/// A parsed document that can draw its pages.
pub trait RasterDocument {
    fn page_count(&self) -> usize;

    /// Draw the 0-based page `index` at `scale` × its natural size.
    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, BackendError>;
}
