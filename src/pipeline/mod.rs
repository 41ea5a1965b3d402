//! Pipeline stages for PDF-to-image conversion.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ backend.open ──▶ render_page(scale) ──▶ encode ──▶ PageImage
//!           (parse, count)   (pixel buffer)         (png/jpg/webp)
//! ```
//!
//! 1. [`backend`]   — the narrow capability interface over a PDF renderer,
//!    so everything above it can run against a fake in tests
//! 2. [`render`]    — the pdfium-render implementation of that interface
//! 3. [`encode`]    — pixel buffer → encoded bytes in the requested format
//! 4. [`rasterize`] — drives 1–3 page by page, strictly in order, and turns
//!    backend failures into [`crate::error::Pdf2ImgError`] values

pub mod backend;
pub mod encode;
pub mod rasterize;
pub mod render;
