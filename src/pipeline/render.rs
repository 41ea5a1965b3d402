//! PDF rasterisation via pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks for the whole render. Callers run [`PdfiumBackend`]
//! inside `tokio::task::spawn_blocking` (see
//! [`crate::pipeline::rasterize::rasterize_document`]); the backend itself is
//! plain synchronous code.
//!
//! ## Library lookup
//!
//! 1. `PDFIUM_LIB_PATH` — a library file, or a directory containing one
//! 2. the working directory
//! 3. the system library search path

use crate::error::Pdf2ImgError;
use crate::pipeline::backend::{BackendError, PdfBackend, RasterDocument};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable pointing at an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// [`PdfBackend`] backed by a bound pdfium library.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    /// Bind to pdfium using the lookup order described in the module docs.
    pub fn bind() -> Result<Self, Pdf2ImgError> {
        let bindings = match std::env::var_os(PDFIUM_LIB_PATH_ENV) {
            Some(configured) => {
                let configured = PathBuf::from(configured);
                let lib = if configured.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(&configured)
                } else {
                    configured
                };
                debug!("Binding pdfium from {}", lib.display());
                Pdfium::bind_to_library(&lib)
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(e.to_string()))?;

        info!("pdfium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PdfBackend for PdfiumBackend {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>, BackendError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    BackendError::new("the document is password-protected")
                } else {
                    BackendError(err_str)
                }
            })?;

        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, BackendError> {
        let page_index = u16::try_from(index)
            .map_err(|_| BackendError(format!("page index {index} out of range")))?;

        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| BackendError(format!("{:?}", e)))?;

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(scale)
            .render_form_data(true);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| BackendError(format!("{:?}", e)))?;

        Ok(bitmap.as_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_can_be_shared_across_blocking_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PdfiumBackend>();

        // Same coercion the CLI and the orchestrator rely on.
        fn _as_shared(backend: PdfiumBackend) -> std::sync::Arc<dyn PdfBackend> {
            std::sync::Arc::new(backend)
        }
    }

    #[test]
    fn missing_library_path_is_a_binding_error() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(PDFIUM_LIB_PATH_ENV, dir.path().join("libnothing.so"));
        let result = PdfiumBackend::bind();
        std::env::remove_var(PDFIUM_LIB_PATH_ENV);

        assert!(matches!(result, Err(Pdf2ImgError::PdfiumBindingFailed(_))));
    }
}
