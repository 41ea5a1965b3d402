//! Document rasteriser: PDF bytes + settings → ordered page images.
//!
//! Pages are rendered one after another on a single blocking thread. The
//! previous page's pixel buffer is dropped before the next render starts, so
//! peak memory is one raster plus the encoded output so far. Any page failure
//! aborts the run and discards what was already produced.

use crate::collection::PageImage;
use crate::config::RenderSettings;
use crate::document::SourceDocument;
use crate::error::Pdf2ImgError;
use crate::pipeline::backend::{PdfBackend, RasterDocument};
use crate::pipeline::encode;
use crate::progress::ProgressCallback;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render and encode a single 1-based page of an already opened document.
pub fn render_one(
    doc: &dyn RasterDocument,
    page_number: usize,
    settings: RenderSettings,
    encode_quality: u8,
) -> Result<PageImage, Pdf2ImgError> {
    let total = doc.page_count();
    if page_number == 0 || page_number > total {
        return Err(Pdf2ImgError::Conversion {
            page: page_number,
            detail: format!("page is out of range (document has {total} pages)"),
        });
    }

    let image = doc
        .render_page(page_number - 1, settings.scale_factor())
        .map_err(|e| Pdf2ImgError::Conversion {
            page: page_number,
            detail: e.to_string(),
        })?;
    debug!(
        "Rendered page {} → {}x{} px at {}x",
        page_number,
        image.width(),
        image.height(),
        settings.scale_factor()
    );

    let data = encode::encode_page(&image, settings.format, encode_quality).map_err(|e| {
        Pdf2ImgError::Conversion {
            page: page_number,
            detail: format!("Image encoding failed: {}", e),
        }
    })?;

    Ok(PageImage::new(
        page_number,
        settings.format,
        settings.quality,
        (image.width(), image.height()),
        data,
    ))
}

/// Open `document` and rasterise one 1-based page.
pub fn rasterize(
    backend: &dyn PdfBackend,
    document: &SourceDocument,
    page_number: usize,
    settings: RenderSettings,
    encode_quality: u8,
) -> Result<PageImage, Pdf2ImgError> {
    let doc = open(backend, document)?;
    render_one(doc.as_ref(), page_number, settings, encode_quality)
}

/// Blocking implementation of whole-document rasterisation.
///
/// `on_page` is invoked after each page with `(done, total)`.
pub fn rasterize_all_blocking(
    backend: &dyn PdfBackend,
    document: &SourceDocument,
    settings: RenderSettings,
    encode_quality: u8,
    progress: Option<&ProgressCallback>,
    mut on_page: impl FnMut(usize, usize),
) -> Result<Vec<PageImage>, Pdf2ImgError> {
    let start = Instant::now();
    let doc = open(backend, document)?;
    let total = doc.page_count();
    if total == 0 {
        return Err(Pdf2ImgError::DocumentParse {
            detail: "the document has no pages".into(),
        });
    }
    info!(
        "Rasterising {} pages of '{}' at {} as {}",
        total,
        document.file_name(),
        settings.quality,
        settings.format
    );

    if let Some(cb) = progress {
        cb.on_conversion_start(total);
    }
    on_page(0, total);

    let mut pages = Vec::with_capacity(total);
    for page_number in 1..=total {
        if let Some(cb) = progress {
            cb.on_page_start(page_number, total);
        }

        match render_one(doc.as_ref(), page_number, settings, encode_quality) {
            Ok(page) => {
                if let Some(cb) = progress {
                    cb.on_page_complete(page_number, total, page.data().len());
                }
                pages.push(page);
                on_page(page_number, total);
            }
            Err(e) => {
                warn!("Page {}/{} failed: {}", page_number, total, e);
                if let Some(cb) = progress {
                    cb.on_page_error(page_number, total, &e.to_string());
                }
                return Err(e);
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_conversion_complete(total);
    }
    info!(
        "Rasterised {} pages in {}ms",
        total,
        start.elapsed().as_millis()
    );
    Ok(pages)
}

/// Rasterise every page of `document`, in order, on a blocking worker thread.
pub async fn rasterize_document(
    backend: Arc<dyn PdfBackend>,
    document: SourceDocument,
    settings: RenderSettings,
    encode_quality: u8,
    progress: Option<ProgressCallback>,
    on_page: impl FnMut(usize, usize) + Send + 'static,
) -> Result<Vec<PageImage>, Pdf2ImgError> {
    tokio::task::spawn_blocking(move || {
        rasterize_all_blocking(
            backend.as_ref(),
            &document,
            settings,
            encode_quality,
            progress.as_ref(),
            on_page,
        )
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Render task panicked: {}", e)))?
}

/// Page count of `document` without rendering anything.
pub async fn inspect(
    backend: Arc<dyn PdfBackend>,
    document: SourceDocument,
) -> Result<usize, Pdf2ImgError> {
    tokio::task::spawn_blocking(move || {
        open(backend.as_ref(), &document).map(|doc| doc.page_count())
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Inspect task panicked: {}", e)))?
}

fn open<'a>(
    backend: &'a dyn PdfBackend,
    document: &'a SourceDocument,
) -> Result<Box<dyn RasterDocument + 'a>, Pdf2ImgError> {
    backend
        .open(document.bytes())
        .map_err(|e| Pdf2ImgError::DocumentParse {
            detail: e.to_string(),
        })
}
