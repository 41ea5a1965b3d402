//! Error types for the pdf2image library.
//!
//! Every failure is terminal for the *operation* that raised it, never for
//! the session: the [`crate::converter::Converter`] always falls back to a
//! retryable state (`Idle` with an error, or `Ready` with an error) and keeps
//! the error text around for the presentation layer.
//!
//! * [`ValidationError`] — the selected file was rejected before any work
//!   started (missing, wrong type, too large).
//! * [`Pdf2ImgError`] — everything else: parse, render/encode, archive,
//!   state-machine guards and the ambient I/O / binding failures.

use std::path::PathBuf;
use thiserror::Error;

/// Why a selected file was rejected by `select_file`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing was selected (empty picker / empty drop).
    #[error("No file selected")]
    NoFile,

    /// MIME type and extension both fail to indicate a PDF.
    #[error("'{file_name}' is not a PDF (type: {mime:?})\nPlease choose a .pdf file.")]
    UnsupportedType { file_name: String, mime: String },

    /// The file exceeds the configured size bound.
    #[error("'{file_name}' is {size} bytes, larger than the {limit} byte limit")]
    TooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },
}

/// All errors returned by the pdf2image library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The selected file failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Document errors ───────────────────────────────────────────────────
    /// The bytes could not be parsed as a PDF document.
    #[error("Could not read the document as a PDF: {detail}")]
    DocumentParse { detail: String },

    /// Rendering or encoding failed for a page. Aborts the whole run.
    #[error("Conversion failed on page {page}: {detail}")]
    Conversion { page: usize, detail: String },

    // ── Archive errors ────────────────────────────────────────────────────
    /// The zip archive could not be produced.
    #[error("Failed to build the image archive: {detail}")]
    Archive { detail: String },

    // ── State-machine guards ──────────────────────────────────────────────
    /// `convert` was called before a document was selected.
    #[error("No PDF selected; choose a file before converting")]
    NoDocument,

    /// An operation was attempted while a conversion or download was running.
    #[error("Busy: cannot start a new operation while {state}")]
    Busy { state: String },

    /// The operation is not valid in the current state.
    #[error("'{operation}' is not allowed while {state}")]
    InvalidState { operation: &'static str, state: String },

    /// `download` was called with no pages left.
    #[error("There are no page images to download")]
    EmptyCollection,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output archive.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
