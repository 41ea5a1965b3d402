//! The selected source document and its validation rules.
//!
//! Validation is by declared content type or file extension only. The bytes
//! are never sniffed here; a file that claims to be a PDF but is not will be
//! rejected later by the rasteriser with [`Pdf2ImgError::DocumentParse`].

use crate::error::{Pdf2ImgError, ValidationError};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// MIME type reported for PDF files.
pub const PDF_MIME: &str = "application/pdf";

/// An immutable, validated-or-not PDF byte buffer plus its file metadata.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Clone)]
pub struct SourceDocument {
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl SourceDocument {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Load a document from disk. The MIME type is derived from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Pdf2ImgError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => Pdf2ImgError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Pdf2ImgError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let mime_type = mime_from_file_name(&file_name);
        debug!("Loaded {} ({} bytes, {})", file_name, bytes.len(), mime_type);

        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// True when the declared type or the extension indicates a PDF.
    pub fn looks_like_pdf(&self) -> bool {
        self.mime_type.to_ascii_lowercase().contains("pdf")
            || self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }

    /// Archive base name derived from the file name (see [`base_name`]).
    pub fn base_name(&self) -> String {
        base_name(&self.file_name)
    }

    pub fn info(&self) -> FileInfo {
        FileInfo {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size(),
            size_label: format_file_size(self.size()),
        }
    }
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Display metadata about the selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    /// Human-readable size, e.g. `"2.35 MB"`.
    pub size_label: String,
}

/// Check a selection against the accepted type and the size bound.
pub fn validate(doc: Option<&SourceDocument>, max_bytes: u64) -> Result<(), ValidationError> {
    let doc = doc.ok_or(ValidationError::NoFile)?;

    if !doc.looks_like_pdf() {
        return Err(ValidationError::UnsupportedType {
            file_name: doc.file_name.clone(),
            mime: doc.mime_type.clone(),
        });
    }

    if doc.size() > max_bytes {
        return Err(ValidationError::TooLarge {
            file_name: doc.file_name.clone(),
            size: doc.size(),
            limit: max_bytes,
        });
    }

    Ok(())
}

/// Strip a trailing `.pdf` (any case) and replace every character that is
/// not an ASCII letter or digit with `_`.
///
/// `"My Report (v2).pdf"` → `"My_Report__v2_"`.
pub fn base_name(file_name: &str) -> String {
    let stem = if file_name.to_ascii_lowercase().ends_with(".pdf") {
        &file_name[..file_name.len() - 4]
    } else {
        file_name
    };

    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Format a byte count with decimal units (K = 1000), two decimals above bytes.
pub fn format_file_size(bytes: u64) -> String {
    const K: f64 = 1000.0;
    let b = bytes as f64;
    if b < K {
        format!("{bytes} B")
    } else if b < K * K {
        format!("{:.2} KB", b / K)
    } else if b < K * K * K {
        format!("{:.2} MB", b / (K * K))
    } else {
        format!("{:.2} GB", b / (K * K * K))
    }
}

fn mime_from_file_name(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".pdf") {
        PDF_MIME
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, mime: &str, len: usize) -> SourceDocument {
        SourceDocument::new(name, mime, vec![0u8; len])
    }

    #[test]
    fn accepts_pdf_by_mime_or_extension() {
        assert!(validate(Some(&doc("a.pdf", PDF_MIME, 10)), 100).is_ok());
        assert!(validate(Some(&doc("noext", PDF_MIME, 10)), 100).is_ok());
        assert!(validate(Some(&doc("a.PDF", "", 10)), 100).is_ok());
    }

    #[test]
    fn rejects_missing_file() {
        assert_eq!(validate(None, 100), Err(ValidationError::NoFile));
    }

    #[test]
    fn rejects_wrong_type() {
        let err = validate(Some(&doc("photo.png", "image/png", 10)), 100).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn rejects_oversize_but_accepts_exact_limit() {
        assert!(validate(Some(&doc("a.pdf", PDF_MIME, 100)), 100).is_ok());
        let err = validate(Some(&doc("a.pdf", PDF_MIME, 101)), 100).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                file_name: "a.pdf".into(),
                size: 101,
                limit: 100
            }
        );
    }

    #[test]
    fn base_name_strips_suffix_and_sanitises() {
        assert_eq!(base_name("report.pdf"), "report");
        assert_eq!(base_name("My Report (v2).PDF"), "My_Report__v2_");
        assert_eq!(base_name("a.pdf.backup"), "a_pdf_backup");
        assert_eq!(base_name("résumé.pdf"), "r_sum_");
    }

    #[test]
    fn file_size_labels() {
        assert_eq!(format_file_size(999), "999 B");
        assert_eq!(format_file_size(1_000), "1.00 KB");
        assert_eq!(format_file_size(2_345_678), "2.35 MB");
        assert_eq!(format_file_size(3_000_000_000), "3.00 GB");
    }

    #[tokio::test]
    async fn from_path_derives_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let doc = SourceDocument::from_path(&path).await.unwrap();
        assert_eq!(doc.file_name(), "sample.pdf");
        assert_eq!(doc.mime_type(), PDF_MIME);
        assert_eq!(doc.size(), 8);
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = SourceDocument::from_path("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }));
    }
}
