//! Archive packing: page images → one flat zip.
//!
//! Entry names are positional, not page numbers: the first image handed in is
//! `page-001`, the second `page-002`, and so on. Deleting pages before a
//! download therefore never leaves gaps in the archive. The extension comes
//! from each image's own stored format.

use crate::collection::PageImage;
use crate::error::Pdf2ImgError;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A packed archive ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveArtifact {
    /// `{base_name}_images.zip`
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveArtifact {
    /// Write the archive into `dir` and return the final path.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, Pdf2ImgError> {
        let dir = dir.as_ref();
        let path = dir.join(&self.file_name);

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Pdf2ImgError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        let tmp_path = path.with_extension("zip.tmp");
        tokio::fs::write(&tmp_path, &self.bytes)
            .await
            .map_err(|e| Pdf2ImgError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| Pdf2ImgError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Name of the `index`-th (0-based) entry: `page-{index+1:03}.{ext}`.
pub fn entry_name(index: usize, image: &PageImage) -> String {
    format!("page-{:03}.{}", index + 1, image.format.extension())
}

/// Final archive file name for a base name.
pub fn archive_file_name(base_name: &str) -> String {
    format!("{base_name}_images.zip")
}

/// Pack `images` in the given order into a zip archive.
pub fn pack(images: &[PageImage], base_name: &str) -> Result<ArchiveArtifact, Pdf2ImgError> {
    let archive_err = |e: &dyn std::fmt::Display| Pdf2ImgError::Archive {
        detail: e.to_string(),
    };

    let capacity = images.iter().map(|p| p.data().len()).sum::<usize>() + 1024;
    let mut zip = ZipWriter::new(Cursor::new(Vec::with_capacity(capacity)));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, image) in images.iter().enumerate() {
        if image.data().is_empty() {
            return Err(Pdf2ImgError::Archive {
                detail: format!("page {} has no image data", image.page_number),
            });
        }
        let name = entry_name(index, image);
        zip.start_file(name.as_str(), options)
            .map_err(|e| archive_err(&e))?;
        zip.write_all(image.data()).map_err(|e| archive_err(&e))?;
        debug!(
            "Packed {} (page {}, {} bytes)",
            name,
            image.page_number,
            image.data().len()
        );
    }

    let bytes = zip.finish().map_err(|e| archive_err(&e))?.into_inner();
    info!("Packed {} images into {} bytes", images.len(), bytes.len());

    Ok(ArchiveArtifact {
        file_name: archive_file_name(base_name),
        bytes,
    })
}
