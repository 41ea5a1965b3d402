//! Image encoding: `DynamicImage` → PNG / JPEG / WebP bytes.
//!
//! PNG is lossless. JPEG and WebP use the configured quality factor
//! (90 by default). JPEG has no alpha channel, so pages are flattened to RGB
//! first; pdfium renders an opaque white background so nothing is lost.

use crate::config::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("WebP encoding failed: {0}")]
    Webp(String),

    #[error("cannot encode an empty {width}x{height} image")]
    Empty { width: u32, height: u32 },
}

/// Encode a rendered page in `format`. `quality` (1–100) applies to lossy formats.
pub fn encode_page(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(EncodeError::Empty {
            width: img.width(),
            height: img.height(),
        });
    }

    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        }
        OutputFormat::Jpg => {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
        }
        OutputFormat::Webp => {
            let rgba = img.to_rgba8();
            let encoded = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height())
                .encode_simple(false, f32::from(quality))
                .map_err(|e| EncodeError::Webp(format!("{:?}", e)))?;
            buf.extend_from_slice(&encoded);
        }
    }

    debug!(
        "Encoded {}x{} image → {} bytes {}",
        img.width(),
        img.height(),
        buf.len(),
        format
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn png_round_trips_losslessly() {
        let img = red(10, 10);
        let data = encode_page(&img, OutputFormat::Png, 90).expect("encode should succeed");
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn jpeg_has_soi_marker() {
        let data = encode_page(&red(16, 8), OutputFormat::Jpg, 90).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn webp_has_riff_header() {
        let data = encode_page(&red(16, 16), OutputFormat::Webp, 90).unwrap();
        assert_eq!(&data[..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 5));
        assert!(matches!(
            encode_page(&img, OutputFormat::Png, 90),
            Err(EncodeError::Empty { .. })
        ));
    }
}
