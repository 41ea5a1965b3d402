//! Configuration types for PDF-to-image conversion.
//!
//! Two structs, two lifetimes:
//!
//! * [`RenderSettings`] — what the user picks per conversion (quality level and
//!   output format). Copied into a run when it starts and never changed while
//!   that run is in flight.
//! * [`ConverterConfig`] — how the [`crate::converter::Converter`] itself
//!   behaves (size limit, lossy encode quality, progress hooks). Built once via
//!   [`ConverterConfigBuilder`].

use crate::error::Pdf2ImgError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted input, in bytes (100 MB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Quality factor applied to lossy encodes (JPEG, WebP), on a 1–100 scale.
pub const DEFAULT_ENCODE_QUALITY: u8 = 90;

// ── Enums ────────────────────────────────────────────────────────────────

/// Render resolution, expressed as a percentage of the "standard" 2× render.
///
/// | Level | Scale factor |
/// |-------|--------------|
/// | 50    | 1.0×         |
/// | 75    | 1.5×         |
/// | 100   | 2.0× (default) |
/// | 150   | 3.0×         |
/// | 200   | 4.0×         |
///
/// Serialises as the bare percentage (`100`), not the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum QualityLevel {
    Q50,
    Q75,
    #[default]
    Q100,
    Q150,
    Q200,
}

impl QualityLevel {
    /// All defined levels, lowest first.
    pub const ALL: [QualityLevel; 5] = [
        QualityLevel::Q50,
        QualityLevel::Q75,
        QualityLevel::Q100,
        QualityLevel::Q150,
        QualityLevel::Q200,
    ];

    /// Map a percentage to a level. Undefined percentages fall back to 100.
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            50 => QualityLevel::Q50,
            75 => QualityLevel::Q75,
            100 => QualityLevel::Q100,
            150 => QualityLevel::Q150,
            200 => QualityLevel::Q200,
            _ => QualityLevel::Q100,
        }
    }

    pub fn percent(self) -> u32 {
        match self {
            QualityLevel::Q50 => 50,
            QualityLevel::Q75 => 75,
            QualityLevel::Q100 => 100,
            QualityLevel::Q150 => 150,
            QualityLevel::Q200 => 200,
        }
    }

    /// Viewport scale applied to each page's natural size.
    pub fn scale_factor(self) -> f32 {
        match self {
            QualityLevel::Q50 => 1.0,
            QualityLevel::Q75 => 1.5,
            QualityLevel::Q100 => 2.0,
            QualityLevel::Q150 => 3.0,
            QualityLevel::Q200 => 4.0,
        }
    }
}

impl From<QualityLevel> for u32 {
    fn from(level: QualityLevel) -> Self {
        level.percent()
    }
}

impl From<u32> for QualityLevel {
    fn from(percent: u32) -> Self {
        QualityLevel::from_percent(percent)
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Raster format of a produced page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless. (default)
    #[default]
    Png,
    Jpg,
    Webp,
}

impl OutputFormat {
    /// File extension used for archive entries, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    /// Parse a user-supplied format name (`png`, `jpg`/`jpeg`, `webp`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpg),
            "webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ── Render settings ──────────────────────────────────────────────────────

/// Per-run rendering choices.
///
/// # Example
/// ```rust
/// use pdf2image::{OutputFormat, QualityLevel, RenderSettings};
///
/// let settings = RenderSettings::builder()
///     .quality(QualityLevel::Q150)
///     .format(OutputFormat::Webp)
///     .build();
/// assert_eq!(settings.scale_factor(), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderSettings {
    pub quality: QualityLevel,
    pub format: OutputFormat,
}

impl RenderSettings {
    pub fn builder() -> RenderSettingsBuilder {
        RenderSettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Scale factor derived from [`Self::quality`].
    pub fn scale_factor(&self) -> f32 {
        self.quality.scale_factor()
    }
}

/// Builder for [`RenderSettings`].
#[derive(Debug)]
pub struct RenderSettingsBuilder {
    settings: RenderSettings,
}

impl RenderSettingsBuilder {
    pub fn quality(mut self, quality: QualityLevel) -> Self {
        self.settings.quality = quality;
        self
    }

    pub fn quality_percent(mut self, percent: u32) -> Self {
        self.settings.quality = QualityLevel::from_percent(percent);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.settings.format = format;
        self
    }

    pub fn build(self) -> RenderSettings {
        self.settings
    }
}

// ── Converter config ─────────────────────────────────────────────────────

/// Configuration for a [`crate::converter::Converter`].
///
/// Built via [`ConverterConfig::builder()`] or using
/// [`ConverterConfig::default()`].
#[derive(Clone)]
pub struct ConverterConfig {
    /// Upper bound on accepted input size. Default: 100 MB.
    pub max_file_bytes: u64,

    /// Quality factor for JPEG and WebP encodes (1–100). Default: 90.
    ///
    /// PNG output ignores this; it is always lossless.
    pub encode_quality: u8,

    /// Optional per-page progress hook.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            encode_quality: DEFAULT_ENCODE_QUALITY,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("max_file_bytes", &self.max_file_bytes)
            .field("encode_quality", &self.encode_quality)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConverterConfig {
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_bytes = bytes;
        self
    }

    pub fn encode_quality(mut self, quality: u8) -> Self {
        self.config.encode_quality = quality;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, Pdf2ImgError> {
        let c = &self.config;
        if c.max_file_bytes == 0 {
            return Err(Pdf2ImgError::InvalidConfig(
                "max_file_bytes must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&c.encode_quality) {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "encode_quality must be 1–100, got {}",
                c.encode_quality
            )));
        }
        Ok(self.config)
    }
}
