//! Conversion orchestrator: the explicit state machine behind the UI.
//!
//! ```text
//!            select_file ok                 convert ok
//!   Idle ──▶ Validating ──▶ Idle (+source) ──▶ Converting ──▶ Ready ──▶ Downloading
//!    ▲            │ rejected                      │ failed       ▲  │        │
//!    │            ▼                               ▼              │  │        │
//!    └──────── Idle + error ◀──────────── Idle + error          │  │        │
//!                                                                └──┴────────┘
//!                                                    (download ok / Ready + error)
//! ```
//!
//! The presentation layer never owns state. It calls the operations on
//! [`Converter`] and renders [`StateSnapshot`]s, either pulled with
//! [`Converter::snapshot`] or pushed through [`Converter::subscribe`].
//!
//! Every long-running operation takes `&mut self`, so a second `convert`,
//! `select_file` or `download` cannot start while one is awaiting. The
//! `Busy` guard additionally covers a run whose future was dropped midway;
//! [`Converter::reset`] always recovers from that. A dropped run keeps
//! rendering on its blocking thread until it finishes, but each run carries a
//! generation number and only the latest one may publish progress.

use crate::archive::{self, ArchiveArtifact};
use crate::collection::{PageCollection, PageImage};
use crate::config::{ConverterConfig, OutputFormat, QualityLevel, RenderSettings};
use crate::document::{self, FileInfo, SourceDocument};
use crate::error::{Pdf2ImgError, ValidationError};
use crate::pipeline::backend::PdfBackend;
use crate::pipeline::rasterize;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Where the orchestrator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionState {
    Idle,
    Validating,
    Converting,
    Ready,
    Downloading,
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConversionState::Idle => "idle",
            ConversionState::Validating => "validating a file",
            ConversionState::Converting => "converting",
            ConversionState::Ready => "ready",
            ConversionState::Downloading => "downloading",
        })
    }
}

/// Pages finished so far in the running conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageProgress {
    pub done: usize,
    pub total: usize,
}

/// Everything a presentation layer needs to draw the current state.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub state: ConversionState,
    pub file: Option<FileInfo>,
    pub settings: RenderSettings,
    pub pages: Vec<PageImage>,
    pub current_index: usize,
    pub error: Option<String>,
    /// Only set while converting.
    pub progress: Option<PageProgress>,
    pub zoomed: bool,
    /// The selected output format differs from the converted pages' format;
    /// a download would still pack the existing pages as they are.
    pub format_stale: bool,
}

impl StateSnapshot {
    pub fn current_page(&self) -> Option<&PageImage> {
        self.pages.get(self.current_index)
    }

    /// `"N / M"` position label, `None` when there are no pages.
    pub fn position_label(&self) -> Option<String> {
        (!self.pages.is_empty())
            .then(|| format!("{} / {}", self.current_index + 1, self.pages.len()))
    }
}

/// Owns the selected document, the page collection and the run state.
pub struct Converter {
    backend: Arc<dyn PdfBackend>,
    config: ConverterConfig,
    state: ConversionState,
    source: Option<SourceDocument>,
    settings: RenderSettings,
    pages: PageCollection,
    error: Option<String>,
    zoomed: bool,
    /// Bumped by every `convert` and `reset`.
    generation: Arc<AtomicU64>,
    snapshots: Arc<watch::Sender<StateSnapshot>>,
}

impl Converter {
    pub fn new(backend: Arc<dyn PdfBackend>, config: ConverterConfig) -> Self {
        let initial = StateSnapshot {
            state: ConversionState::Idle,
            file: None,
            settings: RenderSettings::default(),
            pages: Vec::new(),
            current_index: 0,
            error: None,
            progress: None,
            zoomed: false,
            format_stale: false,
        };
        let (tx, _rx) = watch::channel(initial);

        Self {
            backend,
            config,
            state: ConversionState::Idle,
            source: None,
            settings: RenderSettings::default(),
            pages: PageCollection::new(),
            error: None,
            zoomed: false,
            generation: Arc::new(AtomicU64::new(0)),
            snapshots: Arc::new(tx),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn state(&self) -> ConversionState {
        self.state
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_ref()
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    pub fn pages(&self) -> &PageCollection {
        &self.pages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Receive a new [`StateSnapshot`] after every mutation, including
    /// per-page progress while a conversion runs.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            state: self.state,
            file: self.source.as_ref().map(SourceDocument::info),
            settings: self.settings,
            pages: self.pages.pages().to_vec(),
            current_index: self.pages.current_index(),
            error: self.error.clone(),
            progress: None,
            zoomed: self.zoomed,
            format_stale: self
                .pages
                .format()
                .is_some_and(|format| format != self.settings.format),
        }
    }

    // ── Operations ───────────────────────────────────────────────────────

    /// Validate and record a newly picked file.
    ///
    /// Any previous document and its pages are discarded whether or not the
    /// new file is accepted.
    pub fn select_file(&mut self, file: Option<SourceDocument>) -> Result<(), Pdf2ImgError> {
        self.ensure_not_busy()?;

        self.state = ConversionState::Validating;
        self.source = None;
        self.pages.clear();
        self.error = None;
        self.zoomed = false;
        self.publish();

        let outcome = match file {
            None => Err(ValidationError::NoFile),
            Some(doc) => document::validate(Some(&doc), self.config.max_file_bytes).map(|()| doc),
        };

        self.state = ConversionState::Idle;
        match outcome {
            Ok(doc) => {
                info!(
                    "Selected '{}' ({})",
                    doc.file_name(),
                    document::format_file_size(doc.size())
                );
                self.source = Some(doc);
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!("Rejected selection: {}", e);
                self.error = Some(e.to_string());
                self.publish();
                Err(e.into())
            }
        }
    }

    /// Rasterise every page of the selected document with `settings`.
    ///
    /// On failure nothing from the run is kept, the state returns to `Idle`
    /// with the error message, and the document stays selected for a retry.
    pub async fn convert(&mut self, settings: RenderSettings) -> Result<(), Pdf2ImgError> {
        self.ensure_not_busy()?;
        let Some(source) = self.source.clone() else {
            return Err(Pdf2ImgError::NoDocument);
        };

        let start = Instant::now();
        self.settings = settings;
        self.pages.clear();
        self.error = None;
        self.zoomed = false;
        self.state = ConversionState::Converting;
        self.publish();

        let run = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let tx = Arc::clone(&self.snapshots);
        let result = rasterize::rasterize_document(
            Arc::clone(&self.backend),
            source,
            settings,
            self.config.encode_quality,
            self.config.progress_callback.clone(),
            move |done, total| {
                // Checked under the channel lock so a concurrent reset either
                // overwrites this write or is seen here.
                tx.send_if_modified(|s| {
                    if generation.load(Ordering::SeqCst) != run {
                        return false;
                    }
                    s.progress = Some(PageProgress { done, total });
                    true
                });
            },
        )
        .await;

        match result {
            Ok(images) => {
                info!(
                    "Converted {} pages in {}ms",
                    images.len(),
                    start.elapsed().as_millis()
                );
                self.pages.replace_all(images);
                self.state = ConversionState::Ready;
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!("Conversion failed: {}", e);
                self.state = ConversionState::Idle;
                self.error = Some(e.to_string());
                self.publish();
                Err(e)
            }
        }
    }

    /// Remove the current page. No-op unless `Ready`.
    ///
    /// Deleting the last remaining page returns to `Idle`; the document stays
    /// selected so it can be converted again.
    pub fn delete_page(&mut self) -> Option<PageImage> {
        if self.state != ConversionState::Ready {
            return None;
        }

        let removed = self.pages.delete_current()?;
        debug!(
            "Deleted page {} ({} left)",
            removed.page_number,
            self.pages.len()
        );
        if self.pages.is_empty() {
            self.state = ConversionState::Idle;
            self.zoomed = false;
        }
        self.publish();
        Some(removed)
    }

    /// Point at `index`, clamped to the collection.
    pub fn set_current(&mut self, index: usize) {
        self.pages.set_current(index);
        self.publish();
    }

    pub fn next_page(&mut self) {
        self.pages.next();
        self.publish();
    }

    pub fn previous_page(&mut self) {
        self.pages.previous();
        self.publish();
    }

    /// Change the settings used by the *next* conversion.
    ///
    /// Pages that already exist keep the format and quality they were
    /// rendered with; nothing is re-encoded.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
        self.publish();
    }

    pub fn set_quality(&mut self, quality: QualityLevel) {
        self.set_settings(RenderSettings {
            quality,
            ..self.settings
        });
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.set_settings(RenderSettings {
            format,
            ..self.settings
        });
    }

    pub fn set_zoom(&mut self, zoomed: bool) {
        self.zoomed = zoomed && !self.pages.is_empty();
        self.publish();
    }

    /// Pack the current pages into a zip archive.
    ///
    /// Non-destructive: the collection is untouched and the call can be
    /// repeated. A packing failure leaves the state `Ready` with the error.
    pub async fn download(&mut self) -> Result<ArchiveArtifact, Pdf2ImgError> {
        self.ensure_not_busy()?;
        if self.state != ConversionState::Ready {
            return Err(Pdf2ImgError::InvalidState {
                operation: "download",
                state: self.state.to_string(),
            });
        }
        if self.pages.is_empty() {
            return Err(Pdf2ImgError::EmptyCollection);
        }

        let base_name = self
            .source
            .as_ref()
            .map(SourceDocument::base_name)
            .unwrap_or_else(|| "document".to_string());
        let images = self.pages.pages().to_vec();

        self.state = ConversionState::Downloading;
        self.error = None;
        self.publish();

        let result = tokio::task::spawn_blocking(move || archive::pack(&images, &base_name))
            .await
            .map_err(|e| Pdf2ImgError::Archive {
                detail: format!("archive task failed: {}", e),
            })
            .and_then(|packed| packed);

        self.state = ConversionState::Ready;
        match result {
            Ok(artifact) => {
                self.publish();
                Ok(artifact)
            }
            Err(e) => {
                warn!("Download failed: {}", e);
                self.error = Some(e.to_string());
                self.publish();
                Err(e)
            }
        }
    }

    /// Forget the document, pages, settings and transient flags.
    pub fn reset(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state = ConversionState::Idle;
        self.source = None;
        self.pages.clear();
        self.settings = RenderSettings::default();
        self.error = None;
        self.zoomed = false;
        self.publish();
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn ensure_not_busy(&self) -> Result<(), Pdf2ImgError> {
        match self.state {
            ConversionState::Converting | ConversionState::Downloading => Err(Pdf2ImgError::Busy {
                state: self.state.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("state", &self.state)
            .field("source", &self.source)
            .field("settings", &self.settings)
            .field("pages", &self.pages.len())
            .field("error", &self.error)
            .finish()
    }
}
