//! Configuration types for a document-processing run.
//!
//! Everything a run depends on (API credential, language hints, processing
//! mode, backend) lives in [`ProcessingConfig`] and is passed
//! explicitly into [`crate::process`]. The library never reads process
//! environment; the CLI maps its flags and env vars onto the builder.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest, and gives one place to validate.

use crate::error::DocVisionError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default Mistral API root.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Model used by the dedicated OCR endpoint.
pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-latest";

/// Vision-capable chat model used by [`Backend::Vision`].
pub const DEFAULT_VISION_MODEL: &str = "pixtral-12b-2409";

/// Configuration for one processing run.
///
/// Built via [`ProcessingConfig::builder()`]. [`ProcessingConfig::default()`]
/// carries no credential and is only suitable for [`crate::inspect`].
///
/// # Example
/// ```rust
/// use docvision::{LanguageHint, ProcessingConfig, ProcessingMode};
///
/// let config = ProcessingConfig::builder()
///     .api_key("sk-test")
///     .mode(ProcessingMode::TableExtraction)
///     .languages(LanguageHint::parse("English, Hindi"))
///     .build()
///     .unwrap();
/// assert_eq!(config.languages.len(), 2);
/// ```
#[derive(Clone)]
pub struct ProcessingConfig {
    /// API credential. Required for any processing; `build()` rejects empty.
    pub api_key: String,

    /// Languages hinted to the recognizer. Empty means auto-detect.
    pub languages: LanguageHint,

    /// What to extract from every page of the run. Default: table extraction.
    pub mode: ProcessingMode,

    /// Which remote endpoint performs recognition. Default: [`Backend::Ocr`].
    pub backend: Backend,

    /// Model identifier. If None, uses the backend default
    /// ([`DEFAULT_OCR_MODEL`] or [`DEFAULT_VISION_MODEL`]).
    pub model: Option<String>,

    /// API root, without trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// A full-page OCR call on a dense 2× render routinely takes tens of
    /// seconds. Nothing is retried when it expires; the page reports an error.
    pub api_timeout_secs: u64,

    /// Explicit pdfium shared library to bind for PDF rasterisation.
    /// If None, the loader tries the working directory, then the system.
    pub pdfium_library_path: Option<PathBuf>,

    /// Optional progress callback for per-page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            languages: LanguageHint::default(),
            mode: ProcessingMode::default(),
            backend: Backend::default(),
            model: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_timeout_secs: 120,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("languages", &self.languages)
            .field("mode", &self.mode)
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ProcessingProgressCallback>"),
            )
            .finish()
    }
}

impl ProcessingConfig {
    /// Create a new builder for `ProcessingConfig`.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the constraints `build()` enforces.
    ///
    /// Processing entry points call this too, so a hand-assembled or
    /// `Default` config without a credential is rejected before any page is
    /// loaded.
    pub fn validate(&self) -> Result<(), DocVisionError> {
        if self.api_key.trim().is_empty() {
            return Err(DocVisionError::InvalidConfig(
                "an API key is required to process documents".into(),
            ));
        }
        if self.api_timeout_secs == 0 {
            return Err(DocVisionError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(DocVisionError::InvalidConfig("base URL must not be empty".into()));
        }
        Ok(())
    }

    /// The model to send, falling back to the backend default.
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }
}

/// Builder for [`ProcessingConfig`].
#[derive(Debug)]
pub struct ProcessingConfigBuilder {
    config: ProcessingConfig,
}

impl ProcessingConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn languages(mut self, languages: LanguageHint) -> Self {
        self.config.languages = languages;
        self
    }

    pub fn mode(mut self, mode: ProcessingMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessingConfig, DocVisionError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What a run extracts from each page.
///
/// Chosen once per run and applied uniformly to every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// Estimate the row/column count of the main table.
    StructureAnalysis,
    /// Return the recognised Markdown table as-is. (default)
    #[default]
    TableExtraction,
    /// Reproduce the page layout: HTML for tables, plain text otherwise.
    FullPageReconstruction,
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessingMode::StructureAnalysis => "Structure Analysis",
            ProcessingMode::TableExtraction => "Table Extraction",
            ProcessingMode::FullPageReconstruction => "Full Page Reconstruction",
        })
    }
}

/// Remote endpoint used for recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backend {
    /// Dedicated OCR endpoint (`/v1/ocr`). Returns Markdown per page; it has
    /// no instruction field, so the mode prompt does not reach the model.
    #[default]
    Ocr,
    /// Vision chat endpoint (`/v1/chat/completions`); the mode prompt is
    /// sent alongside the image.
    Vision,
}

impl Backend {
    pub fn default_model(&self) -> &'static str {
        match self {
            Backend::Ocr => DEFAULT_OCR_MODEL,
            Backend::Vision => DEFAULT_VISION_MODEL,
        }
    }
}

/// Ordered list of language names hinted to the recognizer.
///
/// Parsed from user input like `"English, Hindi"`: entries are trimmed and
/// empty entries dropped; no other deduplication happens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageHint(Vec<String>);

impl LanguageHint {
    /// Parse a comma-separated list.
    pub fn parse(input: &str) -> Self {
        Self(
            input
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// An empty hint list: auto-detect.
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for LanguageHint {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}
