//! Result types produced by a processing run.

use crate::export::{self, TableSource};
use crate::pipeline::input::DocumentFormat;
use serde::{Deserialize, Serialize};

/// What the interpreter made of one page.
///
/// Exactly one exists per page of a run and it never changes once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum OcrResult {
    /// Row/column estimate plus the untouched recognizer output.
    Stats {
        rows: usize,
        cols: usize,
        raw_text: String,
    },
    /// Markdown as returned by the recognizer.
    Markdown(String),
    /// An HTML fragment (usually a single `<table>`).
    Html(String),
    /// Plain text fallback.
    Text(String),
    /// The page failed; human-readable reason.
    Error(String),
}

impl OcrResult {
    /// Short lowercase tag, matching the serialised `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            OcrResult::Stats { .. } => "stats",
            OcrResult::Markdown(_) => "markdown",
            OcrResult::Html(_) => "html",
            OcrResult::Text(_) => "text",
            OcrResult::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OcrResult::Error(_))
    }

    /// The table source this result can be exported from, if any.
    ///
    /// Only Markdown and HTML results are offered for CSV download.
    pub fn table_source(&self) -> Option<TableSource<'_>> {
        match self {
            OcrResult::Markdown(md) => Some(TableSource::Markdown(md)),
            OcrResult::Html(html) => Some(TableSource::Html(html)),
            _ => None,
        }
    }
}

/// Result for one page of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based page index, as assigned by the loader.
    pub page_num: usize,
    pub result: OcrResult,
    /// Wall-clock time of the recognition call plus interpretation.
    pub duration_ms: u64,
}

impl PageResult {
    /// CSV bytes for this page, or None when no table can be exported.
    pub fn csv(&self) -> Option<Vec<u8>> {
        self.result.table_source().and_then(export::to_csv)
    }
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_pages: usize,
    pub succeeded_pages: usize,
    pub failed_pages: usize,
    pub total_duration_ms: u64,
}

/// Everything a run produced, in page order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutput {
    /// Name the document was uploaded under.
    pub filename: String,
    pub pages: Vec<PageResult>,
    pub stats: ProcessingStats,
}

/// Dimensions of one loaded page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub index: usize,
    pub width: u32,
    pub height: u32,
}

/// What the loader found in a document, without contacting any service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub format: DocumentFormat,
    pub pages: Vec<PageSummary>,
}
