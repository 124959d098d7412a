//! Processing entry points.
//!
//! A run loads the document once, then walks its pages strictly in order:
//! one recognition request per page, each answer interpreted under the
//! run's mode. A failed page becomes an [`OcrResult::Error`] in its slot and
//! the loop moves on, so the output always holds exactly one result per
//! loaded page.
//!
//! Only three things stop a run: a configuration that cannot work (no
//! credential), an input that cannot be read, and a document whose format
//! loader failed. All of them happen before the first page is sent.

use crate::config::{LanguageHint, ProcessingConfig, ProcessingMode};
use crate::error::{DocVisionError, PageError};
use crate::output::{
    DocumentSummary, OcrResult, PageResult, PageSummary, ProcessingOutput, ProcessingStats,
};
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::interpret::interpret_for_backend;
use crate::pipeline::load::{self, Page};
use crate::pipeline::ocr::{build_recognizer, Recognizer};
use crate::progress::ProgressCallback;
use crate::prompts::build_prompt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process an uploaded document end to end.
///
/// # Errors
/// Returns `Err(DocVisionError)` only for fatal errors:
/// - Missing credential or otherwise invalid configuration
/// - The format loader failed ([`DocVisionError::Load`])
///
/// Per-page recognition failures are reported inside the output instead
/// (check `output.stats.failed_pages`).
pub async fn process_document(
    document: UploadedDocument,
    config: &ProcessingConfig,
) -> Result<ProcessingOutput, DocVisionError> {
    config.validate()?;
    let recognizer = build_recognizer(config)?;
    process_document_with(recognizer.as_ref(), document, config).await
}

/// Like [`process_document`], with a caller-supplied recognizer.
///
/// The credential in `config` is not checked; the recognizer is assumed to
/// be usable as given.
pub async fn process_document_with(
    recognizer: &dyn Recognizer,
    document: UploadedDocument,
    config: &ProcessingConfig,
) -> Result<ProcessingOutput, DocVisionError> {
    let run_start = Instant::now();
    let filename = document.filename().to_string();
    info!(
        "Processing '{}' ({} mode, {} backend)",
        filename,
        config.mode,
        recognizer.name()
    );

    let pages = load_pages(document, config).await?;

    let progress = config.progress_callback.as_ref();
    if let Some(cb) = progress {
        cb.on_run_start(pages.len());
    }

    let results = process_pages(recognizer, &pages, config.mode, &config.languages, progress).await;

    let succeeded = results.iter().filter(|r| !r.result.is_error()).count();
    let stats = ProcessingStats {
        total_pages: results.len(),
        succeeded_pages: succeeded,
        failed_pages: results.len() - succeeded,
        total_duration_ms: run_start.elapsed().as_millis() as u64,
    };

    info!(
        "Run complete: {}/{} pages, {}ms total",
        stats.succeeded_pages, stats.total_pages, stats.total_duration_ms
    );
    if let Some(cb) = progress {
        cb.on_run_complete(stats.total_pages, stats.succeeded_pages);
    }

    Ok(ProcessingOutput {
        filename,
        pages: results,
        stats,
    })
}

/// Recognise and interpret `pages` one at a time, in order.
///
/// Always returns exactly one [`PageResult`] per input page.
pub async fn process_pages(
    recognizer: &dyn Recognizer,
    pages: &[Page],
    mode: ProcessingMode,
    languages: &LanguageHint,
    progress: Option<&ProgressCallback>,
) -> Vec<PageResult> {
    let total = pages.len();
    let prompt = build_prompt(mode, languages);
    let backend = recognizer.backend();
    let mut results = Vec::with_capacity(total);

    for page in pages {
        if let Some(cb) = progress {
            cb.on_page_start(page.index, total);
        }

        let start = Instant::now();
        let result = match recognizer.recognize(&page.image, &prompt).await {
            Ok(raw) => {
                debug!("Page {}: {} chars recognised", page.index, raw.len());
                interpret_for_backend(&raw, mode, backend)
            }
            Err(e) => {
                let err = PageError::remote(page.index, &e);
                warn!("{}", err);
                OcrResult::Error(err.to_string())
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        if let Some(cb) = progress {
            match &result {
                OcrResult::Error(msg) => cb.on_page_error(page.index, total, msg),
                ok => cb.on_page_complete(page.index, total, ok.kind()),
            }
        }

        results.push(PageResult {
            page_num: page.index,
            result,
            duration_ms,
        });
    }

    results
}

/// Read a file from disk and process it.
pub async fn process_file(
    path: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<ProcessingOutput, DocVisionError> {
    config.validate()?;
    let document = UploadedDocument::from_path(path).await?;
    process_document(document, config).await
}

/// Synchronous wrapper around [`process_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_file_sync(
    path: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<ProcessingOutput, DocVisionError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocVisionError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_file(path, config))
}

/// Load a document and describe its pages without recognising anything.
///
/// Does not require an API key.
pub async fn inspect(
    document: UploadedDocument,
    config: &ProcessingConfig,
) -> Result<DocumentSummary, DocVisionError> {
    let filename = document.filename().to_string();
    let format = document.format();
    let pages = load_pages(document, config).await?;

    Ok(DocumentSummary {
        filename,
        format,
        pages: pages
            .iter()
            .map(|p| PageSummary {
                index: p.index,
                width: p.image.width(),
                height: p.image.height(),
            })
            .collect(),
    })
}

async fn load_pages(
    document: UploadedDocument,
    config: &ProcessingConfig,
) -> Result<Vec<Page>, DocVisionError> {
    let filename = document.filename().to_string();
    load::load(document, config.pdfium_library_path.as_deref())
        .await
        .into_result()
        .map_err(|source| DocVisionError::Load { filename, source })
}
