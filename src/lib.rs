//! # docvision
//!
//! Recognise tables and page content in scanned documents with Mistral's
//! OCR and vision models.
//!
//! ## Why this crate?
//!
//! Scans, photographed forms and image-only PDFs carry no text layer, so
//! text extraction tools return nothing useful. This crate turns every page
//! into an opaque RGB image, sends it to a remote recognizer, and interprets
//! the answer for the task at hand: counting a table's rows and columns,
//! pulling the table out as Markdown, or rebuilding the page as HTML or
//! text. Tables can then be exported as CSV.
//!
//! ## Pipeline Overview
//!
//! ```text
//! png / jpg / pdf / docx
//!  │
//!  ├─ 1. Input      detect the format from the filename
//!  ├─ 2. Load       one opaque RGB page per image / PDF page / embedded picture
//!  ├─ 3. Encode     PNG → base64 data URI
//!  ├─ 4. Recognise  one request per page, sequentially
//!  ├─ 5. Interpret  mode-specific heuristics → stats / Markdown / HTML / text
//!  └─ 6. Export     first table of a page → CSV
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docvision::{process_file, ProcessingConfig, ProcessingMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessingConfig::builder()
//!         .api_key(std::env::var("MISTRAL_API_KEY")?)
//!         .mode(ProcessingMode::TableExtraction)
//!         .build()?;
//!     let output = process_file("invoice.pdf", &config).await?;
//!     for page in &output.pages {
//!         println!("page {}: {}", page.page_num, page.result.kind());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docvision` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docvision = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Backend, LanguageHint, ProcessingConfig, ProcessingConfigBuilder, ProcessingMode};
pub use error::{DocVisionError, FileFormatError, PageError, ParseError, RemoteServiceError};
pub use export::{csv_file_name, html_table_stats, to_csv, write_csv_files, TableSource};
pub use output::{
    DocumentSummary, OcrResult, PageResult, PageSummary, ProcessingOutput, ProcessingStats,
};
pub use pipeline::input::{DocumentFormat, UploadedDocument};
pub use pipeline::load::{load, LoadOutcome, Page, RasterImage};
pub use pipeline::ocr::Recognizer;
pub use process::{
    inspect, process_document, process_document_with, process_file, process_file_sync,
    process_pages,
};
pub use progress::{NoopProgressCallback, ProcessingProgressCallback, ProgressCallback};
