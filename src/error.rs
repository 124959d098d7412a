//! Error types for the docvision library.
//!
//! The taxonomy follows the unit of work each failure affects:
//!
//! * [`DocVisionError`] — **Fatal** for a run: the input could not be
//!   accepted, the configuration is unusable, or loading the document
//!   failed. Returned as `Err(DocVisionError)` from the `process*` entry
//!   points.
//!
//! * [`FileFormatError`] — a per-format loading failure (corrupt image, PDF
//!   pdfium cannot open, DOCX package without relationships). The loader
//!   reports it once next to an empty page list.
//!
//! * [`RemoteServiceError`] — anything that went wrong talking to the OCR
//!   service. Auth, quota, network and malformed responses are deliberately
//!   not told apart: none of them is retried.
//!
//! * [`ParseError`] — the interpreter or exporter could not find the
//!   structure it was looking for.
//!
//! * [`PageError`] — **Non-fatal**: a single page's recognition failed. Its
//!   message becomes [`crate::output::OcrResult::Error`] for that page only;
//!   interpretation itself never fails because every heuristic has a
//!   plain-text fallback.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docvision library.
#[derive(Debug, Error)]
pub enum DocVisionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload boundary only accepts png, jpg, jpeg, pdf and docx.
    #[error("Unsupported file type '{extension}' for '{filename}'\nSupported: png, jpg, jpeg, pdf, docx")]
    UnsupportedFormat { filename: String, extension: String },

    /// The document was accepted but could not be turned into pages.
    #[error("Could not load '{filename}': {source}")]
    Load {
        filename: String,
        #[source]
        source: FileFormatError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file (CSV export).
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A loading failure for one uploaded document.
#[derive(Debug, Error)]
pub enum FileFormatError {
    /// The image bytes could not be decoded.
    #[error("image could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    /// pdfium refused to open the document.
    #[error("PDF could not be opened: {detail}")]
    CorruptPdf { detail: String },

    /// pdfium failed while rasterising one page.
    #[error("rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// No pdfium shared library could be bound.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Place libpdfium next to the executable, install it system-wide,\n\
or point --pdfium-lib at an existing copy."
    )]
    PdfiumUnavailable(String),

    /// The DOCX file is not a readable ZIP package.
    #[error("Word package could not be read: {0}")]
    Package(#[from] zip::result::ZipError),

    /// The DOCX relationship table is missing or not valid XML.
    #[error("Word relationships could not be parsed: {0}")]
    Relationships(String),

    /// Scratch file handling failed.
    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking rasterisation task did not complete.
    #[error("loader task failed: {0}")]
    Task(String),
}

/// Any failure of a single recognition call.
#[derive(Debug, Error)]
pub enum RemoteServiceError {
    /// The page image could not be PNG-encoded for transport.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// The request never produced an HTTP response (DNS, TLS, timeout, …).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status (401, 429, 5xx, …).
    #[error("OCR service returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed OCR response: {0}")]
    MalformedResponse(String),
}

/// A heuristic parse that found nothing usable.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No table could be located in the text.
    #[error("no table found")]
    NoTable,

    /// A table was found but has no cells at all.
    #[error("table is empty")]
    EmptyTable,

    /// Serialising the table as CSV failed.
    #[error("CSV serialisation failed: {0}")]
    Csv(#[from] csv::Error),
}

/// A non-fatal error for a single page.
///
/// Produced at the page boundary and rendered as the page's
/// [`crate::output::OcrResult::Error`] message; the remaining pages keep
/// processing.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Page {page}: OCR request failed: {detail}")]
pub struct PageError {
    pub page: usize,
    pub detail: String,
}

impl PageError {
    pub fn remote(page: usize, err: &RemoteServiceError) -> Self {
        PageError {
            page,
            detail: err.to_string(),
        }
    }
}
