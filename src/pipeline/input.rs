//! Upload boundary: accept one file and classify it by extension.
//!
//! Only `png`, `jpg`, `jpeg`, `pdf` and `docx` get past
//! [`UploadedDocument::from_path`] / [`UploadedDocument::from_bytes`];
//! anything else is rejected here, before the loader sees it. The loader
//! itself still copes with [`DocumentFormat::Unknown`] by producing no pages,
//! for callers that build an [`UploadedDocument`] by hand.

use crate::error::DocVisionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Container format of an upload, derived from its declared extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Png,
    Jpeg,
    Pdf,
    Docx,
    /// Anything else; loads as zero pages.
    Unknown,
}

impl DocumentFormat {
    /// Classify a file extension, case-insensitively, with or without dot.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => DocumentFormat::Png,
            "jpg" | "jpeg" => DocumentFormat::Jpeg,
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            _ => DocumentFormat::Unknown,
        }
    }

    /// Classify a filename by its extension.
    pub fn from_filename(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(DocumentFormat::Unknown)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, DocumentFormat::Png | DocumentFormat::Jpeg)
    }
}

/// Raw bytes of one upload plus the name it was declared under.
///
/// Immutable once built; consumed by [`crate::pipeline::load::load`].
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    filename: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Build from in-memory bytes, validating the declared extension.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocVisionError> {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename);
        if format == DocumentFormat::Unknown {
            let extension = Path::new(&filename)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string();
            return Err(DocVisionError::UnsupportedFormat { filename, extension });
        }
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }

    /// Build without extension validation. Unknown formats load as no pages.
    pub fn new_unchecked(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename);
        Self {
            filename,
            format,
            bytes,
        }
    }

    /// Read a local file, validating existence, permissions and extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DocVisionError> {
        let path = path.as_ref();
        let bytes = read_local(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Read {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(filename, bytes)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

async fn read_local(path: &Path) -> Result<Vec<u8>, DocVisionError> {
    let owned = PathBuf::from(path);
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(DocVisionError::PermissionDenied { path: owned })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DocVisionError::FileNotFound { path: owned })
        }
        Err(e) => Err(DocVisionError::Internal(format!(
            "failed to read '{}': {}",
            owned.display(),
            e
        ))),
    }
}
