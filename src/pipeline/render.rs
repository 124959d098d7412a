//! PDF rasterisation: render every page to a [`RasterImage`] via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking pool so the
//! runtime's worker threads never stall on CPU-heavy rendering.
//!
//! ## Why a fixed 2× scale?
//!
//! Pages are rendered at twice their native resolution in each direction
//! (four times the pixels). That is enough for small print to survive OCR
//! while keeping the PNG payload per request modest. It is a fixed constant,
//! not a user setting.
//!
//! pdfium wants a file path, so the bytes go to a [`tempfile::NamedTempFile`]
//! first; the file is deleted when it drops, on success and error alike.

use crate::error::FileFormatError;
use crate::pipeline::load::{Page, RasterImage};
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Linear magnification applied to every PDF page.
pub const PDF_RENDER_SCALE: f32 = 2.0;

/// Rasterise every page of a PDF, in document order, indexed from 1.
pub async fn render_pdf(
    bytes: Vec<u8>,
    pdfium_library: Option<PathBuf>,
) -> Result<Vec<Page>, FileFormatError> {
    tokio::task::spawn_blocking(move || render_pdf_blocking(&bytes, pdfium_library.as_deref()))
        .await
        .map_err(|e| FileFormatError::Task(format!("render task panicked: {}", e)))?
}

/// Blocking implementation of page rendering.
fn render_pdf_blocking(
    bytes: &[u8],
    pdfium_library: Option<&Path>,
) -> Result<Vec<Page>, FileFormatError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("docvision-")
        .suffix(".pdf")
        .tempfile()?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    let pdfium = bind_pdfium(pdfium_library)?;

    let document = pdfium
        .load_pdf_from_file(tmp.path(), None)
        .map_err(|e| FileFormatError::CorruptPdf {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let render_config = PdfRenderConfig::new().scale_page_by_factor(PDF_RENDER_SCALE);

    let mut results = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            FileFormatError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = RasterImage::from_dynamic(bitmap.as_image());
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(Page {
            index: idx + 1,
            image,
        });
    }

    Ok(results)
}

/// Bind to pdfium: an explicit library path if configured, otherwise a
/// library in the working directory, otherwise the system library.
fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, FileFormatError> {
    let bindings = match explicit {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| FileFormatError::PdfiumUnavailable(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
