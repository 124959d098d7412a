//! Format loader: turn an [`UploadedDocument`] into ordered page images.
//!
//! | Format | Pages |
//! |--------|-------|
//! | png / jpg / jpeg | exactly one |
//! | pdf | one per PDF page, rendered at 2× ([`crate::pipeline::render`]) |
//! | docx | one per embedded image ([`crate::pipeline::docx`]) |
//! | anything else | none, and no error |
//!
//! [`load`] never fails past its boundary: a format-level failure comes back
//! as [`LoadOutcome::error`] next to an empty page list so the caller can
//! report it once.

use crate::error::FileFormatError;
use crate::pipeline::input::{DocumentFormat, UploadedDocument};
use crate::pipeline::{docx, render};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;
use tracing::{debug, info, warn};

/// An opaque RGB bitmap.
///
/// The wrapped buffer has no alpha channel by construction: every
/// constructor flattens transparency against white, because the transport
/// encoding requires an opaque 3-channel image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage(RgbImage);

impl RasterImage {
    /// Flatten any decoded image into an opaque RGB bitmap.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        if !img.color().has_alpha() {
            return Self(img.into_rgb8());
        }

        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        let mut out = RgbImage::new(width, height);
        for (x, y, px) in rgba.enumerate_pixels() {
            let [r, g, b, a] = px.0;
            out.put_pixel(x, y, Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]));
        }
        Self(out)
    }

    /// Decode PNG or JPEG bytes (format sniffed from content).
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        image::load_from_memory(bytes).map(Self::from_dynamic)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.0
    }
}

impl From<RgbImage> for RasterImage {
    fn from(img: RgbImage) -> Self {
        Self(img)
    }
}

/// Alpha-composite one channel over an opaque white background.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = channel as u32;
    let a = alpha as u32;
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// One unit of visual content sent to the recognizer.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based, in discovery order.
    pub index: usize,
    pub image: RasterImage,
}

/// What [`load`] produced: pages, or the reason there are none.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub pages: Vec<Page>,
    pub error: Option<FileFormatError>,
}

impl LoadOutcome {
    fn ok(pages: Vec<Page>) -> Self {
        Self { pages, error: None }
    }

    fn failed(error: FileFormatError) -> Self {
        Self {
            pages: Vec::new(),
            error: Some(error),
        }
    }

    /// Turn the outcome into a `Result`, surfacing the loading error if any.
    pub fn into_result(self) -> Result<Vec<Page>, FileFormatError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.pages),
        }
    }
}

/// Load every page of `document`.
///
/// `pdfium_library` overrides where the pdfium shared library is bound from;
/// it is only consulted for PDFs.
pub async fn load(document: UploadedDocument, pdfium_library: Option<&Path>) -> LoadOutcome {
    let format = document.format();
    let filename = document.filename().to_string();

    let result = match format {
        DocumentFormat::Png | DocumentFormat::Jpeg => load_image(document.bytes()),
        DocumentFormat::Pdf => {
            render::render_pdf(document.bytes().to_vec(), pdfium_library.map(Path::to_path_buf)).await
        }
        DocumentFormat::Docx => docx::extract_images(document.bytes().to_vec()).await,
        DocumentFormat::Unknown => {
            debug!("'{}' has no supported extension; no pages", filename);
            Ok(Vec::new())
        }
    };

    match result {
        Ok(pages) => {
            info!("Loaded {} page(s) from '{}' ({:?})", pages.len(), filename, format);
            LoadOutcome::ok(pages)
        }
        Err(e) => {
            warn!("Failed to load '{}': {}", filename, e);
            LoadOutcome::failed(e)
        }
    }
}

fn load_image(bytes: &[u8]) -> Result<Vec<Page>, FileFormatError> {
    let image = RasterImage::decode(bytes)?;
    debug!("Decoded image {}x{}", image.width(), image.height());
    Ok(vec![Page { index: 1, image }])
}
