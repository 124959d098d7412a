//! Word documents: one page per embedded image.
//!
//! A `.docx` file is a ZIP package. Its main part's relationship table,
//! `word/_rels/document.xml.rels`, lists every part the document refers to;
//! image relationships point at files under `word/media/`. Each one that
//! decodes becomes a [`Page`], in relationship-table order.
//!
//! Pages are numbered 1..N over the images that actually decode, not by their
//! position among all relationships. A skipped image leaves no gap, so the
//! page numbers (and the CSV file names derived from them) stay contiguous.
//!
//! This does **not** reconstruct page layout: text in the document body is
//! ignored and the order of images need not match where they appear
//! visually. PNG, JPEG, GIF, BMP, TIFF and WebP images are decoded; vector
//! formats (EMF, WMF, SVG) and corrupt images are skipped without failing the
//! document.

use crate::error::FileFormatError;
use crate::pipeline::load::{Page, RasterImage};
use std::io::{Read, Seek, Write};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front for one package part.
///
/// The declared size comes from the archive and is not trusted.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Relationship table of the main document part.
pub const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";

/// Extract every decodable embedded image from a Word package.
pub async fn extract_images(bytes: Vec<u8>) -> Result<Vec<Page>, FileFormatError> {
    tokio::task::spawn_blocking(move || extract_images_blocking(&bytes))
        .await
        .map_err(|e| FileFormatError::Task(format!("docx task panicked: {}", e)))?
}

fn extract_images_blocking(bytes: &[u8]) -> Result<Vec<Page>, FileFormatError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("docvision-")
        .suffix(".docx")
        .tempfile()?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    let mut archive = ZipArchive::new(tmp.reopen()?)?;

    let rels = match read_part(&mut archive, RELATIONSHIPS_PART) {
        Ok(data) => data,
        Err(ZipError::FileNotFound) => {
            return Err(FileFormatError::Relationships(format!(
                "{RELATIONSHIPS_PART} is missing"
            )))
        }
        Err(e) => return Err(e.into()),
    };
    let rels = String::from_utf8(rels)
        .map_err(|e| FileFormatError::Relationships(format!("not UTF-8: {e}")))?;

    let mut pages = Vec::new();
    for target in image_targets(&rels)? {
        let part = resolve_target(&target);
        let data = match read_part(&mut archive, &part) {
            Ok(data) => data,
            Err(e) => {
                debug!("Skipping embedded image '{}': {}", part, e);
                continue;
            }
        };
        match RasterImage::decode(&data) {
            Ok(image) => pages.push(Page {
                index: pages.len() + 1,
                image,
            }),
            Err(e) => debug!("Skipping embedded image '{}': {}", part, e),
        }
    }

    debug!("Extracted {} image(s) from Word package", pages.len());
    Ok(pages)
}

/// Targets of image relationships, in table order.
///
/// A relationship counts as an image when its type is the image relationship
/// or its target path mentions "image". External targets (linked pictures)
/// are not part of the package and are ignored.
pub(crate) fn image_targets(rels_xml: &str) -> Result<Vec<String>, FileFormatError> {
    let doc = roxmltree::Document::parse(rels_xml)
        .map_err(|e| FileFormatError::Relationships(e.to_string()))?;

    Ok(doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("Relationship"))
        .filter(|n| n.attribute("TargetMode") != Some("External"))
        .filter(|n| {
            let is_image_type = n.attribute("Type").is_some_and(|t| t.ends_with("/image"));
            let is_image_target = n.attribute("Target").is_some_and(|t| t.contains("image"));
            is_image_type || is_image_target
        })
        .filter_map(|n| n.attribute("Target"))
        .map(str::to_string)
        .collect())
}

/// Resolve a relationship target to a package part name.
///
/// Relative targets are relative to `word/`; a leading `/` is package-absolute.
pub(crate) fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts = vec!["word"];
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>, ZipError> {
    let mut file = archive.by_name(name)?;
    let mut buf = Vec::with_capacity(capacity_hint(file.size()));
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn capacity_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}
