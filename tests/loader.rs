//! Integration tests for the format loader.
//!
//! Images and Word packages are generated in memory. The PDF test needs a
//! pdfium library; without one it prints SKIP and passes.

mod common;

use docvision::{load, DocVisionError, DocumentFormat, FileFormatError, UploadedDocument};
use image::Rgb;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn png_is_one_opaque_page() {
    let doc = UploadedDocument::from_bytes("scan.png", common::transparent_png_bytes()).unwrap();
    let pages = load(doc, None).await.into_result().unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].index, 1);
    let rgb = pages[0].image.as_rgb();
    assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 255]));
    assert_eq!(*rgb.get_pixel(1, 1), Rgb([10, 10, 10]));
}

#[tokio::test]
async fn jpeg_is_one_page() {
    let doc = UploadedDocument::from_bytes("photo.JPG", common::jpeg_bytes(32, 16)).unwrap();
    assert_eq!(doc.format(), DocumentFormat::Jpeg);

    let pages = load(doc, None).await.into_result().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!((pages[0].image.width(), pages[0].image.height()), (32, 16));
}

#[tokio::test]
async fn corrupt_image_reports_one_error() {
    let doc = UploadedDocument::from_bytes("broken.png", b"not a png".to_vec()).unwrap();
    let outcome = load(doc, None).await;

    assert!(outcome.pages.is_empty());
    assert!(matches!(outcome.error, Some(FileFormatError::Image(_))));
}

#[tokio::test]
async fn docx_skips_undecodable_images() {
    let bytes = common::docx_bytes(&[
        ("image1.png", common::png_bytes(10, 20)),
        ("image2.emf", b"\x01\x00\x00\x00 not a raster".to_vec()),
        ("image3.jpeg", common::jpeg_bytes(30, 40)),
    ]);
    let doc = UploadedDocument::from_bytes("form.docx", bytes).unwrap();
    let pages = load(doc, None).await.into_result().unwrap();

    let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!((pages[0].image.width(), pages[0].image.height()), (10, 20));
    assert_eq!((pages[1].image.width(), pages[1].image.height()), (30, 40));
}

#[tokio::test]
async fn docx_loads_gif_alongside_png() {
    let bytes = common::docx_bytes(&[
        ("image1.gif", common::gif_bytes(6, 9)),
        ("image2.png", common::png_bytes(10, 20)),
    ]);
    let doc = UploadedDocument::from_bytes("scans.docx", bytes).unwrap();
    let pages = load(doc, None).await.into_result().unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!((pages[0].image.width(), pages[0].image.height()), (6, 9));
    assert_eq!((pages[1].image.width(), pages[1].image.height()), (10, 20));
}

#[tokio::test]
async fn docx_without_images_has_no_pages() {
    let doc = UploadedDocument::from_bytes("memo.docx", common::docx_bytes(&[])).unwrap();
    let outcome = load(doc, None).await;
    assert!(outcome.error.is_none());
    assert!(outcome.pages.is_empty());
}

#[tokio::test]
async fn unsupported_extension_rejected_at_boundary() {
    let err = UploadedDocument::from_bytes("notes.txt", b"hello".to_vec()).unwrap_err();
    assert!(
        matches!(err, DocVisionError::UnsupportedFormat { ref extension, .. } if extension == "txt"),
        "got: {err}"
    );
}

#[tokio::test]
async fn unknown_format_loads_nothing() {
    let doc = UploadedDocument::new_unchecked("notes.txt", b"hello".to_vec());
    let outcome = load(doc, None).await;
    assert!(outcome.error.is_none());
    assert!(outcome.pages.is_empty());
}

#[tokio::test]
async fn missing_file_is_reported() {
    let err = UploadedDocument::from_path("/definitely/not/here.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, DocVisionError::FileNotFound { .. }), "got: {err}");
}

#[tokio::test]
async fn pdf_renders_every_page_at_twice_size() {
    let doc = UploadedDocument::from_bytes("blank.pdf", common::pdf_bytes(3)).unwrap();
    let outcome = load(doc, None).await;

    if let Some(FileFormatError::PdfiumUnavailable(detail)) = &outcome.error {
        println!("SKIP — no pdfium library could be bound: {detail}");
        return;
    }

    let pages = outcome.into_result().unwrap();
    let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    for page in &pages {
        assert_eq!((page.image.width(), page.image.height()), (200, 100));
    }
}
