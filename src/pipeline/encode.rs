//! Image encoding: [`RasterImage`] → base64 PNG data URI.
//!
//! Both Mistral endpoints accept an image as a `data:` URI inside the JSON
//! request body. PNG is lossless, so rendered text stays crisp; JPEG
//! artefacts around glyphs hurt recognition accuracy.

use crate::pipeline::load::RasterImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::io::Cursor;
use tracing::debug;

/// PNG-encode an opaque page image and wrap it as `data:image/png;base64,…`.
pub fn encode_data_uri(img: &RasterImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.as_rgb()
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(format!("data:image/png;base64,{b64}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn encode_small_image() {
        let img = RasterImage::from(RgbImage::from_pixel(10, 10, Rgb([255, 0, 0])));
        let uri = encode_data_uri(&img).expect("encode should succeed");

        let b64 = uri
            .strip_prefix("data:image/png;base64,")
            .expect("data URI prefix");
        let decoded = STANDARD.decode(b64).expect("valid base64");

        let back = image::load_from_memory_with_format(&decoded, ImageFormat::Png).unwrap();
        assert_eq!((back.width(), back.height()), (10, 10));
        assert!(!back.color().has_alpha());
    }
}
