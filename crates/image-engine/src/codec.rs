//! Upload decoding and PNG export.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::{EngineError, Result};

/// File name offered for the downloaded composite.
pub const DOWNLOAD_FILENAME: &str = "custom_qr_with_background.png";
pub const DOWNLOAD_MIME: &str = "image/png";

/// Decode an uploaded PNG or JPEG into RGBA.
///
/// The format is sniffed from the bytes, never from a file name.
pub fn decode_upload(bytes: &[u8]) -> Result<RgbaImage> {
    let format = image::guess_format(bytes).map_err(|_| EngineError::UnsupportedFormat)?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(EngineError::UnsupportedFormat);
    }

    let img = image::load_from_memory_with_format(bytes, format)?.to_rgba8();
    debug!(
        ?format,
        width = img.width(),
        height = img.height(),
        "Decoded uploaded image"
    );
    Ok(img)
}

/// Serialize `img` as an in-memory PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba};

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(16, 9, |x, y| Rgba([x as u8 * 10, y as u8 * 20, 128, 255]))
    }

    #[test]
    fn encode_png_writes_png_signature() {
        let png = encode_png(&sample()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decode_upload_reads_png_back() {
        let img = sample();
        let decoded = decode_upload(&encode_png(&img).unwrap()).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn decode_upload_accepts_jpeg_and_converts_to_rgba() {
        let rgb = DynamicImage::ImageRgba8(sample()).to_rgb8();
        let mut buf = Cursor::new(Vec::new());
        rgb.write_to(&mut buf, ImageFormat::Jpeg).unwrap();

        let decoded = decode_upload(buf.get_ref()).unwrap();
        assert_eq!(decoded.dimensions(), (16, 9));
        assert!(decoded.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn decode_upload_rejects_other_formats() {
        let mut buf = Cursor::new(Vec::new());
        sample().write_to(&mut buf, ImageFormat::Bmp).unwrap();
        assert!(matches!(
            decode_upload(buf.get_ref()),
            Err(EngineError::UnsupportedFormat)
        ));
        assert!(matches!(
            decode_upload(b"definitely not an image"),
            Err(EngineError::UnsupportedFormat)
        ));
    }

    #[test]
    fn decode_upload_reports_truncated_png() {
        let png = encode_png(&sample()).unwrap();
        let err = decode_upload(&png[..40]).unwrap_err();
        assert!(matches!(err, EngineError::Image(_)));
    }
}
