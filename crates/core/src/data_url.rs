//! Decoding of `data:` URLs carrying client-generated thumbnails.
//!
//! Browsers produce these from `canvas.toDataURL("image/jpeg", ...)`. Only
//! base64 payloads are accepted, and the decoded bytes must sniff as one of
//! the supported image formats regardless of the declared MIME type.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;

use crate::error::CoreError;

/// Largest decoded thumbnail accepted (5 MiB).
pub const MAX_THUMBNAIL_BYTES: usize = 5 * 1024 * 1024;

/// Image formats accepted as thumbnails.
const SUPPORTED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// A decoded, format-checked image payload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// MIME type declared in the URL header (may be empty).
    pub declared_mime: String,
    /// Format detected from the payload's magic bytes.
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// MIME type derived from the detected format.
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// The image as JPEG. JPEG payloads pass through untouched; PNG and WebP
    /// are decoded and re-encoded, dropping any alpha channel.
    pub fn into_jpeg(self) -> Result<Vec<u8>, CoreError> {
        if self.format == ImageFormat::Jpeg {
            return Ok(self.bytes);
        }
        let decoded = image::load_from_memory_with_format(&self.bytes, self.format)
            .map_err(|e| CoreError::Validation(format!("Thumbnail could not be decoded: {e}")))?;

        let mut jpeg = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(decoded.to_rgb8())
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .map_err(|e| CoreError::Validation(format!("Thumbnail could not be encoded: {e}")))?;
        Ok(jpeg.into_inner())
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL into image bytes.
pub fn decode_image_data_url(url: &str) -> Result<DecodedImage, CoreError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CoreError::Validation("Thumbnail must be a data: URL".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoreError::Validation("Malformed data URL: missing ','".into()))?;

    let declared_mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CoreError::Validation("Only base64 data URLs are supported".into()))?
        .to_string();

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CoreError::Validation(format!("Invalid base64 payload: {e}")))?;

    if bytes.is_empty() {
        return Err(CoreError::Validation("Thumbnail payload is empty".into()));
    }
    if bytes.len() > MAX_THUMBNAIL_BYTES {
        return Err(CoreError::Validation(format!(
            "Thumbnail exceeds {}",
            crate::format::format_file_size(MAX_THUMBNAIL_BYTES as u64)
        )));
    }

    let format = image::guess_format(&bytes)
        .ok()
        .filter(|f| SUPPORTED_FORMATS.contains(f))
        .ok_or_else(|| {
            CoreError::Validation("Thumbnail must be a JPEG, PNG or WebP image".into())
        })?;

    Ok(DecodedImage {
        declared_mime,
        format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn decodes_jpeg() {
        let decoded = decode_image_data_url(&data_url("image/jpeg", JPEG_MAGIC)).unwrap();
        assert_eq!(decoded.format, ImageFormat::Jpeg);
        assert_eq!(decoded.content_type(), "image/jpeg");
        assert_eq!(decoded.declared_mime, "image/jpeg");
        assert_eq!(decoded.bytes, JPEG_MAGIC);
    }

    #[test]
    fn detects_format_from_payload_not_header() {
        let decoded = decode_image_data_url(&data_url("image/jpeg", PNG_MAGIC)).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn png_is_transcoded_to_jpeg() {
        let mut png = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(6, 4, image::Rgba([200, 10, 10, 128]))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();

        let decoded = decode_image_data_url(&data_url("image/png", png.get_ref())).unwrap();
        let jpeg = decoded.into_jpeg().unwrap();

        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let reloaded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (6, 4));
    }

    #[test]
    fn jpeg_passes_through_and_broken_png_is_rejected() {
        let jpeg = decode_image_data_url(&data_url("image/jpeg", JPEG_MAGIC)).unwrap();
        assert_eq!(jpeg.into_jpeg().unwrap(), JPEG_MAGIC);

        // Right magic, no image behind it.
        let png = decode_image_data_url(&data_url("image/png", PNG_MAGIC)).unwrap();
        assert_matches!(png.into_jpeg(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_non_data_urls() {
        assert_matches!(
            decode_image_data_url("https://example.com/a.jpg"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_non_base64_and_missing_comma() {
        assert!(decode_image_data_url("data:image/jpeg,rawbytes").is_err());
        assert!(decode_image_data_url("data:image/jpeg;base64").is_err());
        assert!(decode_image_data_url("data:image/jpeg;base64,!!!").is_err());
    }

    #[test]
    fn rejects_unsupported_payload() {
        let err = decode_image_data_url(&data_url("image/jpeg", b"plain text")).unwrap_err();
        assert!(err.to_string().contains("JPEG, PNG or WebP"));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(decode_image_data_url("data:image/png;base64,").is_err());
    }
}
