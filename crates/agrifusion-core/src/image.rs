//! Leaf image validation and base64 encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::validation::ValidationFailure;

/// Largest accepted image, in bytes (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Image container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Parses a declared MIME type, case-insensitively.
    ///
    /// `image/jpg` is accepted as an alias for `image/jpeg`. Parameters such
    /// as `; charset=binary` are ignored.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// A user-selected image, exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Size reported by whoever supplied the asset.
    pub size: u64,
}

impl ImageAsset {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let size = bytes.len() as u64;
        Self {
            bytes,
            mime_type: mime_type.into(),
            size,
        }
    }

    /// Overrides the reported size.
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// The size checked against [`MAX_IMAGE_BYTES`].
    ///
    /// A declared size smaller than the actual content never hides an
    /// oversized payload.
    pub fn effective_size(&self) -> u64 {
        self.size.max(self.bytes.len() as u64)
    }
}

/// Base64 text of an accepted image, without any data-URI prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: ImageFormat,
    data: String,
}

impl EncodedImage {
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn into_string(self) -> String {
        self.data
    }

    /// A `data:` URI for previews. Never sent to the service.
    pub fn preview_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data)
    }
}

/// Validates `asset` and encodes its bytes.
pub fn encode_image(asset: &ImageAsset) -> Result<EncodedImage, ValidationFailure> {
    let format = ImageFormat::from_mime(&asset.mime_type).ok_or_else(|| {
        ValidationFailure::UnsupportedFormat {
            mime_type: asset.mime_type.clone(),
        }
    })?;

    let size = asset.effective_size();
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationFailure::TooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }

    let data = BASE64_STANDARD.encode(&asset.bytes);
    tracing::debug!(
        "[Image] Encoded {} bytes of {} into {} characters",
        asset.bytes.len(),
        format.mime_type(),
        data.len()
    );

    Ok(EncodedImage { format, data })
}

/// Removes a leading `data:<mime>;base64,` prefix, if present.
pub fn strip_data_uri_prefix(text: &str) -> &str {
    if text.starts_with("data:")
        && let Some((header, payload)) = text.split_once(',')
        && header.ends_with(";base64")
    {
        return payload;
    }
    text
}

/// Decodes base64 image text back into bytes.
pub fn decode_image(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_STANDARD.decode(strip_data_uri_prefix(text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(len: usize) -> ImageAsset {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(len, 0x5A);
        ImageAsset::new(bytes, "image/jpeg")
    }

    #[test]
    fn test_mime_parsing_is_case_insensitive() {
        assert_eq!(ImageFormat::from_mime("image/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("Image/Jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::from_mime("image/jpeg; charset=binary"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_mime("image/gif"), None);
        assert_eq!(ImageFormat::from_mime("image/png-ish"), None);
        assert_eq!(ImageFormat::from_mime(""), None);
    }

    #[test]
    fn test_rejects_unsupported_format() {
        let asset = ImageAsset::new(b"GIF89a".to_vec(), "image/gif");
        assert_eq!(
            encode_image(&asset),
            Err(ValidationFailure::UnsupportedFormat {
                mime_type: "image/gif".to_string()
            })
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let at_limit = jpeg(MAX_IMAGE_BYTES as usize);
        assert!(encode_image(&at_limit).is_ok());

        let over = jpeg(MAX_IMAGE_BYTES as usize + 1);
        assert_eq!(
            encode_image(&over),
            Err(ValidationFailure::TooLarge {
                size: MAX_IMAGE_BYTES + 1,
                limit: MAX_IMAGE_BYTES
            })
        );
    }

    #[test]
    fn test_declared_size_is_checked() {
        let asset = jpeg(1024).with_declared_size(11 * 1024 * 1024);
        assert!(matches!(
            encode_image(&asset),
            Err(ValidationFailure::TooLarge { .. })
        ));
    }

    #[test]
    fn test_encoding_has_no_prefix_and_is_deterministic() {
        let asset = jpeg(50 * 1024);
        let first = encode_image(&asset).unwrap();
        let second = encode_image(&asset).unwrap();

        assert_eq!(first, second);
        assert!(!first.as_str().starts_with("data:"));
        assert!(first.as_str().starts_with("/9j/"));
    }

    #[test]
    fn test_round_trip() {
        let samples: Vec<Vec<u8>> = vec![
            Vec::new(),
            vec![0],
            vec![0xFF, 0xFE],
            (0..=255u8).collect(),
            (0..1000u32).map(|i| (i * 7 % 251) as u8).collect(),
        ];

        for bytes in samples {
            let encoded = encode_image(&ImageAsset::new(bytes.clone(), "image/png")).unwrap();
            assert_eq!(decode_image(encoded.as_str()).unwrap(), bytes);
            assert_eq!(decode_image(&encoded.preview_data_uri()).unwrap(), bytes);
        }
    }

    #[test]
    fn test_strip_data_uri_prefix() {
        assert_eq!(strip_data_uri_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri_prefix("AAAA"), "AAAA");
        assert_eq!(
            strip_data_uri_prefix("data:text/plain,hello"),
            "data:text/plain,hello"
        );
    }
}
