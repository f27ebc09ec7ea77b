//! Reads leaf images from disk.

use agrifusion_core::error::Result;
use agrifusion_core::image::{ImageAsset, MAX_IMAGE_BYTES};
use std::path::Path;
use tokio::fs;

/// Infers the MIME type from a filename extension using the `mime_guess` library.
fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Loads an image file as an [`ImageAsset`].
///
/// Files larger than the upload limit are not read; the returned asset
/// carries only the declared size, which the encoder then rejects.
pub async fn load_image(path: &Path) -> Result<ImageAsset> {
    let metadata = fs::metadata(path).await?;
    let mime_type = infer_mime_type(path);
    let size = metadata.len();

    if size > MAX_IMAGE_BYTES {
        tracing::debug!(
            "[ImageLoader] {} is {} bytes, skipping read",
            path.display(),
            size
        );
        return Ok(ImageAsset::new(Vec::new(), mime_type).with_declared_size(size));
    }

    let bytes = fs::read(path).await?;
    tracing::debug!(
        "[ImageLoader] Read {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );
    Ok(ImageAsset::new(bytes, mime_type))
}
