//! Local-disk image store for catalog uploads.
//!
//! Uploaded category/product images land under the configured directory
//! with a collision-proof `{prefix}-{uuid}.{ext}` name; the returned URL
//! path is what gets persisted on the entity and served back via the
//! static `/uploads` route.

use std::path::PathBuf;

use uuid::Uuid;

/// Fallback extension when the upload has none (or a hostile one).
const DEFAULT_EXTENSION: &str = "jpg";

/// Errors that can occur when storing an image.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Filesystem failure while persisting the image.
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduce an uploaded filename to a safe lowercase extension.
///
/// Everything but ASCII alphanumerics is stripped, so a name like
/// `shelf.JPG` yields `jpg` and `../../etc/passwd` falls back to the
/// default.
fn sanitize_extension(original_name: Option<&str>) -> String {
    let ext: String = original_name
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() {
        DEFAULT_EXTENSION.to_owned()
    } else {
        ext
    }
}

/// Stores uploaded images on the local filesystem.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory uploads are written to (served at `/uploads`).
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Persist one uploaded image and return its public URL path.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Io`] if the directory cannot be created or the
    /// file cannot be written.
    pub async fn save(
        &self,
        prefix: &str,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let filename = format!(
            "{prefix}-{}.{}",
            Uuid::new_v4(),
            sanitize_extension(original_name)
        );
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        tracing::debug!(%filename, size = bytes.len(), "Stored uploaded image");
        Ok(format!("/uploads/{filename}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_extension_normal_names() {
        assert_eq!(sanitize_extension(Some("shelf.jpg")), "jpg");
        assert_eq!(sanitize_extension(Some("shelf.JPG")), "jpg");
        assert_eq!(sanitize_extension(Some("photo.final.webp")), "webp");
    }

    #[test]
    fn test_sanitize_extension_falls_back() {
        assert_eq!(sanitize_extension(None), "jpg");
        assert_eq!(sanitize_extension(Some("no-extension")), "jpg");
        assert_eq!(sanitize_extension(Some("dotted.")), "jpg");
    }

    #[test]
    fn test_sanitize_extension_strips_hostile_input() {
        assert_eq!(sanitize_extension(Some("x..p?n!g")), "png");
        assert_eq!(sanitize_extension(Some("x.?!#")), "jpg");
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_url() {
        let dir = std::env::temp_dir().join(format!("driftwood-uploads-{}", Uuid::new_v4()));
        let store = ImageStore::new(&dir);

        let url = store
            .save("product", Some("shelf.png"), b"not-really-a-png")
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/product-"));
        assert!(url.ends_with(".png"));

        let filename = url.strip_prefix("/uploads/").unwrap();
        let written = tokio::fs::read(dir.join(filename)).await.unwrap();
        assert_eq!(written, b"not-really-a-png");

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }
}
