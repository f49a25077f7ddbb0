//! Artwork media files on local disk.
//!
//! Images live under `{media_root}/images/{artwork_id}/` and are served
//! statically from `/images`. The thumbnail of an artwork is the
//! alphabetically first file in its directory, so catalog responses
//! never store image paths in the database.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use atelier_core::ArtworkId;

use crate::error::{AppError, Result};

/// Filename characters accepted for uploads.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// URL path of an artwork's thumbnail, or an empty string when the
/// artwork has no images.
///
/// Missing directories are treated as "no images"; unreadable entries
/// are skipped with a warning.
pub async fn thumbnail_path(media_root: &Path, artwork_id: ArtworkId) -> String {
    let dir = image_dir(media_root, artwork_id);

    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(_) => return String::new(),
    };

    let mut names: Vec<String> = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(artwork_id = %artwork_id, error = %err, "unreadable media entry");
                break;
            }
        }
    }

    names.sort();
    match names.first() {
        Some(name) => format!("/images/{artwork_id}/{name}"),
        None => String::new(),
    }
}

/// Store an uploaded image for an artwork.
///
/// Returns the URL path of the stored file.
///
/// # Errors
///
/// Returns `BadRequest` for unacceptable filenames and `Internal` when
/// the file cannot be written.
pub async fn save_image(
    media_root: &Path,
    artwork_id: ArtworkId,
    filename: &str,
    bytes: &[u8],
) -> Result<String> {
    if !is_safe_filename(filename) {
        return Err(AppError::BadRequest(format!(
            "unacceptable filename: {filename}"
        )));
    }

    let dir = image_dir(media_root, artwork_id);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("creating media directory: {e}")))?;

    let path = dir.join(filename);
    fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("writing media file: {e}")))?;

    Ok(format!("/images/{artwork_id}/{filename}"))
}

fn image_dir(media_root: &Path, artwork_id: ArtworkId) -> PathBuf {
    media_root.join("images").join(artwork_id.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filenames() {
        assert!(is_safe_filename("sunset.jpg"));
        assert!(is_safe_filename("img_01-final.png"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename(".hidden"));
        assert!(!is_safe_filename("../escape.jpg"));
        assert!(!is_safe_filename("with space.jpg"));
        assert!(!is_safe_filename("slash/name.jpg"));
    }

    #[tokio::test]
    async fn test_thumbnail_of_missing_directory_is_empty() {
        let missing = Path::new("/nonexistent-media-root");
        assert_eq!(thumbnail_path(missing, ArtworkId::from(1)).await, "");
    }

    #[tokio::test]
    async fn test_thumbnail_picks_alphabetically_first() {
        let root = std::env::temp_dir().join(format!("atelier-media-{}", std::process::id()));
        let dir = root.join("images").join("42");
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join("b.jpg"), b"b").await.unwrap();
        fs::write(dir.join("a.jpg"), b"a").await.unwrap();

        let path = thumbnail_path(&root, ArtworkId::from(42)).await;
        assert_eq!(path, "/images/42/a.jpg");

        fs::remove_dir_all(&root).await.unwrap();
    }
}
