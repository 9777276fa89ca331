//! Reference set loading and validation.
//!
//! Enumerates a flat directory of reference photos for a single subject.
//! Validation happens here, before any external call is made.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use facevid_models::{mime_type_for_extension, ReferenceImage};

use crate::error::{PipelineError, PipelineResult};

/// Load every reference image in `dir`, in file-name order.
///
/// Only immediate children with a supported image extension are
/// considered; subdirectories and other files are skipped. Fails with an
/// input validation error if the directory is missing, not a directory,
/// or contains no usable images.
pub async fn load_reference_set(dir: &Path) -> PipelineResult<Vec<ReferenceImage>> {
    if !dir.exists() {
        return Err(PipelineError::input_validation(format!(
            "reference directory does not exist: {}",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(PipelineError::input_validation(format!(
            "reference path is not a directory: {}",
            dir.display()
        )));
    }

    let mut entries = fs::read_dir(dir).await?;
    let mut image_paths = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        match mime_type_for_extension(&path) {
            Some(mime) => image_paths.push((path, mime)),
            None => debug!("Skipping non-image file: {}", path.display()),
        }
    }

    if image_paths.is_empty() {
        return Err(PipelineError::input_validation(format!(
            "reference directory contains no images: {}",
            dir.display()
        )));
    }

    // Deterministic order regardless of directory iteration order.
    image_paths.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut references = Vec::with_capacity(image_paths.len());
    for (path, mime) in image_paths {
        let bytes = fs::read(&path).await?;
        references.push(ReferenceImage::new(path, bytes, mime));
    }

    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_loads_exactly_the_images_present() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.jpg"), b"jpeg-bytes").await.unwrap();
        fs::write(dir.path().join("a.png"), b"png-bytes").await.unwrap();
        fs::write(dir.path().join("notes.txt"), b"not an image").await.unwrap();
        fs::create_dir(dir.path().join("nested")).await.unwrap();
        fs::write(dir.path().join("nested").join("c.jpg"), b"ignored").await.unwrap();

        let refs = load_reference_set(dir.path()).await.unwrap();

        assert_eq!(refs.len(), 2);
        // Sorted by file name, no recursion into subdirectories.
        assert_eq!(refs[0].file_name(), "a.png");
        assert_eq!(refs[0].mime_type, "image/png");
        assert_eq!(refs[0].bytes, b"png-bytes");
        assert_eq!(refs[1].file_name(), "b.jpg");
        assert_eq!(refs[1].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_missing_directory_is_input_error() {
        let err = load_reference_set(Path::new("/nonexistent/refs"))
            .await
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_empty_directory_is_input_error() {
        let dir = TempDir::new().unwrap();
        let err = load_reference_set(dir.path()).await.unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_directory_with_only_non_images_is_input_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.md"), b"text").await.unwrap();

        let err = load_reference_set(dir.path()).await.unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_file_path_is_input_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("single.jpg");
        fs::write(&file, b"jpeg").await.unwrap();

        let err = load_reference_set(&file).await.unwrap_err();
        assert!(err.is_input_error());
    }
}
