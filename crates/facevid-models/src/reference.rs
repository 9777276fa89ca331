//! Reference images and subject descriptions.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A reference photo of the subject, loaded from disk.
///
/// Immutable input to the pipeline; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    /// Source path on disk.
    pub path: PathBuf,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type derived from the file extension.
    pub mime_type: &'static str,
}

impl ReferenceImage {
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>, mime_type: &'static str) -> Self {
        Self {
            path: path.into(),
            bytes,
            mime_type,
        }
    }

    /// File name for logging, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// MIME type for a supported reference image extension.
///
/// Returns `None` for anything that is not a supported image format;
/// callers use this to filter directory entries.
pub fn mime_type_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// A natural-language paragraph summarizing the subject's appearance.
///
/// Used as the guidance prompt for candidate image generation. Guaranteed
/// non-empty at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectDescription(String);

/// Error constructing a [`SubjectDescription`] from blank model output.
#[derive(Debug, Error)]
#[error("subject description is empty or whitespace-only")]
pub struct EmptyDescription;

impl SubjectDescription {
    /// Create a description, rejecting empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> Result<Self, EmptyDescription> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EmptyDescription);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_for_extension() {
        assert_eq!(
            mime_type_for_extension(Path::new("a/subject.JPG")),
            Some("image/jpeg")
        );
        assert_eq!(
            mime_type_for_extension(Path::new("b.png")),
            Some("image/png")
        );
        assert_eq!(
            mime_type_for_extension(Path::new("c.webp")),
            Some("image/webp")
        );
        assert_eq!(mime_type_for_extension(Path::new("notes.txt")), None);
        assert_eq!(mime_type_for_extension(Path::new("no_extension")), None);
    }

    #[test]
    fn test_subject_description_rejects_blank() {
        assert!(SubjectDescription::new("").is_err());
        assert!(SubjectDescription::new("   \n\t").is_err());

        let desc = SubjectDescription::new("An oval face with green eyes.").unwrap();
        assert_eq!(desc.as_str(), "An oval face with green eyes.");
    }
}
