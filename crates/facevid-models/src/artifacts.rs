//! Generated image artifacts flowing between pipeline stages.

use std::path::PathBuf;

/// One of the N independently generated square images from which the best
/// match is later selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateImage {
    /// Zero-based index within the candidate set.
    pub index: usize,
    /// Raw image bytes as returned by the provider.
    pub bytes: Vec<u8>,
    /// Where this candidate was persisted in the run directory.
    pub path: PathBuf,
}

/// The single candidate promoted by the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    /// Index of the winning candidate in the original set.
    pub index: usize,
    pub bytes: Vec<u8>,
    pub path: PathBuf,
}

impl SelectedImage {
    /// Promote a candidate. Exactly one candidate per run becomes selected.
    pub fn from_candidate(candidate: CandidateImage) -> Self {
        Self {
            index: candidate.index,
            bytes: candidate.bytes,
            path: candidate.path,
        }
    }
}

/// Widescreen expansion of the selected image, handed to video synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutpaintedImage {
    pub bytes: Vec<u8>,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}
