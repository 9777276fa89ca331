//! Best-candidate selector stage.
//!
//! Shows the vision-language provider the reference photos followed by the
//! candidate set and takes its first-ranked verdict as the winner. The
//! verdict must map to exactly one candidate index; anything out of range
//! or unparseable is a hard failure, never a silent default to index 0.

use serde::Deserialize;
use tracing::info;

use facevid_models::{CandidateImage, ReferenceImage, SelectedImage};
use facevid_providers::{ImagePart, VisionLanguageProvider};

use crate::error::{PipelineError, PipelineResult};
use crate::stages::reference_part;

#[derive(Debug, Deserialize)]
struct SelectionVerdict {
    best_index: i64,
}

/// Promote the candidate judged most faithful to the reference identity.
pub async fn select_best(
    vision: &dyn VisionLanguageProvider,
    references: &[ReferenceImage],
    candidates: &[CandidateImage],
) -> PipelineResult<SelectedImage> {
    if candidates.is_empty() {
        return Err(PipelineError::selection_ambiguous(
            "cannot select from an empty candidate set",
        ));
    }

    let prompt = build_selection_prompt(references.len(), candidates.len());

    let mut parts: Vec<ImagePart<'_>> = references.iter().map(reference_part).collect();
    parts.extend(candidates.iter().map(|c| ImagePart {
        mime_type: "image/png",
        bytes: &c.bytes,
    }));

    let verdict = vision.rank_images(&prompt, &parts).await?;
    let index = parse_selection(&verdict, candidates.len())?;

    info!("Selected candidate {} of {}", index, candidates.len());
    Ok(SelectedImage::from_candidate(candidates[index].clone()))
}

fn build_selection_prompt(reference_count: usize, candidate_count: usize) -> String {
    format!(
        "The first {} images are reference photos of a person. The following {} images are \
generated candidates, numbered 0 to {} in order. Pick the one candidate whose face is most \
faithful to the person in the reference photos. Respond with only a JSON object of the form \
{{\"best_index\": <number>}}.",
        reference_count,
        candidate_count,
        candidate_count - 1
    )
}

/// Map the provider's verdict back to a member of the candidate set.
fn parse_selection(verdict: &str, candidate_count: usize) -> PipelineResult<usize> {
    let trimmed = verdict.trim();

    let index = serde_json::from_str::<SelectionVerdict>(trimmed)
        .map(|v| v.best_index)
        .ok()
        .or_else(|| trimmed.parse::<i64>().ok())
        .ok_or_else(|| {
            PipelineError::selection_ambiguous(format!(
                "selector output {:?} is not a candidate index",
                verdict
            ))
        })?;

    if index < 0 || index as usize >= candidate_count {
        return Err(PipelineError::selection_ambiguous(format!(
            "selector chose index {} outside the candidate set of {}",
            index, candidate_count
        )));
    }

    Ok(index as usize)
}
