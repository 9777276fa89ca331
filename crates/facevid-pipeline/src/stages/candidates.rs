//! Candidate image generator stage.
//!
//! Produces exactly N square candidates from the reference images, the
//! synthesized subject description, and the scenario string. The N
//! requests carry no mutual ordering dependency and are issued
//! concurrently. A partial set is never accepted: the downstream
//! face-consistency selection needs a meaningful candidate pool.

use std::path::Path;

use futures::future::try_join_all;
use tracing::debug;

use facevid_models::{AspectRatio, CandidateImage, ReferenceImage, SubjectDescription};
use facevid_providers::{ImagePart, ImageProvider};

use crate::error::{PipelineError, PipelineResult};
use crate::stages::reference_part;

/// Generate exactly `count` square candidates and persist them under
/// `candidates_dir` as `candidate_<index>.png`.
pub async fn generate_candidates(
    provider: &dyn ImageProvider,
    references: &[ReferenceImage],
    description: &SubjectDescription,
    scenario: &str,
    count: usize,
    candidates_dir: &Path,
) -> PipelineResult<Vec<CandidateImage>> {
    let prompt = build_candidate_prompt(description, scenario);
    let parts: Vec<ImagePart<'_>> = references.iter().map(reference_part).collect();

    // Independent single-image requests, issued concurrently.
    let requests = (0..count).map(|_| provider.generate(&prompt, &parts, 1, AspectRatio::Square));
    let batches = try_join_all(requests)
        .await
        .map_err(|e| PipelineError::generation_failed(e.to_string()))?;

    let mut candidates = Vec::with_capacity(count);
    for (index, mut batch) in batches.into_iter().enumerate() {
        if batch.len() != 1 {
            return Err(PipelineError::generation_failed(format!(
                "request {} returned {} images, expected 1",
                index,
                batch.len()
            )));
        }
        let bytes = batch.swap_remove(0);

        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            PipelineError::generation_failed(format!("candidate {} is not a valid image: {}", index, e))
        })?;
        if !AspectRatio::Square.matches(decoded.width(), decoded.height()) {
            return Err(PipelineError::generation_failed(format!(
                "candidate {} is {}x{}, expected 1:1",
                index,
                decoded.width(),
                decoded.height()
            )));
        }

        let path = candidates_dir.join(format!("candidate_{}.png", index));
        tokio::fs::write(&path, &bytes).await?;
        debug!("Persisted candidate {} to {}", index, path.display());

        candidates.push(CandidateImage { index, bytes, path });
    }

    Ok(candidates)
}

/// Compose the generation prompt from identity guidance and scenario.
fn build_candidate_prompt(description: &SubjectDescription, scenario: &str) -> String {
    format!(
        "Generate a photorealistic square image of the person shown in the reference photos, \
matching this description: {} Scenario: {}",
        description, scenario
    )
}
