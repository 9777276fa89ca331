//! Video generator stage.
//!
//! Feeds the outpainted widescreen image to the video provider and writes
//! the rendered clip into the run directory. Provider failure is terminal
//! for the run; an empty clip is treated the same way, so the returned
//! path always names a non-empty file.

use std::path::{Path, PathBuf};

use tracing::info;

use facevid_models::OutpaintedImage;
use facevid_providers::{ImagePart, VideoProvider};

use crate::error::{PipelineError, PipelineResult};

/// Render the final clip and persist it at `out_path`.
pub async fn render_video(
    provider: &dyn VideoProvider,
    outpainted: &OutpaintedImage,
    scenario: &str,
    out_path: &Path,
) -> PipelineResult<PathBuf> {
    let prompt = build_video_prompt(scenario);
    let bytes = provider
        .generate_video(
            ImagePart {
                mime_type: "image/png",
                bytes: &outpainted.bytes,
            },
            &prompt,
        )
        .await
        .map_err(|e| PipelineError::video_generation_failed(e.to_string()))?;

    if bytes.is_empty() {
        return Err(PipelineError::video_generation_failed(
            "provider returned an empty clip",
        ));
    }

    tokio::fs::write(out_path, &bytes).await?;
    info!(
        "Rendered clip ({} bytes) to {}",
        bytes.len(),
        out_path.display()
    );
    Ok(out_path.to_path_buf())
}

fn build_video_prompt(scenario: &str) -> String {
    format!(
        "Animate this scene with natural, subtle motion, keeping the person's face unchanged: {}",
        scenario
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_scenario() {
        let prompt = build_video_prompt("walking through a desert");
        assert!(prompt.contains("walking through a desert"));
    }
}
