//! Outpainting stage.
//!
//! Expands the selected 1:1 candidate to a 16:9 canvas. The subject's
//! framing must survive unmodified; only the surrounding bleed is
//! synthesized. Video generation requires a widescreen source, so any
//! rejection here is fatal to the run, and the returned image is decoded
//! and measured rather than trusted.

use std::path::Path;

use facevid_models::{AspectRatio, OutpaintedImage, SelectedImage};
use facevid_providers::{ImagePart, ImageProvider};

use crate::error::{PipelineError, PipelineResult};

/// Outpaint the selected image to 16:9 and persist it at `out_path`.
pub async fn outpaint_selected(
    provider: &dyn ImageProvider,
    selected: &SelectedImage,
    scenario: &str,
    out_path: &Path,
) -> PipelineResult<OutpaintedImage> {
    let prompt = build_outpaint_prompt(scenario);
    let bytes = provider
        .outpaint(
            ImagePart {
                mime_type: "image/png",
                bytes: &selected.bytes,
            },
            &prompt,
            AspectRatio::Widescreen,
        )
        .await
        .map_err(|e| PipelineError::outpaint_failed(e.to_string()))?;

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| PipelineError::outpaint_failed(format!("undecodable result: {}", e)))?;
    let (width, height) = (decoded.width(), decoded.height());

    if !AspectRatio::Widescreen.matches(width, height) {
        return Err(PipelineError::outpaint_failed(format!(
            "result is {}x{}, expected 16:9",
            width, height
        )));
    }

    tokio::fs::write(out_path, &bytes).await?;

    Ok(OutpaintedImage {
        bytes,
        path: out_path.to_path_buf(),
        width,
        height,
    })
}

fn build_outpaint_prompt(scenario: &str) -> String {
    format!(
        "Extend the image beyond its borders with contextually plausible surroundings for this \
scenario, leaving the person exactly as framed: {}",
        scenario
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_scenario() {
        let prompt = build_outpaint_prompt("a rooftop at dusk");
        assert!(prompt.contains("a rooftop at dusk"));
    }
}
