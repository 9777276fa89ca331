//! Description synthesizer stage.
//!
//! Converts one or more facial composite profiles into a single
//! natural-language paragraph usable as a text-to-image guidance prompt.
//! Paraphrase variance across runs is acceptable; omission of identity
//! attributes is not, so the prompt enumerates every attribute category
//! from every profile.

use std::fmt::Write;

use facevid_models::{FacialCompositeProfile, SubjectDescription};
use facevid_providers::VisionLanguageProvider;

use crate::error::{PipelineError, PipelineResult};

/// Reconcile the profiles into one subject description.
pub async fn synthesize_description(
    vision: &dyn VisionLanguageProvider,
    profiles: &[FacialCompositeProfile],
) -> PipelineResult<SubjectDescription> {
    let prompt = build_synthesis_prompt(profiles);
    let text = vision.generate_text(&prompt).await?;

    SubjectDescription::new(text)
        .map_err(|e| PipelineError::generation_empty(e.to_string()))
}

/// Build the synthesis prompt, covering every attribute category present.
fn build_synthesis_prompt(profiles: &[FacialCompositeProfile]) -> String {
    let mut prompt = String::from(
        "Write a single natural-language paragraph describing this person's appearance, \
suitable as guidance for a photorealistic image generator. The paragraph must mention every \
attribute category listed below; where profiles disagree, reconcile them into the most \
consistent reading. Return only the paragraph, with no preamble.\n",
    );

    for (i, profile) in profiles.iter().enumerate() {
        let _ = write!(prompt, "\nProfile from reference photo {}:\n", i + 1);
        for (category, value) in profile.fields() {
            let _ = writeln!(prompt, "- {}: {}", category, value);
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> FacialCompositeProfile {
        serde_json::from_value(serde_json::json!({
            "face_shape": "oval",
            "skin_tone": "light olive",
            "complexion": "clear",
            "apparent_age_range": "early 30s",
            "eye_color": "green",
            "eye_shape": "almond",
            "eye_spacing": "average",
            "eyebrow_shape": "softly arched",
            "eyebrow_thickness": "medium",
            "nose_shape": "straight",
            "nose_width": "narrow",
            "lip_shape": "bow-shaped",
            "lip_fullness": "medium",
            "jawline": "defined but soft",
            "cheekbones": "high",
            "chin_shape": "slightly pointed",
            "forehead": "average height",
            "hairline": "straight",
            "hair_color": "dark brown",
            "hair_texture": "wavy",
            "hair_length": "shoulder-length",
            "hair_style": "loose, parted in the middle",
            "facial_hair": "none",
            "ears": "average, close to the head",
            "distinguishing_marks": "small mole on left cheek",
            "expression": "neutral, slight smile"
        }))
        .unwrap()
    }

    #[test]
    fn test_prompt_covers_every_category_and_value() {
        let profile = sample_profile();
        let prompt = build_synthesis_prompt(std::slice::from_ref(&profile));

        for (category, value) in profile.fields() {
            assert!(prompt.contains(category), "missing category: {category}");
            assert!(prompt.contains(value), "missing value: {value}");
        }
    }

    #[test]
    fn test_prompt_numbers_multiple_profiles() {
        let profiles = vec![sample_profile(), sample_profile(), sample_profile()];
        let prompt = build_synthesis_prompt(&profiles);

        assert!(prompt.contains("reference photo 1"));
        assert!(prompt.contains("reference photo 3"));
    }
}
