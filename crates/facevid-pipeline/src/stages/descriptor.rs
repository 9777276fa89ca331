//! Forensic descriptor stage.
//!
//! Sends each reference image to the vision-language provider under the
//! profile's JSON Schema and deserializes the output strictly. Downstream
//! text quality depends on completeness, so any deviation from the schema
//! is surfaced as a violation rather than defaulted.

use tracing::debug;

use facevid_models::{FacialCompositeProfile, ReferenceImage};
use facevid_providers::VisionLanguageProvider;

use crate::error::{PipelineError, PipelineResult};
use crate::stages::reference_part;

const FORENSIC_PROMPT: &str = "You are a forensic facial analyst. Examine the attached photograph \
and produce a facial composite profile of the person shown. Describe only what is visible. Each \
attribute must be a short descriptive phrase; use \"none\" where an attribute is absent. Return \
only a JSON object conforming to the response schema.";

/// Obtain a schema-conformant profile for one reference image.
pub async fn describe_reference(
    vision: &dyn VisionLanguageProvider,
    reference: &ReferenceImage,
) -> PipelineResult<FacialCompositeProfile> {
    let schema = profile_schema()?;
    let text = vision
        .analyze_structured(FORENSIC_PROMPT, reference_part(reference), schema)
        .await?;

    let profile: FacialCompositeProfile = serde_json::from_str(&text).map_err(|e| {
        PipelineError::schema_violation(format!(
            "output for {} does not conform to the profile schema: {}",
            reference.file_name(),
            e
        ))
    })?;

    profile.validate().map_err(|e| {
        PipelineError::schema_violation(format!("{} for {}", e, reference.file_name()))
    })?;

    debug!("Profiled reference {}", reference.file_name());
    Ok(profile)
}

/// Profile every reference image of the subject, in order.
///
/// The stage completes only when every reference has a conformant profile.
pub async fn describe_references(
    vision: &dyn VisionLanguageProvider,
    references: &[ReferenceImage],
) -> PipelineResult<Vec<FacialCompositeProfile>> {
    let mut profiles = Vec::with_capacity(references.len());
    for reference in references {
        profiles.push(describe_reference(vision, reference).await?);
    }
    Ok(profiles)
}

fn profile_schema() -> PipelineResult<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(FacialCompositeProfile)).map_err(|e| {
        PipelineError::schema_violation(format!("failed to build profile schema: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_schema_lists_required_fields() {
        let schema = profile_schema().unwrap();
        let required = schema["required"].as_array().unwrap();
        let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
        assert!(names.contains(&"face_shape"));
        assert!(names.contains(&"distinguishing_marks"));
        assert_eq!(names.len(), 26);
    }
}
