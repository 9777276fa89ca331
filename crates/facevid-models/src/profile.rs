//! The facial composite profile schema.
//!
//! A structured record of granular facial attributes extracted from one
//! reference image by the vision-language provider. The JSON Schema derived
//! from this type is sent to the provider as a response-schema constraint,
//! and the provider's output is deserialized strictly back into it: unknown
//! fields, missing fields, and blank values are all rejected so a
//! partially-filled record never flows downstream.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A required profile field came back blank.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("profile field '{field}' is empty")]
pub struct ProfileValidationError {
    pub field: &'static str,
}

/// Structured facial attribute record for a single reference image.
///
/// Every field is required and must be a short, non-empty descriptive
/// phrase. Produced once per reference image, consumed only by description
/// synthesis, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FacialCompositeProfile {
    /// Overall face shape (e.g. "oval", "square", "heart-shaped")
    pub face_shape: String,
    /// Skin tone (e.g. "light olive", "deep brown")
    pub skin_tone: String,
    /// Complexion and skin texture (e.g. "clear", "freckled")
    pub complexion: String,
    /// Apparent age range (e.g. "early 30s")
    pub apparent_age_range: String,
    /// Eye color
    pub eye_color: String,
    /// Eye shape (e.g. "almond", "round", "hooded")
    pub eye_shape: String,
    /// Eye spacing (e.g. "average", "wide-set")
    pub eye_spacing: String,
    /// Eyebrow shape (e.g. "arched", "straight")
    pub eyebrow_shape: String,
    /// Eyebrow thickness
    pub eyebrow_thickness: String,
    /// Nose shape (e.g. "straight", "aquiline")
    pub nose_shape: String,
    /// Nose width relative to the face
    pub nose_width: String,
    /// Lip shape (e.g. "bow-shaped", "downturned")
    pub lip_shape: String,
    /// Lip fullness
    pub lip_fullness: String,
    /// Jawline description (e.g. "angular", "soft")
    pub jawline: String,
    /// Cheekbone prominence
    pub cheekbones: String,
    /// Chin shape (e.g. "pointed", "cleft")
    pub chin_shape: String,
    /// Forehead height and shape
    pub forehead: String,
    /// Hairline description (e.g. "straight", "widow's peak", "receding")
    pub hairline: String,
    /// Hair color
    pub hair_color: String,
    /// Hair texture (e.g. "straight", "coily")
    pub hair_texture: String,
    /// Hair length
    pub hair_length: String,
    /// Current hair style
    pub hair_style: String,
    /// Facial hair, or "none"
    pub facial_hair: String,
    /// Ear size and protrusion
    pub ears: String,
    /// Distinguishing marks (moles, scars, glasses), or "none"
    pub distinguishing_marks: String,
    /// Expression in the reference image
    pub expression: String,
}

impl FacialCompositeProfile {
    /// All attribute categories with their values, in schema order.
    ///
    /// Drives both blank-field validation and the description-synthesis
    /// prompt, which must reference every category present.
    pub fn fields(&self) -> [(&'static str, &str); 26] {
        [
            ("face shape", &self.face_shape),
            ("skin tone", &self.skin_tone),
            ("complexion", &self.complexion),
            ("apparent age range", &self.apparent_age_range),
            ("eye color", &self.eye_color),
            ("eye shape", &self.eye_shape),
            ("eye spacing", &self.eye_spacing),
            ("eyebrow shape", &self.eyebrow_shape),
            ("eyebrow thickness", &self.eyebrow_thickness),
            ("nose shape", &self.nose_shape),
            ("nose width", &self.nose_width),
            ("lip shape", &self.lip_shape),
            ("lip fullness", &self.lip_fullness),
            ("jawline", &self.jawline),
            ("cheekbones", &self.cheekbones),
            ("chin shape", &self.chin_shape),
            ("forehead", &self.forehead),
            ("hairline", &self.hairline),
            ("hair color", &self.hair_color),
            ("hair texture", &self.hair_texture),
            ("hair length", &self.hair_length),
            ("hair style", &self.hair_style),
            ("facial hair", &self.facial_hair),
            ("ears", &self.ears),
            ("distinguishing marks", &self.distinguishing_marks),
            ("expression", &self.expression),
        ]
    }

    /// Reject profiles with blank fields.
    ///
    /// Serde guarantees presence of every field; this guards against a
    /// provider that fills the schema with empty strings.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        for (field, value) in self.fields() {
            if value.trim().is_empty() {
                return Err(ProfileValidationError { field });
            }
        }
        Ok(())
    }
}
