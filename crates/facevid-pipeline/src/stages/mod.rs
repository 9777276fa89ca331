//! Pipeline stage components.
//!
//! One module per component of the generation chain. Each stage is a free
//! async function over the relevant provider trait so it can be exercised
//! in isolation against a test double.

use facevid_models::ReferenceImage;
use facevid_providers::ImagePart;

pub mod candidates;
pub mod descriptor;
pub mod outpaint;
pub mod selector;
pub mod synthesizer;
pub mod video;

pub use candidates::generate_candidates;
pub use descriptor::describe_references;
pub use outpaint::outpaint_selected;
pub use selector::select_best;
pub use synthesizer::synthesize_description;
pub use video::render_video;

/// Borrow a reference image as a provider payload.
pub(crate) fn reference_part(reference: &ReferenceImage) -> ImagePart<'_> {
    ImagePart {
        mime_type: reference.mime_type,
        bytes: &reference.bytes,
    }
}
