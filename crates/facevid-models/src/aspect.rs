//! Aspect ratios used for generation and outpainting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target aspect ratio for a generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 1:1, used for candidate generation
    #[default]
    Square,
    /// 16:9, used for the outpainted video source frame
    Widescreen,
}

impl AspectRatio {
    /// Wire value expected by the image provider (e.g. "1:1", "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
        }
    }

    /// Check whether pixel dimensions match this ratio exactly.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        match self {
            AspectRatio::Square => width == height,
            AspectRatio::Widescreen => width as u64 * 9 == height as u64 * 16,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
