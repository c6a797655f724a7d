//! Parameter types for transformer operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the resolution pipeline (which decides what renditions
//! to produce) and the [`backend`](super::backend) transformers (which do the
//! actual pixel work), so backends can be swapped or mocked without touching
//! pipeline logic.

use crate::geometry::{Rect, Size};
use crate::image_type::ImageType;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Full specification of one rendition: crop first, then resize to the
/// target, then encode as the output type.
///
/// The crop rect is in source pixel coordinates and is applied before any
/// resizing. `target` is always concrete here; wildcard resolution happens
/// upstream during modifier normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyParams {
    pub source_type: ImageType,
    pub crop: Option<Rect>,
    pub target: Size,
    pub output_type: ImageType,
    pub quality: Quality,
}

/// Result of inspecting raw image bytes: the detected format and pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageAttributes {
    pub image_type: ImageType,
    pub size: Size,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }
}
