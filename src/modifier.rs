//! The rendition request: crop + target dimensions + output type.
//!
//! An [`ImageModifier`] arrives loosely specified — wildcard axes, a bare
//! ratio, no output type — and [`ImageModifier::normalize`] resolves it into
//! a source-dependent concrete form. Normalization is immutable: it returns a
//! new value and never aliases the caller's instance, so a normalized and an
//! un-normalized modifier can never be accidentally shared.
//!
//! Crop selection is deliberately *not* part of normalization: picking a crop
//! needs the image's full stored crop set, which is the resolution pipeline's
//! business. Output-type defaulting likewise needs the source's format and
//! lives in the pipeline (`resolve_output_type`).

use crate::crop::Crop;
use crate::dimensions::{Dimensions, DimensionsError};
use crate::geometry::Size;
use crate::image_type::ImageType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single set of modifications to apply to an image.
///
/// Equality is structural: two modifiers are equal only when every field
/// matches exactly. `Dimensions`' ratio-family equality does not apply here,
/// since modifiers for `800x600` and `400x300` describe different renditions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageModifier {
    /// Crop to apply before resizing, in source pixel coordinates.
    pub crop: Option<Crop>,
    /// Requested output size; defaults to fully unconstrained.
    #[serde(default = "Dimensions::unconstrained")]
    pub dimensions: Dimensions,
    /// Requested output format; `None` lets the pipeline pick the preferred
    /// type for the source format.
    pub output: Option<ImageType>,
}

impl ImageModifier {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            crop: None,
            dimensions,
            output: None,
        }
    }

    /// A request for the original, unmodified: no crop, no size constraint,
    /// no output type.
    pub fn is_empty(&self) -> bool {
        self.crop.is_none()
            && self.output.is_none()
            && self.dimensions == Dimensions::unconstrained()
    }

    /// Resolve the requested dimensions into concrete pixels against the
    /// source size. Crop and output type are carried through untouched.
    ///
    /// An empty modifier normalizes to an empty modifier.
    pub fn normalize(&self, source: Size) -> Result<ImageModifier, DimensionsError> {
        if self.is_empty() {
            return Ok(ImageModifier::default());
        }
        let resolved = self.dimensions.normalize(source)?;
        Ok(ImageModifier {
            crop: self.crop.clone(),
            dimensions: Dimensions::from(resolved),
            output: self.output,
        })
    }

    /// The concrete target size of a normalized modifier. `None` when the
    /// modifier still contains wildcards or a bare ratio.
    pub fn resolved_size(&self) -> Option<Size> {
        match self.dimensions {
            Dimensions::Absolute { width, height } if width != 0 && height != 0 => {
                Some(Size::new(width, height))
            }
            _ => None,
        }
    }
}

impl PartialEq for ImageModifier {
    fn eq(&self, other: &Self) -> bool {
        self.crop == other.crop
            && self.output == other.output
            && self.dimensions.structurally_equal(&other.dimensions)
    }
}

impl fmt::Display for ImageModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dimensions)?;
        if let Some(crop) = &self.crop {
            write!(f, " crop={}", crop.rect)?;
        }
        if let Some(output) = self.output {
            write!(f, " output={output}")?;
        }
        Ok(())
    }
}
