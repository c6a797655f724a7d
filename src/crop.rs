//! Stored crop rectangles and best-crop selection.
//!
//! Editors persist crop rectangles per image, grouped by an integer *version*
//! (version 0 is the default set) and tagged with the aspect ratio they were
//! cut for and optionally the target width they were tuned for. Selection is
//! a pure grading pass:
//!
//! - grade 3 — ratio and target width both match exactly
//! - grade 2 — ratio matches and the crop is width-generic (`target_width == 0`)
//! - grade 0 — everything else, including crops without a ratio
//!
//! When no crop of the requested version scores, the requested version falls
//! back to version 0 — once, never recursively. Version 0 itself never falls
//! back.

use crate::fraction::Fraction;
use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};

/// A persisted crop rectangle for one image.
///
/// The `(image_id, ratio, target_width, version)` tuple is unique per image,
/// so at most one candidate can reach a given positive grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub id: u64,
    pub image_id: u64,
    /// Crop set this rectangle belongs to; 0 is the image's default set.
    pub version: u32,
    pub rect: Rect,
    /// Aspect ratio this crop was cut for. A crop without one is inert for
    /// matching.
    pub ratio: Option<Fraction>,
    /// Rendition width this crop was tuned for; 0 means width-generic.
    pub target_width: u32,
}

fn grade(crop: &Crop, version: u32, ratio: Fraction, width: u32) -> u8 {
    if crop.version != version || crop.ratio != Some(ratio) {
        return 0;
    }
    if crop.target_width == width {
        3
    } else if crop.target_width == 0 {
        2
    } else {
        0
    }
}

fn best_of_version(crops: &[Crop], version: u32, ratio: Fraction, width: u32) -> Option<&Crop> {
    crops
        .iter()
        .map(|crop| (grade(crop, version, ratio, width), crop))
        .filter(|(g, _)| *g > 0)
        .max_by_key(|(g, _)| *g)
        .map(|(_, crop)| crop)
}

/// Select the best stored crop for the requested version, ratio and width.
pub fn best_crop_from(
    crops: &[Crop],
    version: u32,
    ratio: Option<Fraction>,
    width: u32,
) -> Option<&Crop> {
    let ratio = ratio?;
    best_of_version(crops, version, ratio, width).or_else(|| {
        if version != 0 {
            best_of_version(crops, 0, ratio, width)
        } else {
            None
        }
    })
}

/// Select the best stored crop for a concrete requested size: the ratio is
/// the size's reduced aspect ratio, the width is the size's width.
pub fn best_crop_for_size(crops: &[Crop], version: u32, size: Size) -> Option<&Crop> {
    best_crop_from(crops, version, size.aspect_ratio(), size.width)
}
