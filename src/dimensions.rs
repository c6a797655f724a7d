//! Requested rendition sizes.
//!
//! A [`Dimensions`] value is what a caller asks for: either an absolute pixel
//! size where a zero axis is a wildcard ("any width, height 600"), or a bare
//! aspect ratio. [`Dimensions::normalize`] resolves either form into concrete
//! pixels against the source image's actual size.
//!
//! # Equality
//!
//! Two `Dimensions` are equal when they denote the same constraint. When both
//! sides carry an aspect ratio, the reduced ratios are compared, so
//! `Absolute(800, 600)` equals `Relative(4/3)` — both describe the 4:3 family
//! of renditions. Wildcard absolutes carry no ratio and compare structurally.
//! The comparison lives in one place ([`Dimensions::same_constraint`]); do
//! not re-derive it at call sites. `Hash` is consistent with it.

use crate::fraction::Fraction;
use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimensionsError {
    // Field is not called `source`: thiserror would treat that as the
    // error's cause and demand `Size: Error`.
    #[error("source size {source_size} cannot resolve {requested}: a zero source axis gives no ratio")]
    DegenerateSource { source_size: Size, requested: String },
    #[error("{requested} is not a valid aspect ratio")]
    InvalidRatio { requested: String },
}

/// A requested size: absolute pixels (with wildcard axes) or a bare ratio.
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub enum Dimensions {
    /// Exact pixels. A zero axis means "unconstrained on that axis".
    Absolute { width: u32, height: u32 },
    /// Aspect ratio only; the concrete pixels come from normalization.
    Relative { ratio: Fraction },
}

impl Dimensions {
    /// The fully unconstrained request (both axes wildcard).
    pub fn unconstrained() -> Self {
        Dimensions::Absolute {
            width: 0,
            height: 0,
        }
    }

    pub fn absolute(width: u32, height: u32) -> Self {
        Dimensions::Absolute { width, height }
    }

    pub fn relative(ratio: Fraction) -> Self {
        Dimensions::Relative { ratio }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Dimensions::Absolute { .. })
    }

    /// Whether this request pins down an aspect ratio: always for relative
    /// requests, and for absolute requests only when neither axis is a
    /// wildcard.
    pub fn has_aspect_ratio(&self) -> bool {
        self.aspect_ratio().is_some()
    }

    /// The aspect ratio this request denotes, when it denotes one.
    pub fn aspect_ratio(&self) -> Option<Fraction> {
        match *self {
            Dimensions::Absolute { width, height } => Fraction::ratio(width, height),
            Dimensions::Relative { ratio } => Some(ratio),
        }
    }

    /// Whether a concrete size satisfies this request. Wildcard axes match
    /// anything; a relative request matches any size of its ratio.
    pub fn matches(&self, size: Size) -> bool {
        match *self {
            Dimensions::Absolute { width, height } => {
                (width == 0 || width == size.width) && (height == 0 || height == size.height)
            }
            Dimensions::Relative { ratio } => size.aspect_ratio() == Some(ratio),
        }
    }

    /// Resolve wildcards and ratios into concrete pixels against the source
    /// image's size.
    ///
    /// Wildcard axes derive from the source aspect ratio (rounded to nearest,
    /// at least 1); the both-wildcard request resolves to the source size
    /// itself. A relative request takes the full source width and derives the
    /// height from the requested ratio. Fails when the source has a zero axis
    /// and a derivation is needed.
    pub fn normalize(&self, source: Size) -> Result<Size, DimensionsError> {
        let source_ratio = || {
            source.aspect_ratio().ok_or(DimensionsError::DegenerateSource {
                source_size: source,
                requested: self.to_string(),
            })
        };

        match *self {
            Dimensions::Absolute { width: 0, height: 0 } => {
                if source.width == 0 || source.height == 0 {
                    return Err(DimensionsError::DegenerateSource {
                        source_size: source,
                        requested: self.to_string(),
                    });
                }
                Ok(source)
            }
            Dimensions::Absolute { width, height: 0 } => {
                let height = source_ratio()?.height_for_width(width).max(1);
                Ok(Size::new(width, height))
            }
            Dimensions::Absolute { width: 0, height } => {
                let width = source_ratio()?.width_for_height(height).max(1);
                Ok(Size::new(width, height))
            }
            Dimensions::Absolute { width, height } => Ok(Size::new(width, height)),
            Dimensions::Relative { ratio } => {
                if ratio.numerator() <= 0 {
                    return Err(DimensionsError::InvalidRatio {
                        requested: self.to_string(),
                    });
                }
                if source.width == 0 || source.height == 0 {
                    return Err(DimensionsError::DegenerateSource {
                        source_size: source,
                        requested: self.to_string(),
                    });
                }
                let width = source.width;
                let height = ratio.height_for_width(width).max(1);
                Ok(Size::new(width, height))
            }
        }
    }

    /// Exact variant-and-field equality, unlike `PartialEq` which treats all
    /// members of one ratio family as equal. Use this where `800x600` and
    /// `400x300` must count as different requests.
    pub fn structurally_equal(&self, other: &Dimensions) -> bool {
        match (*self, *other) {
            (
                Dimensions::Absolute { width: w1, height: h1 },
                Dimensions::Absolute { width: w2, height: h2 },
            ) => w1 == w2 && h1 == h2,
            (Dimensions::Relative { ratio: r1 }, Dimensions::Relative { ratio: r2 }) => r1 == r2,
            _ => false,
        }
    }

    /// The single comparison backing `PartialEq`: ratio equality when both
    /// sides denote a ratio, structural equality otherwise.
    fn same_constraint(&self, other: &Dimensions) -> bool {
        match (self.aspect_ratio(), other.aspect_ratio()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => match (*self, *other) {
                (
                    Dimensions::Absolute { width: w1, height: h1 },
                    Dimensions::Absolute { width: w2, height: h2 },
                ) => w1 == w2 && h1 == h2,
                // Relative always has a ratio; only absolutes can reach here.
                _ => false,
            },
            _ => false,
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions::unconstrained()
    }
}

impl PartialEq for Dimensions {
    fn eq(&self, other: &Self) -> bool {
        self.same_constraint(other)
    }
}

impl Hash for Dimensions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must collapse to the ratio whenever one exists so that equal
        // cross-variant values hash identically.
        match self.aspect_ratio() {
            Some(ratio) => ratio.hash(state),
            None => {
                if let Dimensions::Absolute { width, height } = *self {
                    width.hash(state);
                    height.hash(state);
                }
            }
        }
    }
}

impl From<Size> for Dimensions {
    fn from(size: Size) -> Self {
        Dimensions::Absolute {
            width: size.width,
            height: size.height,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Dimensions::Absolute { width, height } => {
                if width != 0 {
                    write!(f, "{width}")?;
                }
                f.write_str("x")?;
                if height != 0 {
                    write!(f, "{height}")?;
                }
                Ok(())
            }
            Dimensions::Relative { ratio } => write!(f, "{ratio}"),
        }
    }
}
