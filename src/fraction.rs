//! Reduced fractions used as aspect ratios.
//!
//! A [`Fraction`] is always stored in lowest terms with the sign carried on
//! the numerator and a strictly positive denominator, so `-1/-2`, `2/4` and
//! `1/2` are the same value. Ordering is by cross-multiplication, which keeps
//! comparisons exact for any ratio that fits in an `i32`.
//!
//! Aspect ratios travel through request parameters as the canonical `"N/D"`
//! token: [`Fraction::parse`] and the `Display` impl round-trip it exactly,
//! and [`Fraction::string_for_url`] emits the same token (no characters that
//! need escaping in a URL query string).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FractionError {
    #[error("fraction denominator must not be zero")]
    ZeroDenominator,
    #[error("invalid fraction token: {0:?} (expected \"N/D\")")]
    InvalidToken(String),
}

/// An exact rational number in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFraction", into = "RawFraction")]
pub struct Fraction {
    numerator: i32,
    denominator: i32,
}

/// Serialized form; reduction happens on the way back in.
#[derive(Serialize, Deserialize)]
struct RawFraction {
    numerator: i32,
    denominator: i32,
}

impl From<Fraction> for RawFraction {
    fn from(f: Fraction) -> Self {
        Self {
            numerator: f.numerator,
            denominator: f.denominator,
        }
    }
}

impl TryFrom<RawFraction> for Fraction {
    type Error = FractionError;

    fn try_from(raw: RawFraction) -> Result<Self, Self::Error> {
        Fraction::new(raw.numerator, raw.denominator)
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Fraction {
    pub const ONE: Fraction = Fraction {
        numerator: 1,
        denominator: 1,
    };

    /// Create a fraction, reducing to lowest terms and normalizing the sign
    /// onto the numerator.
    pub fn new(numerator: i32, denominator: i32) -> Result<Self, FractionError> {
        if denominator == 0 {
            return Err(FractionError::ZeroDenominator);
        }
        let mut n = numerator as i64;
        let mut d = denominator as i64;
        if d < 0 {
            n = -n;
            d = -d;
        }
        // gcd(0, d) = d, so a zero numerator reduces to 0/1.
        let g = gcd(n.abs(), d);
        Ok(Self {
            numerator: (n / g) as i32,
            denominator: (d / g) as i32,
        })
    }

    /// The aspect ratio of a `width`×`height` area. `None` when either axis
    /// is zero (a degenerate area has no ratio).
    pub fn ratio(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        // Both axes are non-zero, so the constructor cannot fail.
        Self::new(width as i32, height as i32).ok()
    }

    pub fn numerator(self) -> i32 {
        self.numerator
    }

    pub fn denominator(self) -> i32 {
        self.denominator
    }

    /// Width of an area with this aspect ratio and the given height,
    /// rounded to nearest.
    pub fn width_for_height(self, height: u32) -> u32 {
        let n = self.numerator as i64;
        let d = self.denominator as i64;
        ((height as i64 * n * 2 + d) / (d * 2)) as u32
    }

    /// Height of an area with this aspect ratio and the given width,
    /// rounded to nearest.
    pub fn height_for_width(self, width: u32) -> u32 {
        let n = self.numerator as i64;
        let d = self.denominator as i64;
        ((width as i64 * d * 2 + n) / (n * 2)) as u32
    }

    /// Multiply an integer by this fraction, truncating toward zero.
    pub fn scale_trunc(self, value: i32) -> i32 {
        (value as i64 * self.numerator as i64 / self.denominator as i64) as i32
    }

    /// The canonical `"N/D"` token, safe for embedding in a URL query string.
    pub fn string_for_url(self) -> String {
        self.to_string()
    }

    /// Parse the canonical `"N/D"` token.
    pub fn parse(token: &str) -> Result<Self, FractionError> {
        let (n, d) = token
            .split_once('/')
            .ok_or_else(|| FractionError::InvalidToken(token.to_string()))?;
        let numerator = n
            .trim()
            .parse::<i32>()
            .map_err(|_| FractionError::InvalidToken(token.to_string()))?;
        let denominator = d
            .trim()
            .parse::<i32>()
            .map_err(|_| FractionError::InvalidToken(token.to_string()))?;
        Self::new(numerator, denominator)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Fraction {
    type Err = FractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplication preserves order.
        let left = self.numerator as i64 * other.denominator as i64;
        let right = other.numerator as i64 * self.denominator as i64;
        left.cmp(&right)
    }
}
