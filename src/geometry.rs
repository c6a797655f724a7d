//! Geometric value types: [`Point`], [`Size`] and [`Rect`].
//!
//! All three are immutable `Copy` values with structural equality. Scaling
//! laws are exact integer math: proportional downscaling rounds down, and
//! fractional scaling truncates toward zero, so repeated normalization of the
//! same request always lands on the same pixels.

use crate::fraction::Fraction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A pixel area. A zero axis is legal and means the area carries no aspect
/// ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The reduced aspect ratio, or `None` when either axis is zero.
    pub fn aspect_ratio(&self) -> Option<Fraction> {
        Fraction::ratio(self.width, self.height)
    }

    /// Scale down proportionally so the width fits `max_width`. Identity when
    /// the width is already within the bound. Rounds down.
    pub fn scale_if_wider(&self, max_width: u32) -> Size {
        if self.width <= max_width {
            return *self;
        }
        Size::new(
            max_width,
            (self.height as u64 * max_width as u64 / self.width as u64) as u32,
        )
    }

    /// Scale down proportionally so the height fits `max_height`. Identity
    /// when the height is already within the bound. Rounds down.
    pub fn scale_if_higher(&self, max_height: u32) -> Size {
        if self.height <= max_height {
            return *self;
        }
        Size::new(
            (self.width as u64 * max_height as u64 / self.height as u64) as u32,
            max_height,
        )
    }

    /// Whether both sizes reduce to the same aspect ratio. Degenerate sizes
    /// (a zero axis) are proportional to nothing.
    pub fn is_proportional_to(&self, other: &Size) -> bool {
        match (self.aspect_ratio(), other.aspect_ratio()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle: an origin plus a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn from_coords(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn left(&self) -> i32 {
        self.origin.x
    }

    pub fn top(&self) -> i32 {
        self.origin.y
    }

    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height as i32
    }

    /// Multiply origin and size componentwise by `factor`, truncating toward
    /// zero.
    pub fn scale_by(&self, factor: Fraction) -> Rect {
        Rect::new(
            Point::new(
                factor.scale_trunc(self.origin.x),
                factor.scale_trunc(self.origin.y),
            ),
            Size::new(
                factor.scale_trunc(self.size.width as i32) as u32,
                factor.scale_trunc(self.size.height as i32) as u32,
            ),
        )
    }

    /// Half-open containment test: the left/top edges are inside, the
    /// right/bottom edges are outside.
    pub fn contains_point(&self, p: Point) -> bool {
        self.left() <= p.x && p.x < self.right() && self.top() <= p.y && p.y < self.bottom()
    }

    /// Whether this rect lies entirely within `other` (edges may touch).
    pub fn within_rect(&self, other: &Rect) -> bool {
        other.left() <= self.left()
            && other.top() <= self.top()
            && other.right() >= self.right()
            && other.bottom() >= self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}+{}+{}",
            self.size,
            self.origin.x,
            self.origin.y
        )
    }
}
