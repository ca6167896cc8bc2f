//! Real-valued 2D vectors and rectangles in canvas coordinates.
//!
//! Canvas coordinates put `(0, 0)` at the top-left corner of the full
//! logical canvas. A surface is a [`Rect`] inside that space.

use core::ops::{Add, Div, Mul, Sub};

use num_traits::Float;

/// A 2D vector: a point or an extent, in canvas pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// `(0, 0)`.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    /// `(1, 1)`.
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    /// Create a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from integer pixel dimensions.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// Component-wise division.
    pub fn div_components(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y)
    }

    /// Round both components to the nearest integer.
    pub fn round(self) -> Self {
        Self::new(Float::round(self.x), Float::round(self.y))
    }

    /// Both components finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Both components finite and `>= 0`.
    pub fn is_valid_extent(&self) -> bool {
        self.is_finite() && self.x >= 0.0 && self.y >= 0.0
    }

    /// Both components finite and strictly positive.
    pub fn is_positive_extent(&self) -> bool {
        self.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Axis-aligned rectangle: top-left origin plus size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Rect at `(0, 0)` with the given size.
    pub const fn from_size(size: Vec2) -> Self {
        Self {
            origin: Vec2::ZERO,
            size,
        }
    }

    /// Bottom-right corner (exclusive).
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        self.origin + self.size / 2.0
    }

    /// Overlap of two rects, or `None` when they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let min_x = self.origin.x.max(other.origin.x);
        let min_y = self.origin.y.max(other.origin.y);
        let max_x = self.max().x.min(other.max().x);
        let max_y = self.max().y.min(other.max().y);
        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Split a canvas of `size` into a `columns` × `rows` grid of equal
    /// surfaces, row-major. Empty when either count is zero.
    #[cfg(feature = "alloc")]
    pub fn grid(size: Vec2, columns: u32, rows: u32) -> alloc::vec::Vec<Rect> {
        if columns == 0 || rows == 0 {
            return alloc::vec::Vec::new();
        }
        let cell = Vec2::new(size.x / columns as f64, size.y / rows as f64);
        (0..rows)
            .flat_map(|r| {
                (0..columns).map(move |c| {
                    Rect::new(c as f64 * cell.x, r as f64 * cell.y, cell.x, cell.y)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_arithmetic() {
        let a = Vec2::new(10.0, 4.0);
        let b = Vec2::new(2.0, 1.0);
        assert_eq!(a + b, Vec2::new(12.0, 5.0));
        assert_eq!(a - b, Vec2::new(8.0, 3.0));
        assert_eq!(a * 0.5, Vec2::new(5.0, 2.0));
        assert_eq!(a / 2.0, Vec2::new(5.0, 2.0));
        assert_eq!(a.div_components(b), Vec2::new(5.0, 4.0));
    }

    #[test]
    fn extent_checks() {
        assert!(Vec2::ZERO.is_valid_extent());
        assert!(!Vec2::ZERO.is_positive_extent());
        assert!(!Vec2::new(-1.0, 2.0).is_valid_extent());
        assert!(!Vec2::new(f64::NAN, 2.0).is_valid_extent());
        assert!(!Vec2::new(f64::INFINITY, 2.0).is_positive_extent());
    }

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(Vec2::new(1.5, -2.5).round(), Vec2::new(2.0, -3.0));
    }

    #[test]
    fn rect_center_and_max() {
        let r = Rect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(r.max(), Vec2::new(300.0, 150.0));
        assert_eq!(r.center(), Vec2::new(200.0, 100.0));
    }

    #[test]
    fn intersect_overlapping_and_disjoint() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, -20.0, 100.0, 60.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(50.0, 0.0, 50.0, 40.0)));

        let c = Rect::new(100.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn grid_splits_row_major() {
        let cells = Rect::grid(Vec2::new(1000.0, 500.0), 2, 1);
        assert_eq!(
            cells,
            [
                Rect::new(0.0, 0.0, 500.0, 500.0),
                Rect::new(500.0, 0.0, 500.0, 500.0)
            ]
        );
        assert!(Rect::grid(Vec2::new(10.0, 10.0), 0, 3).is_empty());
    }
}
