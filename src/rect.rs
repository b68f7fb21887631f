//! Rectangles and edge insets.

use cgmath::{EuclideanSpace, Point2, Vector2, Zero};
use serde::{Deserialize, Serialize};
use std::ops;

/// A rectangle in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Creates a rectangle from its left, top, right and bottom edges.
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Rect {
        Rect {
            origin: Point2::new(left, top),
            size: Vector2::new(right - left, bottom - top),
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.x
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.y
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.right()
            && point.y < self.bottom()
    }

    /// Returns a new rectangle shrunk by the given insets.
    pub fn inset_by(&self, edges: Edges) -> Rect {
        Rect::from_ltrb(
            self.left() + edges.left,
            self.top() + edges.top,
            self.right() - edges.right,
            self.bottom() - edges.bottom,
        )
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point2<f64>) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::zero()
    }
}

impl ops::Add<Point2<f64>> for Rect {
    type Output = Rect;
    fn add(self, point: Point2<f64>) -> Rect {
        Rect {
            origin: self.origin + point.to_vec(),
            size: self.size,
        }
    }
}

/// Insets on each edge of a rectangle (e.g. padding).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Edges {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Edges {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Edges {
        Edges {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same inset on all four edges.
    pub fn uniform(value: f64) -> Edges {
        Edges::new(value, value, value, value)
    }

    pub fn is_zero(&self) -> bool {
        *self == Edges::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltrb_round_trip() {
        let rect = Rect::from_ltrb(10., 20., 110., 70.);
        assert_eq!(rect.left(), 10.);
        assert_eq!(rect.top(), 20.);
        assert_eq!(rect.right(), 110.);
        assert_eq!(rect.bottom(), 70.);
        assert!(rect.contains(Point2::new(10., 20.)));
        assert!(!rect.contains(Point2::new(110., 20.)));
    }

    #[test]
    fn inset() {
        let rect = Rect::from_ltrb(0., 0., 100., 50.).inset_by(Edges::uniform(5.));
        assert_eq!(rect, Rect::from_ltrb(5., 5., 95., 45.));
    }
}
