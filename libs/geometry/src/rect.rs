//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::transform::{TransformMut, Transformation};

/// An axis-aligned rectangle with `p0` at the lower left and `p1` at the upper right.
#[derive(Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    p0: Point,
    p1: Point,
}

impl Rect {
    /// Creates a rectangle from two opposite corners, in any order.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let flipped = Rect::new(Point::new(8, -2), Point::new(-4, 6));
    /// assert_eq!(flipped, Rect::from_sides(-4, -2, 8, 6));
    /// ```
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            p0: Point::new(a.x.min(b.x), a.y.min(b.y)),
            p1: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a rectangle from its left, bottom, right, and top edges.
    ///
    /// # Panics
    ///
    /// Panics if `left > right` or `bot > top`. Use [`Rect::new`] for unsorted corners.
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        assert!(left <= right, "left edge {left} is right of right edge {right}");
        assert!(bot <= top, "bottom edge {bot} is above top edge {top}");
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// The bottom edge.
    #[inline]
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// The top edge.
    #[inline]
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// The left edge.
    #[inline]
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// The right edge.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The horizontal extent.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    /// The vertical extent.
    #[inline]
    pub const fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    /// The center, rounded toward zero onto the grid.
    ///
    /// See [`Rect::center_f64`] for the exact center.
    pub const fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2, (self.p0.y + self.p1.y) / 2)
    }

    /// The exact center as `(x, y)`.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Rect::from_sides(0, 0, 55, 45).center_f64(), (27.5, 22.5));
    /// ```
    pub fn center_f64(&self) -> (f64, f64) {
        (
            (self.p0.x as f64 + self.p1.x as f64) / 2.,
            (self.p0.y as f64 + self.p1.y as f64) / 2.,
        )
    }

    /// The corners, counterclockwise from the lower left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.p0,
            Point::new(self.p1.x, self.p0.y),
            self.p1,
            Point::new(self.p0.x, self.p1.y),
        ]
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        Self {
            p0: Point::new(self.p0.x.min(other.p0.x), self.p0.y.min(other.p0.y)),
            p1: Point::new(self.p1.x.max(other.p1.x), self.p1.y.max(other.p1.y)),
        }
    }

    /// Grows the rectangle by `amount` on every side.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let bar = Rect::from_sides(0, -5, 40, 5);
    /// assert_eq!(bar.expand_all(3), Rect::from_sides(-3, -8, 43, 8));
    /// ```
    pub fn expand_all(&self, amount: i64) -> Self {
        Self::new(
            Point::new(self.p0.x - amount, self.p0.y - amount),
            Point::new(self.p1.x + amount, self.p1.y + amount),
        )
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

/// A transformed rectangle is the bounding box of its transformed corners.
impl TransformMut for Rect {
    fn transform_mut(&mut self, trans: Transformation) {
        let mut corners = self.corners();
        for c in corners.iter_mut() {
            c.transform_mut(trans);
        }
        let [a, b, c, d] = corners;
        *self = Rect::new(a, c).union(Rect::new(b, d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    #[test]
    fn quarter_turn_swaps_width_and_height() {
        let rect = Rect::from_sides(10, 0, 40, 10);
        let turned = rect.transform(Transformation::builder().angle(90.).build());
        assert_eq!(turned, Rect::from_sides(-10, 10, 0, 40));
    }

    #[test]
    fn union_covers_both() {
        let a = Rect::from_sides(0, 0, 100, 200);
        let b = Rect::from_sides(-50, 20, 120, 160);
        assert_eq!(a.union(b), Rect::from_sides(-50, 0, 120, 200));
    }

    #[test]
    #[should_panic]
    fn inverted_sides_panic() {
        Rect::from_sides(10, 0, 0, 10);
    }
}
