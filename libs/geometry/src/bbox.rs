//! Axis-aligned bounding boxes.

use crate::rect::Rect;

/// A shape with an axis-aligned bounding box.
///
/// # Examples
///
/// ```
/// # use geometry::prelude::*;
/// let shapes = vec![Rect::from_sides(0, 0, 10, 10), Rect::from_sides(-5, 3, 2, 20)];
/// assert_eq!(shapes.bbox(), Some(Rect::from_sides(-5, 0, 10, 20)));
/// ```
pub trait Bbox {
    /// The smallest rectangle containing the shape, or `None` if the shape is empty.
    ///
    /// Points and zero-area rectangles are not empty.
    fn bbox(&self) -> Option<Rect>;
}

impl<T: Bbox> Bbox for &T {
    fn bbox(&self) -> Option<Rect> {
        T::bbox(*self)
    }
}

impl<T: Bbox> Bbox for [T] {
    fn bbox(&self) -> Option<Rect> {
        self.iter()
            .filter_map(|item| item.bbox())
            .reduce(|acc, r| acc.union(r))
    }
}

impl<T: Bbox> Bbox for Vec<T> {
    fn bbox(&self) -> Option<Rect> {
        self.as_slice().bbox()
    }
}

impl Bbox for Option<Rect> {
    fn bbox(&self) -> Option<Rect> {
        *self
    }
}
