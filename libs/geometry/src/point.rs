//! Points on the database grid.

use serde::{Deserialize, Serialize};

use crate::transform::{TransformMut, Transformation};

/// A point in database units.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point {
    /// The x-coordinate.
    pub x: i64,
    /// The y-coordinate.
    pub y: i64,
}

impl Point {
    /// Creates a point at `(x, y)`.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }
}

/// Transformed points are rounded back onto the grid.
impl TransformMut for Point {
    fn transform_mut(&mut self, trans: Transformation) {
        let (x, y) = trans.apply(self.x as f64, self.y as f64);
        *self = Self::new(x.round() as i64, y.round() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    #[test]
    fn transformed_points_round_to_nearest() {
        let trans = Transformation::builder().mag(0.5).build();
        assert_eq!(Point::new(3, -3).transform(trans), Point::new(2, -2));
    }
}
