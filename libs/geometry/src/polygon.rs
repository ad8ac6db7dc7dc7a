//! Polygons on the database grid.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::rect::Rect;
use crate::transform::{TransformMut, Transformation};

/// A polygon given by its vertices, without a repeated closing vertex.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon with the given vertices.
    pub fn from_verts(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl Bbox for Polygon {
    /// Returns `None` for a polygon without vertices.
    fn bbox(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold(Rect::new(first, first), |r, &p| r.union(Rect::new(p, p))),
        )
    }
}

impl From<Rect> for Polygon {
    fn from(value: Rect) -> Self {
        Self::from_verts(value.corners().to_vec())
    }
}

impl TransformMut for Polygon {
    fn transform_mut(&mut self, trans: Transformation) {
        for p in self.points.iter_mut() {
            p.transform_mut(trans);
        }
    }
}
