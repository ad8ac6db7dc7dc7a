//! An import prelude that re-exports commonly used items.

pub use crate::bbox::Bbox;
pub use crate::point::Point;
pub use crate::polygon::Polygon;
pub use crate::rect::Rect;
pub use crate::transform::{Transform, TransformMut, Transformation};
