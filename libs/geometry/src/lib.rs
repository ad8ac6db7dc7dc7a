//! Integer layout geometry and the affine transformations GDSII references apply to it.
//!
//! # Examples
//!
//! Magnify a [rectangle](crate::rect::Rect) about the origin, then shift it:
//!
//! ```
//! # use geometry::prelude::*;
//! let pad = Rect::from_sides(10, 20, 30, 40);
//! let trans = Transformation::builder().point(Point::new(5, 0)).mag(2.).build();
//! assert_eq!(pad.transform(trans), Rect::from_sides(25, 40, 65, 80));
//! ```
#![warn(missing_docs)]

pub mod bbox;
pub mod point;
pub mod polygon;
pub mod prelude;
pub mod rect;
pub mod transform;
