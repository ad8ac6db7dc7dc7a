//! Affine transformations of the plane.

use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

use crate::point::Point;

/// An affine transformation `x -> A x + b`.
///
/// Any chain of GDSII placements (reflection about the x-axis, magnification,
/// rotation, then translation) composes into one of these without loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    /// Row-major linear part.
    pub(crate) a: [[f64; 2]; 2],
    /// Translation applied after the linear part.
    pub(crate) b: [f64; 2],
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    /// The transformation that leaves everything in place.
    pub fn identity() -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [0., 0.],
        }
    }

    /// Returns a new [`TransformationBuilder`].
    #[inline]
    pub fn builder() -> TransformationBuilder {
        TransformationBuilder::default()
    }

    /// Composes `child` into the coordinate frame of `parent`.
    ///
    /// The result applies `child` first. Not commutative.
    pub fn cascade(parent: Transformation, child: Transformation) -> Transformation {
        let mut b = matvec(&parent.a, &child.b);
        b[0] += parent.b[0];
        b[1] += parent.b[1];
        let a = matmul(&parent.a, &child.a);
        Self { a, b }
    }

    /// Maps the point `(x, y)`.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let trans = Transformation::builder().mag(4.).point(Point::new(10, 0)).build();
    /// assert_eq!(trans.apply(1., 2.), (14., 8.));
    /// ```
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [x, y] = matvec(&self.a, &[x, y]);
        (x + self.b[0], y + self.b[1])
    }
}

impl AbsDiffEq for Transformation {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.a
            .iter()
            .flatten()
            .chain(self.b.iter())
            .zip(other.a.iter().flatten().chain(other.b.iter()))
            .all(|(x, y)| x.abs_diff_eq(y, epsilon))
    }
}

impl RelativeEq for Transformation {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.a
            .iter()
            .flatten()
            .chain(self.b.iter())
            .zip(other.a.iter().flatten().chain(other.b.iter()))
            .all(|(x, y)| x.relative_eq(y, epsilon, max_relative))
    }
}

/// Builds a [`Transformation`] in GDSII order: reflect, magnify, rotate, translate.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationBuilder {
    x: f64,
    y: f64,
    reflect_vert: bool,
    angle: f64,
    mag: f64,
}

impl Default for TransformationBuilder {
    fn default() -> Self {
        Self {
            x: 0.,
            y: 0.,
            reflect_vert: false,
            angle: 0.,
            mag: 1.,
        }
    }
}

impl TransformationBuilder {
    /// Sets the translation.
    pub fn point(&mut self, point: Point) -> &mut Self {
        self.x = point.x as f64;
        self.y = point.y as f64;
        self
    }

    /// Sets the counterclockwise rotation in degrees.
    pub fn angle(&mut self, angle: f64) -> &mut Self {
        self.angle = angle;
        self
    }

    /// Sets whether to reflect about the x-axis before rotating.
    pub fn reflect_vert(&mut self, reflect_vert: bool) -> &mut Self {
        self.reflect_vert = reflect_vert;
        self
    }

    /// Sets the magnification.
    pub fn mag(&mut self, mag: f64) -> &mut Self {
        self.mag = mag;
        self
    }

    /// Builds the [`Transformation`].
    pub fn build(&mut self) -> Transformation {
        let sin = self.angle.to_radians().sin() * self.mag;
        let cos = self.angle.to_radians().cos() * self.mag;
        let (sin_refl, cos_refl) = if self.reflect_vert {
            (sin, -cos)
        } else {
            (-sin, cos)
        };
        Transformation {
            a: [[cos, sin_refl], [sin, cos_refl]],
            b: [self.x, self.y],
        }
    }
}

fn matmul(a: &[[f64; 2]; 2], b: &[[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

fn matvec(a: &[[f64; 2]; 2], b: &[f64; 2]) -> [f64; 2] {
    [
        a[0][0] * b[0] + a[0][1] * b[1],
        a[1][0] * b[0] + a[1][1] * b[1],
    ]
}

/// Shapes that can be moved in place by a [`Transformation`].
pub trait TransformMut {
    /// Applies `trans` to `self`.
    fn transform_mut(&mut self, trans: Transformation);
}

/// Shapes that can be moved by value. Blanket-implemented for every [`TransformMut`].
pub trait Transform: TransformMut + Sized {
    /// Returns `self` transformed by `trans`.
    #[inline]
    fn transform(mut self, trans: Transformation) -> Self {
        self.transform_mut(trans);
        self
    }
}

impl<T: TransformMut + Sized> Transform for T {}
