//! Design placement transforms.

use gds21::{GdsPoint, GdsStrans};
use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The transform placing a design inside the template.
///
/// Maps a design point `p` to `F(scale * p) + offset`, where `F` negates x
/// when `mirrored` is set. The offset is chosen so that the scaled design's
/// bounding box is centered on the origin before the mirror is applied,
/// which leaves it centered afterwards too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignTransform {
    /// Uniform magnification, including any database-unit conversion.
    pub scale: f64,
    /// Whether x is negated for mirrored lithography.
    pub mirrored: bool,
    /// Translation in template database units.
    pub offset: Point,
}

impl Default for DesignTransform {
    fn default() -> Self {
        Self {
            scale: 1.,
            mirrored: false,
            offset: Point::zero(),
        }
    }
}

impl DesignTransform {
    /// Computes the transform for a design with bounding box `bbox`,
    /// in design coordinates.
    ///
    /// An empty design is scaled and mirrored but not translated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// # use reticle::transform::DesignTransform;
    /// let bbox = Rect::from_sides(10, 30, 20, 50);
    /// let t = DesignTransform::compute(Some(bbox), 4., false).unwrap();
    /// assert_eq!(bbox.transform(t.transformation()), Rect::from_sides(-20, -40, 20, 40));
    /// ```
    pub fn compute(bbox: Option<Rect>, scale: f64, mirrored: bool) -> Result<Self> {
        let Some(bbox) = bbox else {
            tracing::warn!("design has no geometry; skipping centering");
            return Ok(Self {
                scale,
                mirrored,
                offset: Point::zero(),
            });
        };

        let (cx, cy) = bbox.center_f64();
        let (cx, cy) = (cx * scale, cy * scale);
        // The mirror is applied about the post-centering origin.
        let ox = if mirrored { cx } else { -cx };
        let oy = -cy;
        let offset = Point::new(to_coord(ox)? as i64, to_coord(oy)? as i64);

        tracing::info!(
            scale,
            mirrored,
            x = offset.x,
            y = offset.y,
            "computed design transform"
        );
        Ok(Self {
            scale,
            mirrored,
            offset,
        })
    }

    /// The equivalent geometric [`Transformation`].
    pub fn transformation(&self) -> Transformation {
        // Reflecting about the x-axis and rotating by 180 degrees negates x.
        Transformation::builder()
            .point(self.offset)
            .reflect_vert(self.mirrored)
            .angle(if self.mirrored { 180. } else { 0. })
            .mag(self.scale)
            .build()
    }

    /// The GDSII reference origin and transformation flags for this transform.
    pub fn to_gds(&self) -> Result<(GdsPoint, Option<GdsStrans>)> {
        let xy = GdsPoint::new(
            to_coord(self.offset.x as f64)?,
            to_coord(self.offset.y as f64)?,
        );
        let identity_mag = (self.scale - 1.).abs() < f64::EPSILON;
        if identity_mag && !self.mirrored {
            return Ok((xy, None));
        }
        let strans = GdsStrans {
            reflected: self.mirrored,
            mag: (!identity_mag).then_some(self.scale),
            angle: self.mirrored.then_some(180.),
            ..Default::default()
        };
        Ok((xy, Some(strans)))
    }
}

/// The transformation applied by a reference at `xy` with flags `strans`.
///
/// Absolute magnification and angle flags are treated as relative.
pub fn reference_transformation(xy: &GdsPoint, strans: Option<&GdsStrans>) -> Transformation {
    placement(Point::new(xy.x.into(), xy.y.into()), strans)
}

/// The transformation applied by a reference placed at `offset`.
pub(crate) fn placement(offset: Point, strans: Option<&GdsStrans>) -> Transformation {
    let Some(strans) = strans else {
        return Transformation::builder().point(offset).build();
    };
    if strans.abs_mag || strans.abs_angle {
        tracing::warn!(
            ?strans,
            "absolute magnification/angle flags are treated as relative"
        );
    }
    Transformation::builder()
        .point(offset)
        .reflect_vert(strans.reflected)
        .angle(strans.angle.unwrap_or_default())
        .mag(strans.mag.unwrap_or(1.))
        .build()
}

/// Rounds `value` to the nearest GDSII coordinate.
pub(crate) fn to_coord(value: f64) -> Result<i32> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64 {
        Ok(rounded as i32)
    } else {
        Err(Error::CoordinateOverflow(value))
    }
}
