//! Code 39 reticle barcodes.

use std::fmt;
use std::str::FromStr;

use arcstr::ArcStr;
use gds21::{GdsStruct, GdsUnits};
use geometry::prelude::Rect;
use serde::{Deserialize, Serialize};

use crate::config::{BarcodeGeometry, um_to_db};
use crate::error::{Error, Result};
use crate::library::{LayerSpec, boundary};
use crate::transform::to_coord;

/// The longest label the reticle barcode field holds.
pub const MAX_LEN: usize = 12;

/// Bar and space pattern framing every barcode.
const START_STOP: &str = "NwNnWnWnNn";

/// Returns the bar/space pattern of a character.
///
/// `W`/`N` are wide and narrow bars; `w`/`n` are wide and narrow spaces.
/// Each pattern ends with the inter-character space.
fn pattern(c: char) -> Option<&'static str> {
    Some(match c {
        'A' => "WnNnNwNnWn",
        'B' => "NnWnNwNnWn",
        'C' => "WnWnNwNnNn",
        'D' => "NnNnWwNnWn",
        'E' => "WnNnWwNnNn",
        'F' => "NnWnWwNnNn",
        'G' => "NnNnNwWnWn",
        'H' => "WnNnNwWnNn",
        'I' => "NnWnNwWnNn",
        'J' => "NnNnWwWnNn",
        'K' => "WnNnNnNwWn",
        'L' => "NnWnNnNwWn",
        'M' => "WnWnNnNwNn",
        'N' => "NnNnWnNwWn",
        'O' => "WnNnWnNwNn",
        'P' => "NnWnWnNwNn",
        'Q' => "NnNnNnWwWn",
        'R' => "WnNnNnWwNn",
        'S' => "NnWnNnWwNn",
        'T' => "NnNnWnWwNn",
        'U' => "WwNnNnNnWn",
        'V' => "NwWnNnNnWn",
        'W' => "WwWnNnNnNn",
        'X' => "NwNnWnNnWn",
        'Y' => "WwNnWnNnNn",
        'Z' => "NwWnWnNnNn",
        '1' => "WnNwNnNnWn",
        '2' => "NnWwNnNnWn",
        '3' => "WnWwNnNnNn",
        '4' => "NnNwWnNnWn",
        '5' => "WnNwWnNnNn",
        '6' => "NnWwWnNnNn",
        '7' => "NnNwNnWnWn",
        '8' => "WnNwNnWnNn",
        '9' => "NnWwNnWnNn",
        '0' => "NnNwWnWnNn",
        '-' => "NwNnNnWnWn",
        '.' => "WwNnNnWnNn",
        '$' => "NwNwNwNnNn",
        '/' => "NwNwNnNwNn",
        '+' => "NwNnNwNwNn",
        '%' => "NnNwNwNwNn",
        ' ' => "NwWnNnWnNn",
        _ => return None,
    })
}

/// A validated barcode label.
///
/// Labels are upper-cased on construction and hold 1 to 12 characters
/// from `A-Z`, `0-9`, space, and `- . $ / + %`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(ArcStr);

impl Barcode {
    /// Validates and normalizes a label.
    ///
    /// # Examples
    ///
    /// ```
    /// # use reticle::barcode::Barcode;
    /// assert_eq!(Barcode::new("ab-12").unwrap().as_str(), "AB-12");
    /// assert!(Barcode::new("").is_err());
    /// assert!(Barcode::new("A_B").is_err());
    /// ```
    pub fn new(label: &str) -> Result<Self> {
        let label = label.to_uppercase();
        let len = label.chars().count();
        if !(1..=MAX_LEN).contains(&len) {
            return Err(Error::InvalidBarcodeLength(len));
        }
        if let Some(c) = label.chars().find(|&c| pattern(c).is_none()) {
            return Err(Error::InvalidBarcodeCharacter(c));
        }
        Ok(Self(label.into()))
    }

    /// The normalized label.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full bar/space pattern, including start and stop characters.
    fn modules(&self) -> impl Iterator<Item = char> + '_ {
        // Every character was validated on construction.
        let body = self.0.chars().filter_map(pattern);
        std::iter::once(START_STOP)
            .chain(body)
            .chain(std::iter::once(START_STOP))
            .flat_map(str::chars)
    }

    /// The bars of the barcode as `(start, width)` pairs along x, in micrometers.
    ///
    /// The first bar starts at zero.
    pub fn bars(&self, geometry: &BarcodeGeometry) -> Vec<(f64, f64)> {
        let mut x = 0.;
        let mut bars = Vec::new();
        for module in self.modules() {
            let (width, is_bar) = match module {
                'W' => (geometry.wide_bar, true),
                'N' => (geometry.narrow_bar, true),
                'w' => (geometry.wide_gap, false),
                _ => (geometry.narrow_gap, false),
            };
            if is_bar {
                bars.push((x, width));
            }
            x += width;
        }
        bars
    }

    /// Builds a cell holding the barcode's bars, vertically centered on the x-axis.
    pub fn to_cell(
        &self,
        name: impl Into<ArcStr>,
        layer: LayerSpec,
        geometry: &BarcodeGeometry,
        units: &GdsUnits,
    ) -> Result<GdsStruct> {
        let mut cell = GdsStruct::new(name.into().to_string());
        let half_height = i64::from(to_coord(um_to_db(geometry.bar_height, units) / 2.)?);
        for (start, width) in self.bars(geometry) {
            let x0 = i64::from(to_coord(um_to_db(start, units))?);
            let x1 = i64::from(to_coord(um_to_db(start + width, units))?);
            let bar = Rect::from_sides(x0, -half_height, x1, half_height);
            cell.elems.push(boundary(layer, bar)?);
        }
        Ok(cell)
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Barcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Barcode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn every_pattern_has_five_bars_and_three_wide_modules() {
        let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-.$/+% ";
        for c in alphabet.chars() {
            let p = pattern(c).unwrap();
            assert_eq!(p.len(), 10, "pattern for {c:?}");
            assert_eq!(p.chars().filter(|m| m.is_uppercase()).count(), 5);
            assert_eq!(
                p.chars().filter(|m| m.eq_ignore_ascii_case(&'w')).count(),
                3,
                "pattern for {c:?}"
            );
        }
    }

    #[test]
    fn labels_are_validated() {
        assert!(matches!(
            Barcode::new(""),
            Err(Error::InvalidBarcodeLength(0))
        ));
        assert!(matches!(
            Barcode::new("ABCDEFGHIJKLM"),
            Err(Error::InvalidBarcodeLength(13))
        ));
        assert!(matches!(
            Barcode::new("AB#"),
            Err(Error::InvalidBarcodeCharacter('#'))
        ));
        assert_eq!(Barcode::new("run 7").unwrap().to_string(), "RUN 7");
    }

    #[test]
    fn bars_follow_start_pattern() {
        let geometry = BarcodeGeometry::default();
        let bars = Barcode::new("A").unwrap().bars(&geometry);
        // Start, "A", and stop each contribute five bars.
        assert_eq!(bars.len(), 15);
        // Start pattern: narrow bar, wide gap, narrow bar, narrow gap, wide bar.
        assert_relative_eq!(bars[0].0, 0.);
        assert_relative_eq!(bars[0].1, 200.);
        assert_relative_eq!(bars[1].0, 650.);
        assert_relative_eq!(bars[2].0, 1050.);
        assert_relative_eq!(bars[2].1, 450.);

        let (last_start, last_width) = bars[14];
        // Three 10-module patterns with three wide modules each, minus the trailing narrow gap.
        let total = 3. * (3. * 450. + 7. * 200.) - 200.;
        assert_relative_eq!(last_start + last_width, total, epsilon = 1e-9);
    }

    #[test]
    fn cell_bars_are_centered_vertically() {
        let geometry = BarcodeGeometry::default();
        let units = GdsUnits::new(1e-3, 1e-9);
        let cell = Barcode::new("Z9")
            .unwrap()
            .to_cell("BARCODE", LayerSpec::new(4, 0), &geometry, &units)
            .unwrap();
        assert_eq!(cell.elems.len(), 20);
        let gds21::GdsElement::GdsBoundary(first) = &cell.elems[0] else {
            panic!("expected a boundary");
        };
        assert_eq!(first.layer, 4);
        assert_eq!(first.xy[0], gds21::GdsPoint::new(0, -2_500_000));
        assert_eq!(first.xy[2], gds21::GdsPoint::new(200_000, 2_500_000));
    }

    #[test]
    fn barcodes_deserialize_with_validation() {
        let ok: Barcode = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(ok.as_str(), "ABC");
        assert!(serde_json::from_str::<Barcode>("\"a*b\"").is_err());
    }
}
