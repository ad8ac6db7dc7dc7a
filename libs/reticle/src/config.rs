//! Facility constants.
//!
//! Lengths and positions are given in micrometers and converted to
//! database units of the template at the point of use.

use std::path::Path;

use arcstr::ArcStr;
use gds21::GdsUnits;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::library::LayerSpec;

/// Constants describing a fabrication facility's reticle template.
///
/// # Examples
///
/// ```
/// # use reticle::config::FacilityConfig;
/// let config = FacilityConfig::from_toml_str(r#"
///     wafer_ratio = 5.0
///     target_cell = "stepper_template"
/// "#).unwrap();
/// assert_eq!(config.wafer_ratio, 5.0);
/// assert_eq!(config.barcode_layer.layer, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacilityConfig {
    /// Magnification from wafer coordinates to reticle coordinates.
    pub wafer_ratio: f64,
    /// The template cell that receives the design and labels.
    pub target_cell: ArcStr,
    /// The layer holding the barcode and text labels.
    pub barcode_layer: LayerSpec,
    /// Cells that never count as design top cells.
    pub ignored_cells: Vec<ArcStr>,
    /// Barcode bar dimensions and placement.
    pub barcode: BarcodeGeometry,
    /// Human-readable label dimensions and placement.
    pub labels: LabelGeometry,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            wafer_ratio: 4.0,
            target_cell: arcstr::literal!("asml_template"),
            barcode_layer: LayerSpec::new(4, 0),
            ignored_cells: vec![arcstr::literal!("$$$CONTEXT_INFO$$$")],
            barcode: BarcodeGeometry::default(),
            labels: LabelGeometry::default(),
        }
    }
}

impl FacilityConfig {
    /// Parses a configuration from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| Error::ConfigRead {
            path: path.to_path_buf(),
            err,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(?path, ?config, "loaded facility configuration");
        Ok(config)
    }

    /// Returns `true` if the named cell is facility metadata rather than design content.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_cells.iter().any(|c| c == name)
    }
}

/// Code 39 bar widths and barcode placement, in micrometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarcodeGeometry {
    /// Width of a wide bar.
    pub wide_bar: f64,
    /// Width of a narrow bar.
    pub narrow_bar: f64,
    /// Width of a wide space.
    pub wide_gap: f64,
    /// Width of a narrow space.
    pub narrow_gap: f64,
    /// Length of every bar.
    pub bar_height: f64,
    /// Placement of the barcode cell origin within the target cell.
    pub origin: [f64; 2],
    /// Counterclockwise rotation of the barcode, in degrees.
    pub rotation: f64,
}

impl Default for BarcodeGeometry {
    fn default() -> Self {
        Self {
            wide_bar: 450.,
            narrow_bar: 200.,
            wide_gap: 450.,
            narrow_gap: 200.,
            bar_height: 5000.,
            // 8 mm quiet zone below the label field.
            origin: [69000., 45300.],
            rotation: -90.,
        }
    }
}

/// Text label size and placement, in micrometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelGeometry {
    /// Height of the label text.
    pub text_height: f64,
    /// Placement of the human-readable barcode label.
    pub label_origin: [f64; 2],
    /// Placement of the date label.
    pub date_origin: [f64; 2],
    /// Counterclockwise rotation of both labels, in degrees.
    pub rotation: f64,
}

impl Default for LabelGeometry {
    fn default() -> Self {
        Self {
            text_height: 4000.,
            label_origin: [-69500., -37500.],
            date_origin: [-69500., 37500.],
            rotation: 90.,
        }
    }
}

/// Converts a length in micrometers to database units.
pub(crate) fn um_to_db(um: f64, units: &GdsUnits) -> f64 {
    um * 1e-6 / units.db_unit()
}
