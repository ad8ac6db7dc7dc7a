//! Run summaries.

use arcstr::ArcStr;
use chrono::NaiveDate;
use geometry::prelude::Rect;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::layer_map::LayerMap;
use crate::transform::DesignTransform;

/// A summary of one reticle composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    /// The design cell that was placed.
    pub design_cell: ArcStr,
    /// The name of the placed cell in the output.
    pub placed_cell: ArcStr,
    /// The template cell holding the placement.
    pub target_cell: ArcStr,
    /// Design layer numbers and their replacements, including unchanged layers.
    pub layer_map: Vec<LayerRemap>,
    /// The placement transform.
    pub transform: DesignTransform,
    /// The design's bounding box before transformation, in design database units.
    pub design_bbox: Option<Rect>,
    /// Names of all cells added to the template.
    pub cells_added: Vec<ArcStr>,
    /// Design cells renamed to avoid template cells.
    pub renamed: IndexMap<ArcStr, ArcStr>,
    /// The barcode label, if one was added.
    pub barcode: Option<ArcStr>,
    /// The date written on the reticle, if labels were added.
    pub date: Option<NaiveDate>,
}

/// One layer map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRemap {
    /// The design layer number.
    pub from: i16,
    /// The layer number in the output.
    pub to: i16,
}

impl LayerRemap {
    /// Lists every entry of `map`.
    pub fn from_map(map: &LayerMap) -> Vec<Self> {
        map.iter().map(|(from, to)| Self { from, to }).collect()
    }
}

impl MergeReport {
    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
