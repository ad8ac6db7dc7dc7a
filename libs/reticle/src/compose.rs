//! End-to-end reticle composition.

use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use chrono::{Local, NaiveDate};
use gds21::GdsLibrary;
use tracing::{Level, span};

use crate::barcode::Barcode;
use crate::config::FacilityConfig;
use crate::error::{Error, Result};
use crate::hierarchy::{cell_bbox, select_design_cell};
use crate::labels::place_labels;
use crate::layer_map::compute_layer_map;
use crate::merge::merge;
use crate::report::{LayerRemap, MergeReport};
use crate::transform::DesignTransform;

/// Reads a layout document.
pub fn load(path: impl AsRef<Path>) -> Result<GdsLibrary> {
    let path = path.as_ref();
    let lib = GdsLibrary::load(path).map_err(|source| Error::FileFormat {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(?path, cells = lib.structs.len(), "loaded layout");
    Ok(lib)
}

/// Writes a layout document, creating parent directories as needed.
pub fn save(lib: &GdsLibrary, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    lib.save(path).map_err(|source| Error::FileFormat {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(?path, "saved layout");
    Ok(())
}

/// Appends a `.gds` extension unless the path already ends with one, ignoring case.
///
/// # Examples
///
/// ```
/// # use std::path::PathBuf;
/// # use reticle::compose::with_gds_extension;
/// assert_eq!(with_gds_extension("out"), PathBuf::from("out.gds"));
/// assert_eq!(with_gds_extension("OUT.GDS"), PathBuf::from("OUT.GDS"));
/// assert_eq!(with_gds_extension("run.v2"), PathBuf::from("run.v2.gds"));
/// ```
pub fn with_gds_extension(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let has_ext = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gds"));
    if has_ext {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".gds");
        PathBuf::from(name)
    }
}

/// Per-run decisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeOptions {
    /// Whether the design is drawn at wafer scale and must be magnified.
    pub wafer_scale: bool,
    /// Whether to mirror the design for the maskless aligner.
    ///
    /// Only the design placement is mirrored. The template, barcode, and
    /// labels keep their orientation so the labels stay readable.
    pub mirror_for_tool: bool,
    /// The barcode label. No labels are added when unset.
    pub barcode: Option<Barcode>,
    /// The design cell to place. Defaults to the design's only top cell.
    pub design_cell: Option<ArcStr>,
    /// The date written on the reticle. Defaults to today.
    pub date: Option<NaiveDate>,
}

/// The output of [`compose`].
#[derive(Debug, Clone)]
pub struct Composition {
    /// The merged layout.
    pub library: GdsLibrary,
    /// A summary of the run.
    pub report: MergeReport,
}

/// The magnification applied to the design.
///
/// Combines the facility ratio (for wafer-scale designs) with the ratio of
/// the design's database unit to the template's.
pub fn scale_factor(
    template: &GdsLibrary,
    design: &GdsLibrary,
    wafer_scale: bool,
    config: &FacilityConfig,
) -> f64 {
    let ratio = if wafer_scale { config.wafer_ratio } else { 1. };
    let units = design.units.db_unit() / template.units.db_unit();
    if (units - 1.).abs() > 1e-9 {
        tracing::info!(
            design = design.units.db_unit(),
            template = template.units.db_unit(),
            "reconciling database units"
        );
    }
    ratio * units
}

/// Merges `design` into `template`.
pub fn compose(
    template: &GdsLibrary,
    design: &GdsLibrary,
    opts: &ComposeOptions,
    config: &FacilityConfig,
) -> Result<Composition> {
    let span = span!(Level::INFO, "compose", template = %template.name, design = %design.name);
    let _guard = span.enter();

    let design_cell = select_design_cell(design, opts.design_cell.as_deref(), config)?;
    let layer_map = compute_layer_map(template, design, &[config.barcode_layer])?;

    let bbox = cell_bbox(design, &design_cell)?;
    let scale = scale_factor(template, design, opts.wafer_scale, config);
    let transform = DesignTransform::compute(bbox, scale, opts.mirror_for_tool)?;

    let merged = merge(template, design, &design_cell, &layer_map, &transform, config)?;
    let mut library = merged.library;
    let mut cells_added = merged.cells_added;

    let mut date = None;
    if let Some(barcode) = &opts.barcode {
        let today = opts.date.unwrap_or_else(|| Local::now().date_naive());
        cells_added.extend(place_labels(&mut library, barcode, today, config)?);
        date = Some(today);
    }

    let report = MergeReport {
        design_cell,
        placed_cell: merged.placed_cell,
        target_cell: config.target_cell.clone(),
        layer_map: LayerRemap::from_map(&layer_map),
        transform,
        design_bbox: bbox,
        cells_added,
        renamed: merged.renamed,
        barcode: opts.barcode.as_ref().map(|b| ArcStr::from(b.as_str())),
        date,
    };
    Ok(Composition { library, report })
}
