//! Barcode and human-readable reticle labels.

use arcstr::ArcStr;
use chrono::NaiveDate;
use gds21::{GdsLibrary, GdsPoint, GdsStrans, GdsStruct, GdsStructRef, GdsUnits};

use crate::barcode::Barcode;
use crate::config::{FacilityConfig, um_to_db};
use crate::error::{Error, Result};
use crate::font;
use crate::library::{LayerSpec, LibraryExt, boundary};
use crate::names::CellNames;
use crate::transform::to_coord;

/// Base name of the cell holding the barcode bars.
pub const BARCODE_CELL: &str = "BARCODE";
/// Base name of the cell holding the human-readable label.
pub const LABEL_CELL: &str = "RETICLELABEL";
/// Base name of the cell holding the date.
pub const DATE_CELL: &str = "DATE";

/// Builds a cell holding `text` drawn as polygons, centered at its origin.
///
/// `height` is the text height in database units.
pub fn text_cell(
    name: impl Into<ArcStr>,
    text: &str,
    layer: LayerSpec,
    height: i64,
) -> Result<GdsStruct> {
    let mut cell = GdsStruct::new(name.into().to_string());
    for rect in font::render(text, height) {
        cell.elems.push(boundary(layer, rect)?);
    }
    Ok(cell)
}

/// Adds the barcode, label, and date cells to `lib` and places them in the target cell.
///
/// Returns the names of the added cells.
pub fn place_labels(
    lib: &mut GdsLibrary,
    barcode: &Barcode,
    date: NaiveDate,
    config: &FacilityConfig,
) -> Result<Vec<ArcStr>> {
    if lib.struct_named(&config.target_cell).is_none() {
        return Err(Error::MissingCell(config.target_cell.clone()));
    }
    let units = lib.units.clone();
    let mut names = CellNames::new(lib.structs.iter().map(|s| ArcStr::from(s.name.as_str())));
    let layer = config.barcode_layer;
    let height = i64::from(to_coord(um_to_db(config.labels.text_height, &units))?);

    let bars = barcode.to_cell(names.fresh(BARCODE_CELL), layer, &config.barcode, &units)?;
    let label = text_cell(names.fresh(LABEL_CELL), barcode.as_str(), layer, height)?;
    let date = text_cell(
        names.fresh(DATE_CELL),
        &date.format("%Y-%m-%d").to_string(),
        layer,
        height,
    )?;

    let refs = [
        reference(&bars, config.barcode.origin, config.barcode.rotation, &units)?,
        reference(&label, config.labels.label_origin, config.labels.rotation, &units)?,
        reference(&date, config.labels.date_origin, config.labels.rotation, &units)?,
    ];
    let added: Vec<ArcStr> = [&bars.name, &label.name, &date.name]
        .map(|n| ArcStr::from(n.as_str()))
        .into();
    tracing::info!(cells = ?added, "adding reticle labels");

    lib.structs.extend([bars, label, date]);
    let target = lib
        .struct_named_mut(&config.target_cell)
        .ok_or_else(|| Error::MissingCell(config.target_cell.clone()))?;
    target.elems.extend(refs.into_iter().map(Into::into));
    Ok(added)
}

fn reference(
    cell: &GdsStruct,
    origin: [f64; 2],
    angle: f64,
    units: &GdsUnits,
) -> Result<GdsStructRef> {
    let xy = GdsPoint::new(
        to_coord(um_to_db(origin[0], units))?,
        to_coord(um_to_db(origin[1], units))?,
    );
    Ok(GdsStructRef {
        name: cell.name.clone(),
        xy,
        strans: (angle != 0.).then(|| GdsStrans {
            angle: Some(angle),
            ..Default::default()
        }),
        ..Default::default()
    })
}
