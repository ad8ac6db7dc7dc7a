//! Merging a design library into a template library.

use std::collections::HashSet;

use arcstr::ArcStr;
use gds21::{GdsElement, GdsLibrary, GdsStructRef};
use indexmap::IndexMap;
use tracing::{Level, span};

use crate::config::FacilityConfig;
use crate::error::{Error, Result};
use crate::hierarchy::DepOrder;
use crate::layer_map::LayerMap;
use crate::library::{LibraryExt, StructExt};
use crate::names::CellNames;
use crate::transform::DesignTransform;

/// The result of [`merge`].
#[derive(Debug, Clone)]
pub struct Merged {
    /// The template with the design added.
    pub library: GdsLibrary,
    /// The name under which the design cell was added.
    pub placed_cell: ArcStr,
    /// Names of all cells copied from the design, in output order.
    pub cells_added: Vec<ArcStr>,
    /// Design cells whose names clashed with template cells, with their new names.
    pub renamed: IndexMap<ArcStr, ArcStr>,
}

/// Copies every design cell into a copy of `template` and places `design_cell`
/// in the facility's target cell.
///
/// Copied cells have their layers remapped by `layer_map`. Cells whose names
/// clash with template cells are renamed, and references to them rewritten.
/// Facility metadata cells are copied only if a design cell references them.
/// The placement reference carries `transform`.
pub fn merge(
    template: &GdsLibrary,
    design: &GdsLibrary,
    design_cell: &str,
    layer_map: &LayerMap,
    transform: &DesignTransform,
    config: &FacilityConfig,
) -> Result<Merged> {
    let span = span!(Level::INFO, "merge", design_cell = %design_cell);
    let _guard = span.enter();

    if template.struct_named(&config.target_cell).is_none() {
        return Err(Error::MissingCell(config.target_cell.clone()));
    }
    if design.struct_named(design_cell).is_none() {
        return Err(Error::MissingCell(design_cell.into()));
    }

    let order = DepOrder::new(design).total_order()?;
    let referenced: HashSet<&String> = design.structs.iter().flat_map(|s| s.references()).collect();

    let mut library = template.clone();
    let mut names = CellNames::new(template.structs.iter().map(|s| ArcStr::from(s.name.as_str())));
    let mut copies = Vec::with_capacity(order.len());
    for strukt in order {
        if config.is_ignored(&strukt.name) && !referenced.contains(&strukt.name) {
            tracing::debug!(cell = %strukt.name, "skipping facility metadata cell");
            continue;
        }
        let mut copy = strukt.clone();
        copy.name = names.assign(&strukt.name).to_string();
        copies.push(copy);
    }

    for copy in copies.iter_mut() {
        layer_map.apply(copy);
        for elem in copy.elems.iter_mut() {
            match elem {
                GdsElement::GdsStructRef(x) => rename(&names, &mut x.name)?,
                GdsElement::GdsArrayRef(x) => rename(&names, &mut x.name)?,
                _ => {}
            }
        }
    }

    let placed_cell = names
        .get(design_cell)
        .cloned()
        .ok_or_else(|| Error::MissingCell(design_cell.into()))?;
    let renamed = names.renamed();
    for (from, to) in renamed.iter() {
        tracing::warn!(%from, %to, "renamed design cell that clashes with the template");
    }
    let cells_added = copies.iter().map(|c| ArcStr::from(c.name.as_str())).collect();
    library.structs.extend(copies);

    let (xy, strans) = transform.to_gds()?;
    let target = library
        .struct_named_mut(&config.target_cell)
        .ok_or_else(|| Error::MissingCell(config.target_cell.clone()))?;
    target.elems.push(
        GdsStructRef {
            name: placed_cell.to_string(),
            xy,
            strans,
            ..Default::default()
        }
        .into(),
    );
    tracing::info!(cell = %placed_cell, target = %config.target_cell, "placed design cell");

    Ok(Merged {
        library,
        placed_cell,
        cells_added,
        renamed,
    })
}

fn rename(names: &CellNames, name: &mut String) -> Result<()> {
    *name = names
        .get(name.as_str())
        .map(|n| n.to_string())
        .ok_or_else(|| Error::MissingCell(ArcStr::from(name.as_str())))?;
    Ok(())
}
