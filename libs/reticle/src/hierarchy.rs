//! Walking GDSII cell hierarchies.

use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;
use gds21::{GdsArrayRef, GdsElement, GdsLibrary, GdsPath, GdsPoint, GdsStruct};
use geometry::prelude::*;
use tracing::{Level, span};

use crate::config::FacilityConfig;
use crate::error::{Error, Result};
use crate::library::{ElementExt, LayerSpec, LibraryExt, StructExt};
use crate::transform::{placement, reference_transformation};

/// A helper for retrieving GDS dependencies in reverse topological order.
///
/// Each item in the ordered return value is guaranteed *not* to instantiate
/// any item which comes later.
#[derive(Debug)]
pub struct DepOrder<'a> {
    lib: &'a GdsLibrary,
    strukts: HashMap<ArcStr, &'a GdsStruct>,
    stack: Vec<&'a GdsStruct>,
    seen: HashSet<ArcStr>,
    visiting: HashSet<ArcStr>,
}

impl<'a> DepOrder<'a> {
    /// Creates a new [`DepOrder`] for a [`GdsLibrary`].
    pub fn new(lib: &'a GdsLibrary) -> Self {
        let strukts = lib.structs.iter().map(|s| (ArcStr::from(s.name.as_str()), s)).collect();
        Self {
            lib,
            strukts,
            stack: Vec::new(),
            seen: HashSet::new(),
            visiting: HashSet::new(),
        }
    }

    /// Returns a reverse topological sort of all cells in the library.
    ///
    /// Ties are broken by file order.
    pub fn total_order(mut self) -> Result<Vec<&'a GdsStruct>> {
        for s in &self.lib.structs {
            self.push(s)?;
        }
        Ok(self.stack)
    }

    /// Returns a cell and all of its dependencies in reverse topological order.
    pub fn cell_order(mut self, cell: &str) -> Result<Vec<&'a GdsStruct>> {
        let strukt = self.lookup(cell)?;
        self.push(strukt)?;
        Ok(self.stack)
    }

    fn lookup(&self, name: &str) -> Result<&'a GdsStruct> {
        self.strukts
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingCell(name.into()))
    }

    /// Adds all of `strukt`'s dependencies, and then `strukt` itself, to the stack.
    fn push(&mut self, strukt: &'a GdsStruct) -> Result<()> {
        if self.seen.contains(strukt.name.as_str()) {
            return Ok(());
        }
        if !self.visiting.insert(ArcStr::from(strukt.name.as_str())) {
            return Err(Error::CellCycle(ArcStr::from(strukt.name.as_str())));
        }
        for name in strukt.references() {
            let child = self.lookup(name)?;
            self.push(child)?;
        }
        self.visiting.remove(strukt.name.as_str());
        self.seen.insert(ArcStr::from(strukt.name.as_str()));
        self.stack.push(strukt);
        Ok(())
    }
}

/// Names of cells that no other cell references, in file order.
///
/// Cells the facility marks as ignored are never top cells.
pub fn top_cells(lib: &GdsLibrary, config: &FacilityConfig) -> Vec<ArcStr> {
    let referenced: HashSet<&String> = lib.structs.iter().flat_map(|s| s.references()).collect();
    lib.structs
        .iter()
        .map(|s| &s.name)
        .filter(|name| !referenced.contains(name) && !config.is_ignored(name))
        .map(|name| ArcStr::from(name.as_str()))
        .collect()
}

/// Chooses the design cell to place in the template.
///
/// A `requested` cell must exist. Otherwise the design must have exactly one top cell.
pub fn select_design_cell(
    lib: &GdsLibrary,
    requested: Option<&str>,
    config: &FacilityConfig,
) -> Result<ArcStr> {
    if let Some(name) = requested {
        return lib
            .struct_named(name)
            .map(|s| ArcStr::from(s.name.as_str()))
            .ok_or_else(|| Error::MissingCell(name.into()));
    }
    let mut tops = top_cells(lib, config);
    match tops.len() {
        0 => Err(Error::NoTopCell),
        1 => Ok(tops.remove(0)),
        _ => Err(Error::AmbiguousTopCell(tops)),
    }
}

/// A polygon in the coordinates of the cell it was flattened into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatShape {
    /// The (layer, datatype) pair of the originating element.
    pub layer: LayerSpec,
    /// The transformed outline.
    pub polygon: Polygon,
}

impl Bbox for FlatShape {
    fn bbox(&self) -> Option<Rect> {
        self.polygon.bbox()
    }
}

/// Returns every shape reachable from `cell`, in that cell's coordinates.
///
/// Boundaries and boxes contribute their outlines. Paths contribute the
/// rectangle enclosing their points, expanded by half the path width and
/// any end extension. Text and node elements do not contribute.
///
/// The result holds one shape per placed instance, so it grows with the
/// product of nested array sizes. Use [`cell_bbox`] when only the extent is needed.
pub fn flatten(lib: &GdsLibrary, cell: &str) -> Result<Vec<FlatShape>> {
    // Validates the hierarchy below `cell` before walking it.
    let order = DepOrder::new(lib).cell_order(cell)?;
    let strukts: HashMap<&str, &GdsStruct> =
        order.iter().map(|s| (s.name.as_str(), *s)).collect();

    let mut shapes = Vec::new();
    flatten_into(&strukts, strukts[cell], Transformation::identity(), &mut shapes);
    Ok(shapes)
}

fn flatten_into(
    strukts: &HashMap<&str, &GdsStruct>,
    strukt: &GdsStruct,
    trans: Transformation,
    out: &mut Vec<FlatShape>,
) {
    let span = span!(Level::TRACE, "flatten", cell = %strukt.name);
    let _guard = span.enter();

    for elem in &strukt.elems {
        let polygon = match elem {
            GdsElement::GdsBoundary(x) => {
                let mut pts = import_points(&x.xy);
                if pts.len() > 1 && pts.first() == pts.last() {
                    pts.pop();
                }
                Polygon::from_verts(pts)
            }
            GdsElement::GdsBox(x) => {
                Polygon::from(Rect::new(import_point(&x.xy[0]), import_point(&x.xy[2])))
            }
            GdsElement::GdsPath(x) => match path_rect(x) {
                Some(rect) => Polygon::from(rect),
                None => continue,
            },
            GdsElement::GdsStructRef(x) => {
                let child = Transformation::cascade(
                    trans,
                    reference_transformation(&x.xy, x.strans.as_ref()),
                );
                flatten_into(strukts, strukts[x.name.as_str()], child, out);
                continue;
            }
            GdsElement::GdsArrayRef(x) => {
                let lattice = Lattice::new(x);
                for origin in lattice.origins() {
                    let inst = placement(origin, x.strans.as_ref());
                    flatten_into(
                        strukts,
                        strukts[x.name.as_str()],
                        Transformation::cascade(trans, inst),
                        out,
                    );
                }
                continue;
            }
            _ => continue,
        };
        if let Some(layer) = elem.layerspec() {
            out.push(FlatShape {
                layer,
                polygon: polygon.transform(trans),
            });
        }
    }
}

/// The bounding box of everything reachable from `cell`, in that cell's coordinates.
///
/// Each cell's box is computed once, children first. A reference contributes
/// its child's box with the reference transform applied to the corners, and an
/// array contributes that box at its four extreme instances. The result is
/// exact for rotations by multiples of 90 degrees and encloses the geometry
/// otherwise.
pub fn cell_bbox(lib: &GdsLibrary, cell: &str) -> Result<Option<Rect>> {
    let order = DepOrder::new(lib).cell_order(cell)?;
    let mut boxes: HashMap<&str, Option<Rect>> = HashMap::with_capacity(order.len());
    for strukt in order {
        let bbox = strukt
            .elems
            .iter()
            .map(|elem| element_bbox(elem, &boxes))
            .collect::<Vec<_>>()
            .bbox();
        tracing::trace!(cell = %strukt.name, ?bbox, "computed cell bounding box");
        boxes.insert(strukt.name.as_str(), bbox);
    }
    Ok(boxes.get(cell).copied().flatten())
}

fn element_bbox(elem: &GdsElement, boxes: &HashMap<&str, Option<Rect>>) -> Option<Rect> {
    match elem {
        GdsElement::GdsBoundary(x) => Polygon::from_verts(import_points(&x.xy)).bbox(),
        GdsElement::GdsBox(x) => Polygon::from_verts(import_points(&x.xy)).bbox(),
        GdsElement::GdsPath(x) => path_rect(x),
        GdsElement::GdsStructRef(x) => {
            let child = boxes.get(x.name.as_str()).copied().flatten()?;
            Some(child.transform(reference_transformation(&x.xy, x.strans.as_ref())))
        }
        GdsElement::GdsArrayRef(x) => {
            let child = boxes.get(x.name.as_str()).copied().flatten()?;
            Lattice::new(x)
                .corners()
                .into_iter()
                .map(|origin| child.transform(placement(origin, x.strans.as_ref())))
                .reduce(Rect::union)
        }
        _ => None,
    }
}

/// The rectangle enclosing a path's points, expanded by its width and end extensions.
fn path_rect(path: &GdsPath) -> Option<Rect> {
    let rect = Polygon::from_verts(import_points(&path.xy)).bbox()?;
    let half_width = i64::from(path.width.unwrap_or_default()).abs() / 2;
    let extension = match path.path_type {
        Some(2) => half_width,
        Some(4) => i64::from(path.begin_extn.unwrap_or_default())
            .max(i64::from(path.end_extn.unwrap_or_default()))
            .max(0),
        _ => 0,
    };
    Some(rect.expand_all(half_width + extension))
}

/// The instance origins of an array reference.
///
/// Instance `(ix, iy)` sits at `p0 + ix * (p1 - p0) / cols + iy * (p2 - p0) / rows`,
/// rounded toward zero, so pitches that do not divide the span do not accumulate error.
#[derive(Debug, Clone, Copy)]
struct Lattice {
    p0: Point,
    col_span: Point,
    row_span: Point,
    cols: i64,
    rows: i64,
}

impl Lattice {
    fn new(aref: &GdsArrayRef) -> Self {
        let [p0, p1, p2] = [&aref.xy[0], &aref.xy[1], &aref.xy[2]].map(import_point);
        Self {
            p0,
            col_span: Point::new(p1.x - p0.x, p1.y - p0.y),
            row_span: Point::new(p2.x - p0.x, p2.y - p0.y),
            cols: i64::from(aref.cols.max(1)),
            rows: i64::from(aref.rows.max(1)),
        }
    }

    fn origin(&self, ix: i64, iy: i64) -> Point {
        Point::new(
            self.p0.x + ix * self.col_span.x / self.cols + iy * self.row_span.x / self.rows,
            self.p0.y + ix * self.col_span.y / self.cols + iy * self.row_span.y / self.rows,
        )
    }

    fn origins(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.cols).flat_map(move |ix| (0..self.rows).map(move |iy| self.origin(ix, iy)))
    }

    /// Each coordinate of an origin is monotonic in `ix` and in `iy`,
    /// so the extremes lie at these four instances.
    fn corners(&self) -> [Point; 4] {
        let (ix, iy) = (self.cols - 1, self.rows - 1);
        [
            self.origin(0, 0),
            self.origin(ix, 0),
            self.origin(0, iy),
            self.origin(ix, iy),
        ]
    }
}

fn import_point(pt: &GdsPoint) -> Point {
    Point::new(pt.x.into(), pt.y.into())
}

fn import_points(pts: &[GdsPoint]) -> Vec<Point> {
    pts.iter().map(import_point).collect()
}
