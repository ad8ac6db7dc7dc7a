//! Lookups on [`gds21`] libraries, cells, and elements.

use std::collections::BTreeSet;

use gds21::{GdsBoundary, GdsElement, GdsLibrary, GdsPoint, GdsStruct};
use geometry::prelude::Rect;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transform::to_coord;

/// A GDSII (layer, datatype) pair.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LayerSpec {
    /// The layer number.
    pub layer: i16,
    /// The datatype, texttype, nodetype, or boxtype.
    pub datatype: i16,
}

impl LayerSpec {
    /// Creates a new [`LayerSpec`].
    pub const fn new(layer: i16, datatype: i16) -> Self {
        Self { layer, datatype }
    }
}

/// Cell lookups on a [`GdsLibrary`].
pub trait LibraryExt {
    /// The cell named `name`, if any.
    fn struct_named(&self, name: &str) -> Option<&GdsStruct>;
    /// The cell named `name`, if any, mutably.
    fn struct_named_mut(&mut self, name: &str) -> Option<&mut GdsStruct>;
    /// Every (layer, datatype) pair used by an element of the library.
    fn layerspecs(&self) -> BTreeSet<LayerSpec>;
}

impl LibraryExt for GdsLibrary {
    fn struct_named(&self, name: &str) -> Option<&GdsStruct> {
        self.structs.iter().find(|s| s.name.as_str() == name)
    }

    fn struct_named_mut(&mut self, name: &str) -> Option<&mut GdsStruct> {
        self.structs.iter_mut().find(|s| s.name.as_str() == name)
    }

    fn layerspecs(&self) -> BTreeSet<LayerSpec> {
        self.structs
            .iter()
            .flat_map(|s| s.elems.iter())
            .filter_map(ElementExt::layerspec)
            .collect()
    }
}

/// Reference lookups on a [`GdsStruct`].
pub trait StructExt {
    /// Names of the cells this cell instantiates, with repeats, in element order.
    fn references(&self) -> impl Iterator<Item = &String>;
}

impl StructExt for GdsStruct {
    fn references(&self) -> impl Iterator<Item = &String> {
        self.elems.iter().filter_map(|elem| match elem {
            GdsElement::GdsStructRef(x) => Some(&x.name),
            GdsElement::GdsArrayRef(x) => Some(&x.name),
            _ => None,
        })
    }
}

/// Layer access on a [`GdsElement`]. References have no layer.
pub trait ElementExt {
    /// The element's (layer, datatype) pair.
    fn layerspec(&self) -> Option<LayerSpec>;
    /// The element's layer number, mutably.
    fn layer_mut(&mut self) -> Option<&mut i16>;
}

impl ElementExt for GdsElement {
    fn layerspec(&self) -> Option<LayerSpec> {
        let (layer, datatype) = match self {
            GdsElement::GdsBoundary(x) => (x.layer, x.datatype),
            GdsElement::GdsPath(x) => (x.layer, x.datatype),
            GdsElement::GdsTextElem(x) => (x.layer, x.texttype),
            GdsElement::GdsNode(x) => (x.layer, x.nodetype),
            GdsElement::GdsBox(x) => (x.layer, x.boxtype),
            _ => return None,
        };
        Some(LayerSpec::new(layer, datatype))
    }

    fn layer_mut(&mut self) -> Option<&mut i16> {
        match self {
            GdsElement::GdsBoundary(x) => Some(&mut x.layer),
            GdsElement::GdsPath(x) => Some(&mut x.layer),
            GdsElement::GdsTextElem(x) => Some(&mut x.layer),
            GdsElement::GdsNode(x) => Some(&mut x.layer),
            GdsElement::GdsBox(x) => Some(&mut x.layer),
            _ => None,
        }
    }
}

/// A closed boundary outlining `rect`.
pub(crate) fn boundary(layer: LayerSpec, rect: Rect) -> Result<GdsElement> {
    let x0 = to_coord(rect.left() as f64)?;
    let y0 = to_coord(rect.bot() as f64)?;
    let x1 = to_coord(rect.right() as f64)?;
    let y1 = to_coord(rect.top() as f64)?;
    Ok(GdsBoundary {
        layer: layer.layer,
        datatype: layer.datatype,
        xy: GdsPoint::vec(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        ..Default::default()
    }
    .into())
}
