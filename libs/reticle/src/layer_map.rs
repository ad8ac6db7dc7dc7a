//! Layer conflict resolution.

use std::collections::{BTreeMap, BTreeSet};

use gds21::{GdsLibrary, GdsStruct};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::library::{ElementExt, LayerSpec, LibraryExt};

/// A mapping from design layer numbers to collision-free layer numbers.
///
/// Datatypes are never changed: `(L, d)` maps to `(map(L), d)`.
/// Layer numbers absent from the map are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMap {
    map: BTreeMap<i16, i16>,
}

impl LayerMap {
    /// Builds a layer map for `design` layers so that no mapped layer
    /// collides with a `taken` layer or with another mapped layer.
    ///
    /// Design layers are visited in ascending order. A layer that is free
    /// keeps its number; a colliding layer receives the smallest unused
    /// non-negative number. Either way the chosen number becomes taken.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::collections::BTreeSet;
    /// # use reticle::layer_map::LayerMap;
    /// let template = BTreeSet::from([0, 1]);
    /// let design = BTreeSet::from([1, 2]);
    /// let map = LayerMap::compute(&template, &design).unwrap();
    /// assert_eq!(map.get(1), 2);
    /// assert_eq!(map.get(2), 3);
    /// ```
    pub fn compute(taken: &BTreeSet<i16>, design: &BTreeSet<i16>) -> Result<Self> {
        let mut taken = taken.clone();
        let mut map = BTreeMap::new();
        // The smallest unused number never decreases as `taken` grows.
        let mut next_free: i16 = 0;

        for &layer in design {
            let target = if taken.contains(&layer) {
                while taken.contains(&next_free) {
                    next_free = next_free
                        .checked_add(1)
                        .ok_or(Error::LayerSpaceExhausted(layer))?;
                }
                tracing::info!(from = layer, to = next_free, "remapping conflicting layer");
                next_free
            } else {
                layer
            };
            taken.insert(target);
            map.insert(layer, target);
        }

        Ok(Self { map })
    }

    /// The replacement for `layer`.
    pub fn get(&self, layer: i16) -> i16 {
        self.map.get(&layer).copied().unwrap_or(layer)
    }

    /// All entries, including layers that keep their number.
    pub fn iter(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.map.iter().map(|(&k, &v)| (k, v))
    }

    /// Entries whose layer number changes.
    pub fn remapped(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.iter().filter(|(k, v)| k != v)
    }

    /// Returns `true` if no layer changes number.
    pub fn is_identity(&self) -> bool {
        self.remapped().next().is_none()
    }

    /// Rewrites the layer of every layered element in `strukt`.
    pub fn apply(&self, strukt: &mut GdsStruct) {
        for elem in strukt.elems.iter_mut() {
            if let Some(layer) = elem.layer_mut() {
                *layer = self.get(*layer);
            }
        }
    }
}

/// The set of layer numbers used anywhere in `lib`.
pub fn layer_numbers(lib: &GdsLibrary) -> BTreeSet<i16> {
    lib.layerspecs().into_iter().map(|spec| spec.layer).collect()
}

/// Computes a layer map for `design` against `template`.
///
/// `reserved` layers are treated as if the template used them.
pub fn compute_layer_map(
    template: &GdsLibrary,
    design: &GdsLibrary,
    reserved: &[LayerSpec],
) -> Result<LayerMap> {
    let mut taken = layer_numbers(template);
    taken.extend(reserved.iter().map(|spec| spec.layer));
    LayerMap::compute(&taken, &layer_numbers(design))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use gds21::{GdsBoundary, GdsPoint, GdsTextElem};

    use super::*;

    fn lib_with_layers(name: &str, specs: &[(i16, i16)]) -> GdsLibrary {
        let mut lib = GdsLibrary::new(name);
        let mut cell = GdsStruct::new("top");
        for &(layer, datatype) in specs {
            cell.elems.push(
                GdsBoundary {
                    layer,
                    datatype,
                    xy: GdsPoint::vec(&[(0, 0), (1, 0), (1, 1), (0, 0)]),
                    ..Default::default()
                }
                .into(),
            );
        }
        lib.structs.push(cell);
        lib
    }

    #[test]
    fn conflicting_layers_take_smallest_unused() {
        let map = LayerMap::compute(&BTreeSet::from([0, 1]), &BTreeSet::from([1, 2])).unwrap();
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn free_layers_are_unchanged() {
        let map = LayerMap::compute(&BTreeSet::from([0, 1]), &BTreeSet::from([5, 7])).unwrap();
        assert!(map.is_identity());
        assert_eq!(map.get(5), 5);
        assert_eq!(map.get(42), 42);
    }

    #[test]
    fn layer_map_is_injective_and_avoids_template() {
        let template = BTreeSet::from([0, 1, 2, 3, 10, 11, 63]);
        let design = BTreeSet::from([1, 2, 3, 4, 5, 10, 12, 63, 64]);
        let map = LayerMap::compute(&template, &design).unwrap();

        let image: BTreeSet<i16> = design.iter().map(|&l| map.get(l)).collect();
        assert_eq!(image.len(), design.len());
        assert!(image.is_disjoint(&template));
    }

    #[test]
    fn exhausted_layer_space_is_an_error() {
        let template: BTreeSet<i16> = (0..=i16::MAX).collect();
        let err = LayerMap::compute(&template, &BTreeSet::from([7])).unwrap_err();
        assert!(matches!(err, Error::LayerSpaceExhausted(7)));
    }

    #[test]
    fn datatypes_are_preserved() {
        let template = lib_with_layers("template", &[(1, 0)]);
        let mut design = lib_with_layers("design", &[(1, 5), (2, 0)]);
        let map = compute_layer_map(&template, &design, &[]).unwrap();
        map.apply(&mut design.structs[0]);

        let specs: Vec<_> = design.layerspecs().into_iter().collect();
        assert_eq!(specs, vec![LayerSpec::new(2, 5), LayerSpec::new(3, 0)]);
    }

    #[test]
    fn reserved_layers_count_as_taken() {
        let template = lib_with_layers("template", &[(0, 0)]);
        let mut design = lib_with_layers("design", &[(4, 0)]);
        design.structs[0].elems.push(
            GdsTextElem {
                string: "label".into(),
                layer: 1,
                ..Default::default()
            }
            .into(),
        );
        let map = compute_layer_map(&template, &design, &[LayerSpec::new(4, 0)]).unwrap();
        assert_eq!(map.get(1), 1);
        assert_eq!(map.get(4), 2);
    }
}
