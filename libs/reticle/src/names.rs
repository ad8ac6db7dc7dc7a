//! Assigning unique cell names.

use std::collections::HashSet;

use arcstr::ArcStr;
use indexmap::IndexMap;

/// The cell names in use in a library.
///
/// Names copied in from another library are assigned a fresh name
/// when they clash, and the assignment is remembered so references
/// can be rewritten.
#[derive(Debug, Clone, Default)]
pub struct CellNames {
    names: HashSet<ArcStr>,
    assignments: IndexMap<ArcStr, ArcStr>,
}

impl CellNames {
    /// Creates a name set already holding `existing`.
    pub fn new(existing: impl IntoIterator<Item = ArcStr>) -> Self {
        Self {
            names: existing.into_iter().collect(),
            assignments: IndexMap::new(),
        }
    }

    /// Returns the name assigned to the copied cell `base`, if any.
    pub fn get(&self, base: &str) -> Option<&ArcStr> {
        self.assignments.get(base)
    }

    /// Assigns a name to the copied cell `base` and remembers it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use reticle::names::CellNames;
    /// let mut names = CellNames::new(["top".into()]);
    /// assert_eq!(names.assign("top"), "top_1");
    /// assert_eq!(names.assign("leaf"), "leaf");
    /// assert_eq!(names.get("top").unwrap(), "top_1");
    /// ```
    pub fn assign(&mut self, base: &str) -> ArcStr {
        let name = self.fresh(base);
        self.assignments.insert(base.into(), name.clone());
        name
    }

    /// Allocates an unused name based on `base` without remembering an assignment.
    pub fn fresh(&mut self, base: &str) -> ArcStr {
        let name = if self.names.contains(base) {
            let mut i = 1;
            loop {
                let new_name = arcstr::format!("{}_{}", base, i);
                if !self.names.contains(&new_name) {
                    break new_name;
                }
                i += 1;
            }
        } else {
            base.into()
        };
        self.names.insert(name.clone());
        name
    }

    /// Assignments whose name differs from the original.
    pub fn renamed(&self) -> IndexMap<ArcStr, ArcStr> {
        self.assignments
            .iter()
            .filter(|(base, name)| base != name)
            .map(|(base, name)| (base.clone(), name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_skip_taken_names() {
        let mut names = CellNames::new(["cell".into(), "cell_1".into()]);
        assert_eq!(names.assign("cell"), "cell_2");
        assert_eq!(names.fresh("cell"), "cell_3");
        assert_eq!(names.renamed().get("cell").unwrap(), "cell_2");
    }

    #[test]
    fn unclashed_names_are_not_reported_as_renamed() {
        let mut names = CellNames::new(Vec::<ArcStr>::new());
        names.assign("a");
        assert!(names.renamed().is_empty());
    }
}
