//! # Constraint Store
//!
//! In-memory table of per-producer filter fragments (grouped) and
//! per-producer sort specs. Pure data: the store has no behavior beyond
//! insert/replace and the read surface the composer iterates.
//!
//! ## Ordering
//!
//! Groups, fragments within a group, and sort entries all compose in
//! insertion order, so the store keeps `IndexMap`s rather than sorted maps.

use crate::types::{ConstraintFragment, GroupId, ProducerId, SortSpec};
use indexmap::IndexMap;

/// Mutable table of all current producer contributions for one target view.
///
/// The store always contains the default group, and grows a bucket per named
/// group on first use. Fragments from departed producers are never garbage
/// collected; a producer that wants to stop filtering writes an empty
/// fragment under its own id.
#[derive(Debug, Clone)]
pub struct ConstraintStore {
    constraints: IndexMap<GroupId, IndexMap<ProducerId, ConstraintFragment>>,
    sorting: IndexMap<ProducerId, SortSpec>,
}

impl ConstraintStore {
    /// Create an empty store seeded with the default group.
    #[must_use]
    pub fn new() -> Self {
        let mut constraints = IndexMap::new();
        constraints.insert(GroupId::default_group(), IndexMap::new());
        Self {
            constraints,
            sorting: IndexMap::new(),
        }
    }

    /// Insert or overwrite `producer`'s fragment under `group`.
    ///
    /// The group id is already normalized by construction (trim, empty maps
    /// to the default group). No validation of the fragment beyond its tag;
    /// writing does not itself trigger scheduling.
    pub fn set_constraint(
        &mut self,
        producer: ProducerId,
        fragment: ConstraintFragment,
        group: GroupId,
    ) {
        self.constraints
            .entry(group)
            .or_insert_with(IndexMap::new)
            .insert(producer, fragment);
    }

    /// Replace `producer`'s sort entry, preserving other producers' entries.
    ///
    /// Last writer wins per producer: only the most recent spec registered
    /// under a given id survives, while independent producers keep theirs.
    pub fn set_sorting(&mut self, producer: ProducerId, sort: SortSpec) {
        self.sorting.insert(producer, sort);
    }

    /// Iterate all groups with their fragments, in group-insertion order.
    ///
    /// The default group is always first since it is seeded at construction.
    pub fn groups(
        &self,
    ) -> impl Iterator<Item = (&GroupId, &IndexMap<ProducerId, ConstraintFragment>)> {
        self.constraints.iter()
    }

    /// Fragments of the default group, in insertion order.
    pub fn default_group_fragments(&self) -> impl Iterator<Item = &ConstraintFragment> {
        self.constraints
            .get(&GroupId::default_group())
            .into_iter()
            .flat_map(IndexMap::values)
    }

    /// Sort entries in producer-insertion order, partial pairs included.
    pub fn sort_entries(&self) -> impl Iterator<Item = (&ProducerId, &SortSpec)> {
        self.sorting.iter()
    }
}

impl Default for ConstraintStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn textual(s: &str) -> ConstraintFragment {
        ConstraintFragment::textual(s)
    }

    #[test]
    fn new_store_contains_default_group() {
        let store = ConstraintStore::new();
        let groups: Vec<_> = store.groups().map(|(g, _)| g.clone()).collect();
        assert_eq!(groups, vec![GroupId::default_group()]);
    }

    #[test]
    fn set_constraint_creates_group_on_first_use() {
        let mut store = ConstraintStore::new();
        store.set_constraint(
            ProducerId::new("p1"),
            textual("[a='x']"),
            GroupId::new("g1"),
        );

        let groups: Vec<_> = store.groups().map(|(g, _)| g.as_str().to_string()).collect();
        assert_eq!(groups, vec!["_none", "g1"]);
    }

    #[test]
    fn set_constraint_overwrites_per_producer() {
        let mut store = ConstraintStore::new();
        let producer = ProducerId::new("p1");
        store.set_constraint(producer.clone(), textual("[a='x']"), GroupId::default_group());
        store.set_constraint(producer, textual("[a='y']"), GroupId::default_group());

        let fragments: Vec<_> = store.default_group_fragments().cloned().collect();
        assert_eq!(fragments, vec![textual("[a='y']")]);
    }

    #[test]
    fn default_group_keeps_insertion_order() {
        let mut store = ConstraintStore::new();
        store.set_constraint(ProducerId::new("p1"), textual("[a='x']"), GroupId::default_group());
        store.set_constraint(ProducerId::new("p2"), textual("[b='y']"), GroupId::default_group());
        store.set_constraint(ProducerId::new("p1"), textual("[a='z']"), GroupId::default_group());

        // Overwriting does not move p1 behind p2.
        let fragments: Vec<_> = store.default_group_fragments().cloned().collect();
        assert_eq!(fragments, vec![textual("[a='z']"), textual("[b='y']")]);
    }

    #[test]
    fn set_sorting_replaces_only_its_producer() {
        let mut store = ConstraintStore::new();
        store.set_sorting(ProducerId::new("p1"), SortSpec::new("attr1", "asc"));
        store.set_sorting(ProducerId::new("p2"), SortSpec::new("attr2", "desc"));
        store.set_sorting(ProducerId::new("p1"), SortSpec::new("attr1", "desc"));

        let entries: Vec<_> = store
            .sort_entries()
            .map(|(p, s)| (p.as_str().to_string(), s.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("p1".to_string(), SortSpec::new("attr1", "desc")),
                ("p2".to_string(), SortSpec::new("attr2", "desc")),
            ]
        );
    }
}
