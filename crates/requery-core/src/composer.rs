//! # Constraint Composer
//!
//! Pure composition of a [`ConstraintStore`] snapshot into a single query
//! for the active surface, plus the flattened sort list.
//!
//! Composition is deterministic: the same snapshot composes to the same
//! output, and all anomalies (empty fragments, empty groups, partial sort
//! pairs, fragments written for the other surface) are filtered out locally
//! rather than surfaced as errors.

use crate::store::ConstraintStore;
use crate::types::{ConstraintFragment, SortSpec, StructuredConstraint};
use serde::{Deserialize, Serialize};

// =============================================================================
// SURFACES
// =============================================================================

/// Which query surface the composed constraints must target.
///
/// The choice is made per composition from an injected connectivity
/// capability; the composer itself never consults ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySurface {
    /// Connected mode: one bracket-composed query string.
    Textual,
    /// Disconnected mode: a structured constraint tree.
    Structured,
}

/// One AND-term of the structured constraint tree.
///
/// The composed tree is a conjunction of terms; a term is either a single
/// predicate or a disjunction of the predicates one group accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredTerm {
    /// A predicate that must hold (default-group fragment).
    Must(StructuredConstraint),
    /// At least one of the predicates must hold (named group).
    AnyOf(Vec<StructuredConstraint>),
}

/// The composed filter in the surface required by the current mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposedConstraints {
    /// Bracket-composed query text; empty string means "no filter".
    Textual(String),
    /// Conjunction of structured terms; empty list means "no filter".
    Structured(Vec<StructuredTerm>),
}

impl ComposedConstraints {
    /// Whether the composition carries no filter at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Textual(text) => text.is_empty(),
            Self::Structured(terms) => terms.is_empty(),
        }
    }
}

// =============================================================================
// COMPOSER
// =============================================================================

/// Pure functions turning a store snapshot into composed output.
pub struct Composer;

impl Composer {
    /// Compose the store's fragments into a single filter for `surface`.
    #[must_use]
    pub fn compose_constraints(
        store: &ConstraintStore,
        surface: QuerySurface,
    ) -> ComposedConstraints {
        match surface {
            QuerySurface::Textual => ComposedConstraints::Textual(Self::compose_textual(store)),
            QuerySurface::Structured => {
                ComposedConstraints::Structured(Self::compose_structured(store))
            }
        }
    }

    /// Compose the sort mapping into an ordered list of complete pairs.
    ///
    /// Entries keep producer-insertion order; partial pairs are dropped.
    #[must_use]
    pub fn compose_sorting(store: &ConstraintStore) -> Vec<SortSpec> {
        store
            .sort_entries()
            .map(|(_, sort)| sort)
            .filter(|sort| sort.is_complete())
            .cloned()
            .collect()
    }

    /// Textual surface: default group concatenated raw (adjacency implies
    /// AND), then every named group OR-joined inside one bracket pair.
    fn compose_textual(store: &ConstraintStore) -> String {
        let mut composed = String::new();

        for fragment in store.default_group_fragments() {
            if let ConstraintFragment::Textual(text) = fragment {
                composed.push_str(text);
            }
        }

        for (group, fragments) in store.groups() {
            if group.is_default() {
                continue;
            }
            let bodies: Vec<&str> = fragments
                .values()
                .filter_map(|fragment| match fragment {
                    ConstraintFragment::Textual(text) => Some(text.trim()),
                    ConstraintFragment::Structured(_) => None,
                })
                .filter(|text| !text.is_empty())
                .map(strip_outer_brackets)
                .collect();
            let joined = bodies.join(" or ");
            if !joined.is_empty() {
                composed.push('[');
                composed.push_str(&joined);
                composed.push(']');
            }
        }

        composed
    }

    /// Structured surface: default-group predicates become `Must` terms,
    /// each named group becomes one `AnyOf` term. Constraints without a
    /// value and groups left empty after filtering are elided.
    fn compose_structured(store: &ConstraintStore) -> Vec<StructuredTerm> {
        let mut terms = Vec::new();

        for (group, fragments) in store.groups() {
            let effective: Vec<StructuredConstraint> = fragments
                .values()
                .filter_map(|fragment| match fragment {
                    ConstraintFragment::Structured(constraint) => Some(constraint),
                    ConstraintFragment::Textual(_) => None,
                })
                .filter(|constraint| constraint.is_effective())
                .cloned()
                .collect();

            if group.is_default() {
                terms.extend(effective.into_iter().map(StructuredTerm::Must));
            } else if !effective.is_empty() {
                terms.push(StructuredTerm::AnyOf(effective));
            }
        }

        terms
    }
}

/// Strip the outer bracket pair from a trimmed, pre-bracketed predicate.
///
/// Fragments are self-contained bracket pairs by contract; anything not
/// actually bracketed is passed through unchanged.
fn strip_outer_brackets(text: &str) -> &str {
    text.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(text)
}

// =============================================================================
// TESTS
// =============================================================================
