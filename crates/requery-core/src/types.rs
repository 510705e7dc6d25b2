//! # Core Type Definitions
//!
//! This module contains the data vocabulary of the constraint model:
//! - Contributor identity (`ProducerId`)
//! - Fragment grouping (`GroupId`, with the reserved default group)
//! - Filter contributions (`ConstraintFragment`, `StructuredConstraint`)
//! - Sort contributions (`SortSpec`)
//!
//! ## Determinism Guarantees
//!
//! All types here are plain values with no interior mutability. Identity
//! types implement `Ord` and `Hash` so they can key insertion-ordered maps
//! without ambiguity.

use serde::{Deserialize, Serialize};

// =============================================================================
// PRODUCER IDENTITY
// =============================================================================

/// Opaque stable identifier for one contributor of filter or sort fragments.
///
/// Each widget instance aiming at a shared data view owns exactly one
/// producer id and overwrites only its own contributions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProducerId(pub String);

impl ProducerId {
    /// Create a new producer id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the producer id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// FRAGMENT GROUPING
// =============================================================================

/// Name of the reserved default group.
///
/// Fragments in the default group are combined with every other group by
/// implicit conjunction; fragments inside any named group are combined with
/// disjunction before being AND-ed with the rest.
pub const DEFAULT_GROUP: &str = "_none";

/// Normalized name of a fragment group.
///
/// Construction trims surrounding whitespace and maps the empty string to
/// [`DEFAULT_GROUP`], so two producers writing `""` and `"  "` land in the
/// same bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    /// Create a group id, normalizing the raw name.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            Self(DEFAULT_GROUP.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The reserved default group.
    #[must_use]
    pub fn default_group() -> Self {
        Self(DEFAULT_GROUP.to_string())
    }

    /// Whether this is the default (conjunction-only) group.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_GROUP
    }

    /// Get the group name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::default_group()
    }
}

// =============================================================================
// FILTER FRAGMENTS
// =============================================================================

/// A single structured predicate used on the structured (offline) surface.
///
/// The record mirrors the shape the disconnected query engine consumes:
/// an attribute, a comparison operator, an entity path and the value to
/// match. A constraint with an empty `value` matches nothing and is dropped
/// during composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredConstraint {
    /// Attribute being constrained.
    pub attribute: String,
    /// Comparison operator, e.g. `contains`.
    pub operator: String,
    /// Entity path the attribute belongs to.
    pub path: String,
    /// Value to match against.
    pub value: String,
}

impl StructuredConstraint {
    /// Create a new structured constraint.
    #[must_use]
    pub fn new(
        attribute: impl Into<String>,
        operator: impl Into<String>,
        path: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator: operator.into(),
            path: path.into(),
            value: value.into(),
        }
    }

    /// Whether this constraint carries a value and should survive composition.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        !self.value.is_empty()
    }
}

/// One producer's contribution to the overall filter.
///
/// A fragment is written for one of the two query surfaces; composition for
/// the other surface skips it. Producers that want to stop filtering write
/// an empty fragment under their own id — fragments are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFragment {
    /// A pre-bracketed textual predicate, e.g. `[attr='x']`.
    ///
    /// Adjacent textual predicates imply conjunction, so fragments must be
    /// self-contained bracket pairs.
    Textual(String),
    /// A structured predicate for the disconnected surface.
    Structured(StructuredConstraint),
}

impl ConstraintFragment {
    /// Convenience constructor for a textual fragment.
    #[must_use]
    pub fn textual(predicate: impl Into<String>) -> Self {
        Self::Textual(predicate.into())
    }

    /// Whether the fragment contributes nothing to any composition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Textual(text) => text.trim().is_empty(),
            Self::Structured(constraint) => !constraint.is_effective(),
        }
    }
}

// =============================================================================
// SORT SPECS
// =============================================================================

/// An ordered sort pair contributed by one producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Attribute to sort by.
    pub attribute: String,
    /// Sort direction, e.g. `asc` or `desc`.
    pub direction: String,
}

impl SortSpec {
    /// Create a new sort spec.
    #[must_use]
    pub fn new(attribute: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            direction: direction.into(),
        }
    }

    /// A pair is complete only when both elements are present.
    ///
    /// Partial pairs are dropped during composition rather than surfaced as
    /// errors.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.attribute.is_empty() && !self.direction.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_normalizes_whitespace_and_empty() {
        assert_eq!(GroupId::new("  g1  ").as_str(), "g1");
        assert_eq!(GroupId::new("").as_str(), DEFAULT_GROUP);
        assert_eq!(GroupId::new("   ").as_str(), DEFAULT_GROUP);
        assert!(GroupId::new("").is_default());
        assert!(!GroupId::new("g1").is_default());
    }

    #[test]
    fn group_id_default_is_reserved_group() {
        assert_eq!(GroupId::default(), GroupId::default_group());
        assert!(GroupId::default().is_default());
    }

    #[test]
    fn textual_fragment_emptiness() {
        assert!(ConstraintFragment::textual("").is_empty());
        assert!(ConstraintFragment::textual("   ").is_empty());
        assert!(!ConstraintFragment::textual("[a='x']").is_empty());
    }

    #[test]
    fn structured_fragment_emptiness_follows_value() {
        let empty = StructuredConstraint::new("name", "contains", "Entity", "");
        let effective = StructuredConstraint::new("name", "contains", "Entity", "abc");
        assert!(ConstraintFragment::Structured(empty).is_empty());
        assert!(!ConstraintFragment::Structured(effective).is_empty());
    }

    #[test]
    fn sort_spec_completeness() {
        assert!(SortSpec::new("attr1", "asc").is_complete());
        assert!(!SortSpec::new("attr1", "").is_complete());
        assert!(!SortSpec::new("", "desc").is_complete());
    }
}
