//! # requery-core
//!
//! The pure constraint model for requery - THE LOGIC.
//!
//! Several independent producers (search boxes, filter widgets, sort
//! controls) contribute fragments toward one shared query on a data view.
//! This crate holds the fragments and composes them deterministically; the
//! scheduling layer that debounces and issues the actual refreshes lives in
//! the `requery` application crate.
//!
//! ## Architectural Constraints
//!
//! The core:
//! - Has NO async, NO timers, NO I/O (pure Rust)
//! - Composes as a pure function of a store snapshot
//! - Treats insertion order as semantic: groups, fragments and sort entries
//!   compose in the order producers registered them

// =============================================================================
// MODULES
// =============================================================================

pub mod composer;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    ConstraintFragment, DEFAULT_GROUP, GroupId, ProducerId, SortSpec, StructuredConstraint,
};

// =============================================================================
// RE-EXPORTS: Store & Composition
// =============================================================================

pub use composer::{ComposedConstraints, Composer, QuerySurface, StructuredTerm};
pub use store::ConstraintStore;
