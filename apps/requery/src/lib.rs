//! # requery
//!
//! Coalescing refresh scheduler for shared data views.
//!
//! Several independent producers (search boxes, filter widgets, sort
//! controls) influence one shared, expensive, asynchronous refresh of a
//! list-like data view. This crate debounces their bursts, keeps at most
//! one refresh in flight per view, reruns after completion when mutations
//! arrived mid-flight, and composes all current fragments into a single
//! query via `requery-core`.
//!
//! ## Architecture
//!
//! ```text
//! producer ─┐
//! producer ─┼─> Scheduler handle ──channel──> worker task
//! producer ─┘                                   │ owns ConstraintStore
//!                                               │ debounce / single-flight
//!                                               v
//!                                  Composer ──> TargetView::refresh
//! ```
//!
//! The [`SchedulerRegistry`] guarantees one scheduler per distinct target
//! view and validates producer/view compatibility up front.

// =============================================================================
// MODULES
// =============================================================================

pub mod connectivity;
pub mod registry;
pub mod scheduler;
pub mod target;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use connectivity::{AlwaysOffline, AlwaysOnline, ConnectivityProbe};
pub use registry::{
    ANCESTOR_SEARCH_LIMIT, CompatibilityError, SchedulerRegistry, TargetScope,
};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use target::{
    INITIAL_LOADING_MARKER, LOADING_MARKER, RefreshRequest, TargetId, TargetView,
};

// Re-export the pure model so producers depend on one crate.
pub use requery_core::{
    ComposedConstraints, Composer, ConstraintFragment, ConstraintStore, DEFAULT_GROUP, GroupId,
    ProducerId, QuerySurface, SortSpec, StructuredConstraint, StructuredTerm,
};
