//! # Target View Adapter
//!
//! The contract between the scheduler and the data view it drives. The
//! adapter exposes one asynchronous refresh entry point plus two
//! presentation markers the scheduler toggles around refreshes.

use async_trait::async_trait;
use requery_core::{ComposedConstraints, SortSpec};
use serde::{Deserialize, Serialize};

// =============================================================================
// PRESENTATION MARKERS
// =============================================================================

/// Marker asserted at attach time and cleared after the first completed
/// refresh. Collaborators key "the view is not ready yet" styling off it.
pub const INITIAL_LOADING_MARKER: &str = "requery-initial-loading";

/// Marker asserted before and cleared after every refresh except the first
/// one after (re)attach.
pub const LOADING_MARKER: &str = "requery-loading";

// =============================================================================
// REFRESH REQUEST
// =============================================================================

/// Stable identity of a target view, used to cache schedulers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// The explicit payload of one refresh: the composed filter plus the
/// flattened sort list, both captured at the moment of issuing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Composed filter in the surface the current mode requires.
    pub constraints: ComposedConstraints,
    /// Ordered list of complete sort pairs.
    pub sorting: Vec<SortSpec>,
}

// =============================================================================
// ADAPTER CONTRACT
// =============================================================================

/// A list-like data view the scheduler drives.
///
/// The scheduler is the only caller of [`refresh`](TargetView::refresh) for
/// a given view; single-flight execution is its guarantee, not the view's.
/// `refresh` must resolve exactly once per call — a refresh that never
/// resolves stalls the scheduler forever (there is no internal timeout).
#[async_trait]
pub trait TargetView: Send + Sync + 'static {
    /// Stable identity for the registry cache.
    fn id(&self) -> TargetId;

    /// Entity this view lists, validated against producer configuration.
    fn entity(&self) -> &str;

    /// Perform one refresh with the given composed request.
    async fn refresh(&self, request: RefreshRequest);

    /// Assert a presentation marker on the view's root.
    fn set_marker(&self, marker: &str);

    /// Clear a presentation marker from the view's root.
    fn clear_marker(&self, marker: &str);

    /// Number of rows currently shown, for collaborators such as
    /// pagination widgets.
    fn row_count(&self) -> usize;
}
