//! # Scheduler Registry
//!
//! Binds exactly one [`Scheduler`] to each distinct target view, so every
//! producer aimed at the same view shares one debounce window and one
//! single-flight refresh. Lookup walks up from the producer's scope through
//! a bounded ancestor chain and fails fast with a descriptive
//! [`CompatibilityError`] when no usable view is found.

use crate::connectivity::ConnectivityProbe;
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::target::{TargetId, TargetView};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// How many ancestor scopes are inspected before lookup gives up.
pub const ANCESTOR_SEARCH_LIMIT: usize = 16;

// =============================================================================
// SCOPES
// =============================================================================

/// One level of the containment hierarchy a producer widget sits in.
///
/// The registry ascends `parent` links looking for the first scope that
/// exposes a target view, mirroring how a widget finds the surrounding
/// data view it should control.
pub trait TargetScope {
    /// The target view this scope directly exposes, if any.
    fn target_view(&self) -> Option<Arc<dyn TargetView>>;

    /// The enclosing scope, if any.
    fn parent(&self) -> Option<&dyn TargetScope>;
}

// =============================================================================
// ERRORS
// =============================================================================

/// Lookup failure surfaced verbatim to end users by producer widgets.
///
/// The display strings are part of the public contract; callers show them
/// without rewording and skip attaching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompatibilityError {
    /// No scope in the bounded ancestor chain exposes a target view.
    #[error(
        "no compatible data view found around this widget; place the widget inside the data view it should control"
    )]
    TargetNotFound,

    /// A target view was found, but it lists a different entity.
    #[error(
        "the target data view lists entity '{actual}', but this widget is configured for entity '{expected}'"
    )]
    EntityMismatch {
        /// Entity the producer widget was configured for.
        expected: String,
        /// Entity the located data view actually lists.
        actual: String,
    },
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Keyed cache of schedulers, one per target view identity.
///
/// The registry owns the shared [`SchedulerConfig`] and
/// [`ConnectivityProbe`] and hands them to every scheduler it attaches.
pub struct SchedulerRegistry {
    config: SchedulerConfig,
    connectivity: Arc<dyn ConnectivityProbe>,
    schedulers: Mutex<HashMap<TargetId, Scheduler>>,
}

impl SchedulerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(connectivity: Arc<dyn ConnectivityProbe>, config: SchedulerConfig) -> Self {
        Self {
            config,
            connectivity,
            schedulers: Mutex::new(HashMap::new()),
        }
    }

    /// Locate the target view around `scope` and return its scheduler,
    /// attaching one on first use.
    ///
    /// When `entity` is given, the located view must list exactly that
    /// entity. Reusing a cached scheduler resets its first-run behavior and
    /// re-asserts the initial-loading marker, so a reused instance behaves
    /// like a fresh attach from the caller's perspective.
    pub fn get_or_create(
        &self,
        scope: &dyn TargetScope,
        entity: Option<&str>,
    ) -> Result<Scheduler, CompatibilityError> {
        let target = find_target_view(scope)?;
        if let Some(expected) = entity
            && target.entity() != expected
        {
            return Err(CompatibilityError::EntityMismatch {
                expected: expected.to_string(),
                actual: target.entity().to_string(),
            });
        }

        let mut schedulers = self
            .schedulers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match schedulers.entry(target.id()) {
            Entry::Occupied(entry) => {
                tracing::debug!(target_id = target.id().0, "reusing attached scheduler");
                let scheduler = entry.get().clone();
                scheduler.reattach();
                Ok(scheduler)
            }
            Entry::Vacant(entry) => {
                tracing::debug!(target_id = target.id().0, "attaching new scheduler");
                let scheduler = Scheduler::attach(
                    target,
                    Arc::clone(&self.connectivity),
                    self.config.clone(),
                );
                entry.insert(scheduler.clone());
                Ok(scheduler)
            }
        }
    }
}

/// Bounded ascent to the first scope exposing a target view.
fn find_target_view(scope: &dyn TargetScope) -> Result<Arc<dyn TargetView>, CompatibilityError> {
    let mut current = Some(scope);
    for _ in 0..ANCESTOR_SEARCH_LIMIT {
        let Some(scope) = current else {
            break;
        };
        if let Some(target) = scope.target_view() {
            return Ok(target);
        }
        current = scope.parent();
    }
    Err(CompatibilityError::TargetNotFound)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_error_messages_are_stable() {
        assert_eq!(
            CompatibilityError::TargetNotFound.to_string(),
            "no compatible data view found around this widget; place the widget inside the data view it should control"
        );
        let mismatch = CompatibilityError::EntityMismatch {
            expected: "Order".to_string(),
            actual: "Customer".to_string(),
        };
        assert_eq!(
            mismatch.to_string(),
            "the target data view lists entity 'Customer', but this widget is configured for entity 'Order'"
        );
    }
}
