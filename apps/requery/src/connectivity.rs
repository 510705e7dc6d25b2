//! # Connectivity Probe
//!
//! The scheduler never decides connectivity itself; it consumes an injected
//! capability check at every composition, keeping composition pure and
//! testable.

use requery_core::QuerySurface;

/// Capability check for "is the environment currently disconnected".
pub trait ConnectivityProbe: Send + Sync + 'static {
    /// Whether the environment is currently offline.
    fn is_offline(&self) -> bool;

    /// Query surface the current connectivity requires.
    fn surface(&self) -> QuerySurface {
        if self.is_offline() {
            QuerySurface::Structured
        } else {
            QuerySurface::Textual
        }
    }
}

/// Probe for environments that are always connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl ConnectivityProbe for AlwaysOnline {
    fn is_offline(&self) -> bool {
        false
    }
}

/// Probe for environments that are always disconnected.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOffline;

impl ConnectivityProbe for AlwaysOffline {
    fn is_offline(&self) -> bool {
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_follows_connectivity() {
        assert_eq!(AlwaysOnline.surface(), QuerySurface::Textual);
        assert_eq!(AlwaysOffline.surface(), QuerySurface::Structured);
    }
}
