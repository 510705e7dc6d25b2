//! # Demo CLI
//!
//! Simulates a handful of producers (a search box typing in bursts, a
//! grouped segment filter, sort controls) against an in-memory list view,
//! showing the debounce window, the single-flight guarantee and the
//! mid-flight rerun end to end.

use async_trait::async_trait;
use clap::Parser;
use requery::{
    AlwaysOffline, AlwaysOnline, CompatibilityError, ComposedConstraints, ConnectivityProbe,
    ConstraintFragment, GroupId, ProducerId, RefreshRequest, SchedulerConfig, SchedulerRegistry,
    SortSpec, StructuredConstraint, StructuredTerm, TargetId, TargetScope, TargetView,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{self, Duration};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// requery — coalescing refresh scheduler demo.
///
/// Runs a scripted producer scenario against a simulated list view and
/// logs every refresh the scheduler issues.
#[derive(Parser, Debug)]
#[command(name = "requery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Debounce delay in milliseconds
    #[arg(short, long, default_value_t = 50)]
    pub delay_ms: u64,

    /// Compose for the disconnected (structured) surface
    #[arg(long)]
    pub offline: bool,

    /// Print issued refresh requests as JSON lines
    #[arg(long)]
    pub json_mode: bool,

    /// Suppress banner output
    #[arg(short, long)]
    pub quiet: bool,
}

// =============================================================================
// SIMULATED LIST VIEW
// =============================================================================

/// How long one simulated refresh takes. Long enough that the scripted
/// mid-flight mutations land while the first refresh is still running.
const REFRESH_DURATION: Duration = Duration::from_millis(120);

struct DemoListView {
    entity: String,
    rows: Vec<String>,
    matched: AtomicUsize,
    json_mode: bool,
}

impl DemoListView {
    fn new(entity: &str, rows: Vec<String>, json_mode: bool) -> Self {
        let matched = AtomicUsize::new(rows.len());
        Self {
            entity: entity.to_string(),
            rows,
            matched,
            json_mode,
        }
    }
}

#[async_trait]
impl TargetView for DemoListView {
    fn id(&self) -> TargetId {
        TargetId(1)
    }

    fn entity(&self) -> &str {
        &self.entity
    }

    async fn refresh(&self, request: RefreshRequest) {
        time::sleep(REFRESH_DURATION).await;

        // Naive row filter: a row matches when, for every term, it contains
        // at least one of the term's values. Close enough for a demo set.
        let terms = search_terms(&request.constraints);
        let matched = self
            .rows
            .iter()
            .filter(|row| {
                let row = row.to_lowercase();
                terms.iter().all(|alternatives| {
                    alternatives
                        .iter()
                        .any(|value| row.contains(&value.to_lowercase()))
                })
            })
            .count();
        self.matched.store(matched, Ordering::Relaxed);

        if self.json_mode {
            match serde_json::to_string(&request) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!("failed to serialize refresh request: {e}"),
            }
        } else {
            match &request.constraints {
                ComposedConstraints::Textual(text) => {
                    tracing::info!(constraints = %text, sort_entries = request.sorting.len(), matched, "refresh completed");
                }
                ComposedConstraints::Structured(terms) => {
                    tracing::info!(terms = terms.len(), sort_entries = request.sorting.len(), matched, "refresh completed");
                }
            }
        }
    }

    fn set_marker(&self, marker: &str) {
        tracing::info!(marker, "marker set");
    }

    fn clear_marker(&self, marker: &str) {
        tracing::info!(marker, "marker cleared");
    }

    fn row_count(&self) -> usize {
        self.matched.load(Ordering::Relaxed)
    }
}

/// Pull the comparable values out of a composed filter, one alternative
/// set per AND-term.
fn search_terms(constraints: &ComposedConstraints) -> Vec<Vec<String>> {
    match constraints {
        // Each bracket pair is one term; its quoted values are alternatives.
        ComposedConstraints::Textual(text) => text
            .split(']')
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                chunk
                    .split('\'')
                    .skip(1)
                    .step_by(2)
                    .map(str::to_string)
                    .collect()
            })
            .collect(),
        ComposedConstraints::Structured(terms) => terms
            .iter()
            .map(|term| match term {
                StructuredTerm::Must(constraint) => vec![constraint.value.clone()],
                StructuredTerm::AnyOf(constraints) => {
                    constraints.iter().map(|c| c.value.clone()).collect()
                }
            })
            .collect(),
    }
}

// =============================================================================
// SCOPES
// =============================================================================

struct ListViewScope {
    view: Arc<DemoListView>,
}

impl TargetScope for ListViewScope {
    fn target_view(&self) -> Option<Arc<dyn TargetView>> {
        Some(Arc::clone(&self.view) as Arc<dyn TargetView>)
    }

    fn parent(&self) -> Option<&dyn TargetScope> {
        None
    }
}

struct WidgetScope<'a> {
    parent: &'a dyn TargetScope,
}

impl TargetScope for WidgetScope<'_> {
    fn target_view(&self) -> Option<Arc<dyn TargetView>> {
        None
    }

    fn parent(&self) -> Option<&dyn TargetScope> {
        Some(self.parent)
    }
}

// =============================================================================
// SCENARIO
// =============================================================================

fn search_fragment(offline: bool, query: &str) -> ConstraintFragment {
    if offline {
        ConstraintFragment::Structured(StructuredConstraint::new(
            "name", "contains", "Customer", query,
        ))
    } else {
        ConstraintFragment::textual(format!("[contains(name,'{query}')]"))
    }
}

fn segment_fragment(offline: bool, segment: &str) -> ConstraintFragment {
    if offline {
        ConstraintFragment::Structured(StructuredConstraint::new(
            "segment", "equals", "Customer", segment,
        ))
    } else {
        ConstraintFragment::textual(format!("[segment='{segment}']"))
    }
}

/// Run the scripted producer scenario.
pub async fn execute(cli: Cli) -> Result<(), CompatibilityError> {
    let rows = [
        "Alice Retail",
        "Alan Smb",
        "Aline Retail",
        "Bob Retail",
        "Carol Enterprise",
    ]
    .iter()
    .map(|row| (*row).to_string())
    .collect();
    let view = Arc::new(DemoListView::new("Customer", rows, cli.json_mode));

    let list_scope = ListViewScope {
        view: Arc::clone(&view),
    };
    let widget_scope = WidgetScope {
        parent: &list_scope,
    };

    let connectivity: Arc<dyn ConnectivityProbe> = if cli.offline {
        Arc::new(AlwaysOffline)
    } else {
        Arc::new(AlwaysOnline)
    };
    let config = SchedulerConfig {
        debounce: Duration::from_millis(cli.delay_ms),
    };
    let registry = SchedulerRegistry::new(connectivity, config);

    let scheduler = registry.get_or_create(&widget_scope, Some("Customer"))?;

    // A user typing: three writes inside one debounce window coalesce into
    // a single refresh composed from the final query.
    let search = ProducerId::new("search-box");
    for query in ["a", "al", "ali"] {
        scheduler.set_constraint(
            search.clone(),
            search_fragment(cli.offline, query),
            GroupId::default_group(),
        );
    }
    scheduler.set_sorting(
        ProducerId::new("sort-control"),
        SortSpec::new("name", "asc"),
    );
    // Partial pair: silently dropped during composition.
    scheduler.set_sorting(
        ProducerId::new("stale-sort-control"),
        SortSpec::new("city", ""),
    );

    // Let the debounce fire, then mutate while the refresh is in flight;
    // both writes collapse into exactly one follow-up refresh.
    time::sleep(Duration::from_millis(cli.delay_ms + 20)).await;
    scheduler.set_constraint(
        ProducerId::new("segment-filter-retail"),
        segment_fragment(cli.offline, "Retail"),
        GroupId::new("segment"),
    );
    scheduler.set_constraint(
        ProducerId::new("segment-filter-smb"),
        segment_fragment(cli.offline, "Smb"),
        GroupId::new("segment"),
    );

    // First refresh, rerun, and settle back to idle.
    time::sleep(REFRESH_DURATION * 3).await;

    tracing::info!(rows = scheduler.target().row_count(), "demo settled");
    Ok(())
}
