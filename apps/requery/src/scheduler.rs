//! # Update Scheduler
//!
//! The state machine that turns producer mutations into refreshes:
//! debounce bursts, keep at most one refresh in flight, and rerun after
//! completion when mutations arrived mid-flight, so no contribution is
//! ever dropped and none causes more refreshes than necessary.
//!
//! ## Execution Model
//!
//! One worker task owns the [`ConstraintStore`] for its target; producers
//! hold cloneable [`Scheduler`] handles that send commands over a channel.
//! All transitions happen on that single task, so the single-flight
//! invariant needs no locks. The worker moves between four states:
//!
//! ```text
//! Idle --mutation--> Debouncing --deadline--> Running --completion--> Idle
//!                    ^    |mutation               |mutation
//!                    +----+ (deadline restarts)   v
//!                                        RunningWithPendingRerun
//!                                            --completion--> Running (recompose)
//! ```

use crate::connectivity::ConnectivityProbe;
use crate::target::{INITIAL_LOADING_MARKER, LOADING_MARKER, RefreshRequest, TargetView};
use requery_core::{Composer, ConstraintFragment, ConstraintStore, GroupId, ProducerId, SortSpec};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tuning knobs for a scheduler instance.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Quiet period after the last mutation before a refresh is issued.
    /// Every mutation restarts the full period (debounce, not throttle).
    pub debounce: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(50),
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

enum Command {
    SetConstraint {
        producer: ProducerId,
        fragment: ConstraintFragment,
        group: GroupId,
    },
    SetSorting {
        producer: ProducerId,
        sort: SortSpec,
    },
    /// Registry reattach: behave like a fresh attach from now on.
    /// Not a store mutation; never arms or restarts the debounce timer.
    Reattach,
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable producer-facing handle to one target's update scheduler.
///
/// Writes do not compose or refresh anything by themselves; they feed the
/// worker task, which debounces and issues the actual refresh. The worker
/// lives until every handle (including the registry's cached one) has been
/// dropped, and is torn down together with its store.
#[derive(Clone)]
pub struct Scheduler {
    commands: mpsc::UnboundedSender<Command>,
    target: Arc<dyn TargetView>,
}

impl Scheduler {
    /// Attach a new scheduler to `target` and spawn its worker task.
    ///
    /// Asserts the initial-loading marker on the target; the first completed
    /// refresh clears it. Must be called within a tokio runtime.
    #[must_use]
    pub fn attach(
        target: Arc<dyn TargetView>,
        connectivity: Arc<dyn ConnectivityProbe>,
        config: SchedulerConfig,
    ) -> Self {
        target.set_marker(INITIAL_LOADING_MARKER);
        let (commands, inbox) = mpsc::unbounded_channel();
        let worker = Worker {
            target: Arc::clone(&target),
            connectivity,
            config,
            store: ConstraintStore::new(),
            first_run_completed: false,
        };
        tokio::spawn(worker.run(inbox));
        Self { commands, target }
    }

    /// Write `producer`'s filter fragment under `group` and register the
    /// mutation with the scheduler.
    pub fn set_constraint(
        &self,
        producer: ProducerId,
        fragment: ConstraintFragment,
        group: GroupId,
    ) {
        self.send(Command::SetConstraint {
            producer,
            fragment,
            group,
        });
    }

    /// Replace `producer`'s sort spec and register the mutation.
    pub fn set_sorting(&self, producer: ProducerId, sort: SortSpec) {
        self.send(Command::SetSorting { producer, sort });
    }

    /// Read-only access to the underlying view adapter, for collaborators
    /// that need it (e.g. to read the current row count).
    #[must_use]
    pub fn target(&self) -> &Arc<dyn TargetView> {
        &self.target
    }

    /// Reset first-run behavior so a reused scheduler looks freshly
    /// attached. Called by the registry on cache hits.
    pub(crate) fn reattach(&self) {
        self.target.set_marker(INITIAL_LOADING_MARKER);
        self.send(Command::Reattach);
    }

    fn send(&self, command: Command) {
        // Fails only when the worker is gone, i.e. during teardown of the
        // target itself; the mutation is moot at that point.
        if self.commands.send(command).is_err() {
            tracing::warn!("scheduler worker gone; mutation dropped during teardown");
        }
    }
}

// The target adapter is a bare trait object, so derive(Debug) is out.
impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("target", &self.target.id())
            .finish_non_exhaustive()
    }
}

/// Two handles are equal when they feed the same worker task.
impl PartialEq for Scheduler {
    fn eq(&self, other: &Self) -> bool {
        self.commands.same_channel(&other.commands)
    }
}

impl Eq for Scheduler {}

// =============================================================================
// WORKER
// =============================================================================

struct Worker {
    target: Arc<dyn TargetView>,
    connectivity: Arc<dyn ConnectivityProbe>,
    config: SchedulerConfig,
    store: ConstraintStore,
    first_run_completed: bool,
}

impl Worker {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) {
        // Idle is the quiescent rest state; the loop only ends when every
        // handle has been dropped.
        loop {
            let Some(command) = inbox.recv().await else {
                return;
            };
            if !self.apply(command) {
                continue;
            }
            tracing::debug!(debounce_ms = self.config.debounce.as_millis() as u64, "debounce armed");
            if !self.debounce(&mut inbox).await {
                return;
            }
            while self.refresh_once(&mut inbox).await {}
        }
    }

    /// Debouncing: every further mutation restarts the full quiet period.
    /// Returns false when all handles dropped before the deadline fired.
    async fn debounce(&mut self, inbox: &mut mpsc::UnboundedReceiver<Command>) -> bool {
        let mut deadline = Instant::now() + self.config.debounce;
        loop {
            tokio::select! {
                received = inbox.recv() => match received {
                    Some(command) => {
                        if self.apply(command) {
                            deadline = Instant::now() + self.config.debounce;
                            tracing::trace!("debounce restarted");
                        }
                    }
                    None => return false,
                },
                () = time::sleep_until(deadline) => return true,
            }
        }
    }

    /// Running: compose against the current store, issue one refresh, and
    /// pump mutations into the store while it is in flight. Returns true
    /// when mutations landed mid-flight and a rerun is due.
    ///
    /// A refresh whose future never resolves stalls the worker here forever;
    /// the adapter contract gives the scheduler no error or timeout channel.
    async fn refresh_once(&mut self, inbox: &mut mpsc::UnboundedReceiver<Command>) -> bool {
        let request = self.compose();
        tracing::debug!(
            first_run = !self.first_run_completed,
            empty_filter = request.constraints.is_empty(),
            sort_entries = request.sorting.len(),
            "issuing refresh"
        );
        if self.first_run_completed {
            self.target.set_marker(LOADING_MARKER);
        }

        let target = Arc::clone(&self.target);
        let refresh = target.refresh(request);
        tokio::pin!(refresh);

        let mut pending_rerun = false;
        let mut inbox_open = true;
        loop {
            tokio::select! {
                () = &mut refresh => break,
                received = inbox.recv(), if inbox_open => match received {
                    Some(command) => {
                        if self.apply(command) {
                            pending_rerun = true;
                        }
                    }
                    // Producers are gone, but the in-flight refresh cannot
                    // be cancelled; await it before tearing down.
                    None => inbox_open = false,
                },
            }
        }

        self.target.clear_marker(LOADING_MARKER);
        self.target.clear_marker(INITIAL_LOADING_MARKER);
        self.first_run_completed = true;
        if pending_rerun {
            tracing::debug!("mutations arrived mid-flight; rerunning");
        }
        pending_rerun
    }

    /// Apply one command to the store. Returns whether it was a store
    /// mutation that must (re)arm scheduling.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::SetConstraint {
                producer,
                fragment,
                group,
            } => {
                self.store.set_constraint(producer, fragment, group);
                true
            }
            Command::SetSorting { producer, sort } => {
                self.store.set_sorting(producer, sort);
                true
            }
            Command::Reattach => {
                self.first_run_completed = false;
                false
            }
        }
    }

    /// Compose the refresh payload from the store as it stands right now,
    /// in the surface the injected connectivity capability selects.
    fn compose(&self) -> RefreshRequest {
        let surface = self.connectivity.surface();
        RefreshRequest {
            constraints: Composer::compose_constraints(&self.store, surface),
            sorting: Composer::compose_sorting(&self.store),
        }
    }
}
