//! ProvenanceEngine: the entry point the hook source calls.
//!
//! Every hook takes the [`ScopeOwner`] driving the unit of work. Hosts that
//! run one unit per thread can pass [`ScopeOwner::current_thread`].

use std::sync::Arc;

use depmat_core::errors::{DepmatErrorCode, LifecycleError, TrackerError};
use depmat_core::traits::NullSink;
use depmat_core::{DepmatConfig, NodeId, PhaseKindInterner, SnapshotSink, UnitId};
use tracing::{debug, error, trace, warn};

use crate::phase::PhaseId;
use crate::scope::{ScopeOwner, Sweeper, WorkUnit, WorkUnitScope};
use crate::stats::{EngineStats, EngineStatsSnapshot};
use crate::tracker::ProvenanceStore;

/// Builder for [`ProvenanceEngine`].
pub struct EngineBuilder {
    config: DepmatConfig,
    sink: Option<Arc<dyn SnapshotSink>>,
    store: Option<Arc<dyn ProvenanceStore>>,
    kinds: Option<Arc<PhaseKindInterner>>,
}

impl EngineBuilder {
    pub fn new(config: DepmatConfig) -> Self {
        Self {
            config,
            sink: None,
            store: None,
            kinds: None,
        }
    }

    /// Where finished snapshots go. Defaults to a [`NullSink`].
    pub fn sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Share one provenance store across all units instead of giving each
    /// unit its own side table.
    pub fn store(mut self, store: Arc<dyn ProvenanceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Reuse an existing phase-kind interner.
    pub fn kinds(mut self, kinds: Arc<PhaseKindInterner>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn build(self) -> ProvenanceEngine {
        let kinds = self.kinds.unwrap_or_default();
        let stats = Arc::new(EngineStats::default());
        let sink = self.sink.unwrap_or_else(|| Arc::new(NullSink));
        let scope = Arc::new(WorkUnitScope::new(
            Arc::clone(&kinds),
            self.config.matrix.clone(),
            self.config.sink.effective_snapshot_name(),
            sink,
            self.store,
            Arc::clone(&stats),
        ));

        let sweeper = if self.config.scope.effective_background_sweep() {
            match Sweeper::spawn(&scope, self.config.scope.effective_sweep_interval()) {
                Ok(sweeper) => Some(sweeper),
                Err(e) => {
                    warn!("failed to start sweeper thread, abandoned units are pruned on start only: {e}");
                    None
                }
            }
        } else {
            None
        };

        ProvenanceEngine {
            kinds,
            scope,
            stats,
            strict: self.config.lifecycle.effective_strict(),
            sweeper,
        }
    }
}

/// Receives phase and unit lifecycle events and maintains one provenance
/// matrix per open unit of work.
pub struct ProvenanceEngine {
    kinds: Arc<PhaseKindInterner>,
    scope: Arc<WorkUnitScope>,
    stats: Arc<EngineStats>,
    strict: bool,
    sweeper: Option<Sweeper>,
}

impl ProvenanceEngine {
    pub fn new(config: DepmatConfig, sink: Arc<dyn SnapshotSink>) -> Self {
        EngineBuilder::new(config).sink(sink).build()
    }

    pub fn builder(config: DepmatConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Start a unit of work for `owner`, finalizing the owner's previous
    /// unit if it is still open.
    pub fn on_unit_start(&self, owner: &ScopeOwner, label: impl Into<String>) -> UnitId {
        self.scope.start(owner, label).id()
    }

    /// Finalize the owner's unit and hand its snapshot to the sink. Sink
    /// failures are logged, never returned.
    pub fn on_unit_end(&self, owner: &ScopeOwner) -> Result<UnitId, LifecycleError> {
        self.scope
            .end(owner)
            .inspect_err(|e| self.lifecycle_violation(None, e))
    }

    /// Close the owner's unit without persisting it.
    pub fn discard_unit(&self, owner: &ScopeOwner) -> bool {
        self.scope.discard(owner)
    }

    /// A phase of `kind` starts over a graph whose live nodes are `nodes`.
    ///
    /// Each node's creation phase is counted in the new phase's row; then
    /// every cell of that row gains the graph size and one invocation. The
    /// update is skipped if the unit's matrix is being snapshotted.
    pub fn on_phase_enter<I>(&self, owner: &ScopeOwner, kind: &str, nodes: I) -> PhaseId
    where
        I: IntoIterator<Item = NodeId>,
    {
        let unit = self.scope.current_or_start(owner);
        let phase = unit.enter_phase(self.kinds.intern(kind));
        EngineStats::bump(&self.stats.phases_entered);

        let tracker = unit.tracker();
        let producers = nodes
            .into_iter()
            .map(|node| tracker.creation_phase_or_unknown(node));
        match unit.matrix().observe(phase, producers) {
            Some(graph_size) => trace!(
                unit_id = %unit.id(),
                phase = %phase.label(&self.kinds),
                graph_size,
                "phase entered"
            ),
            None => {
                EngineStats::bump(&self.stats.skipped_writes);
                debug!(
                    unit_id = %unit.id(),
                    phase = %phase.label(&self.kinds),
                    "matrix update skipped"
                );
            }
        }
        phase
    }

    /// A phase of `kind` ends. Nodes of `nodes` that carry no stamp yet are
    /// stamped with the exiting phase.
    pub fn on_phase_exit<I>(
        &self,
        owner: &ScopeOwner,
        kind: &str,
        nodes: I,
    ) -> Result<PhaseId, LifecycleError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let Some(unit) = self.scope.current(owner) else {
            let e = LifecycleError::UnknownUnit { owner: owner.id() };
            self.lifecycle_violation(None, &e);
            return Err(e);
        };
        let phase = unit
            .exit_phase(self.kinds.intern(kind))
            .inspect_err(|e| self.lifecycle_violation(Some(unit.as_ref()), e))?;

        if unit.is_open() {
            let outcome = unit.tracker().stamp_unmarked(nodes, phase);
            EngineStats::add(&self.stats.nodes_stamped, outcome.stamped);
            trace!(
                unit_id = %unit.id(),
                phase = %phase.label(&self.kinds),
                stamped = outcome.stamped,
                "phase exited"
            );
        }
        Ok(phase)
    }

    /// Record that the host discarded `node`'s creation record.
    pub fn mark_deleted(&self, owner: &ScopeOwner, node: NodeId) -> Result<(), TrackerError> {
        self.scope.current_or_start(owner).tracker().mark_deleted(node)
    }

    /// Creation phase of `node` in the owner's unit.
    pub fn creation_phase(&self, owner: &ScopeOwner, node: NodeId) -> Option<PhaseId> {
        Some(
            self.scope
                .current(owner)?
                .tracker()
                .creation_phase_or_unknown(node),
        )
    }

    /// The innermost phase running in the owner's unit.
    pub fn current_phase(&self, owner: &ScopeOwner) -> Option<PhaseId> {
        self.scope.current(owner)?.current_phase()
    }

    pub fn current_unit(&self, owner: &ScopeOwner) -> Option<Arc<WorkUnit>> {
        self.scope.current(owner)
    }

    /// Render the owner's open matrix without closing the unit.
    pub fn peek(&self, owner: &ScopeOwner) -> Option<String> {
        Some(self.scope.current(owner)?.matrix().render())
    }

    /// `<kind>#<occurrence>` for `phase`.
    pub fn phase_label(&self, phase: PhaseId) -> String {
        phase.label(&self.kinds).to_string()
    }

    /// Discard units whose owner is gone.
    pub fn sweep(&self) -> usize {
        self.scope.sweep()
    }

    pub fn active_units(&self) -> usize {
        self.scope.active_units()
    }

    pub fn kinds(&self) -> &Arc<PhaseKindInterner> {
        &self.kinds
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop the sweeper and finalize every open unit.
    pub fn shutdown(mut self) -> EngineStatsSnapshot {
        self.close();
        self.stats.snapshot()
    }

    fn close(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
        let finalized = self.scope.finalize_all();
        if finalized > 0 {
            debug!(finalized, "finalized open units on shutdown");
        }
    }

    fn lifecycle_violation(&self, unit: Option<&WorkUnit>, e: &LifecycleError) {
        EngineStats::bump(&self.stats.lifecycle_violations);
        if let Some(unit) = unit {
            unit.mark_untrusted();
        }
        error!(code = e.error_code(), "{e}");
        if self.strict {
            panic!("{}", e.operator_string());
        }
    }
}

impl Drop for ProvenanceEngine {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ProvenanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceEngine")
            .field("scope", &self.scope)
            .field("strict", &self.strict)
            .field("sweeper", &self.sweeper)
            .finish_non_exhaustive()
    }
}
