//! The `Engine` struct and its per-region passes.

use tod_core::{AllocError, AllocResult, AllocWarning, EngineConfig, RegionId, SeededRng};
use tod_gradient::StationDistributor;
use tod_ledger::{Ledger, RegionFailure, StationPlan, TargetRow};
use tod_reconcile::{CommitmentReconciler, group_targets};
use tod_segment::SegmentAllocator;
use tracing::{debug, info};

use crate::{AllocationObserver, Pass, ReconcileRun, SegmentRun, StationRun};

/// Drives the allocators over every region of an input table.
///
/// The engine holds no per-run state; the same instance can run any number
/// of passes.  Station lotteries draw from a generator derived from
/// `config.seed` and the station's position in the input, so a pass is
/// reproducible regardless of how many other stations it contains after it.
#[derive(Clone, Debug)]
pub struct Engine {
    config:     EngineConfig,
    segments:   SegmentAllocator,
    stations:   StationDistributor,
    reconciler: CommitmentReconciler,
}

impl Engine {
    /// Validate `config` and prepare the allocators.
    pub fn new(config: EngineConfig) -> AllocResult<Self> {
        config.validate()?;
        Ok(Self {
            segments:   SegmentAllocator::new(),
            stations:   StationDistributor::new(&config)?,
            reconciler: CommitmentReconciler::from_config(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Segment allocation ────────────────────────────────────────────────

    /// Greedy-fill every region in `ledger`.
    ///
    /// Regions the ledger already rejected are reported through the observer
    /// and copied into [`SegmentRun::failures`].
    pub fn allocate_segments<O: AllocationObserver>(
        &self,
        ledger:   &Ledger,
        observer: &mut O,
    ) -> SegmentRun {
        let mut run = SegmentRun::default();
        for failure in &ledger.failures {
            observer.on_region_failed(Pass::Segment, failure);
            run.failures.push(failure.clone());
        }

        for region in &ledger.regions {
            observer.on_region_start(Pass::Segment, region.id());
            let mut control = region.control.clone();
            match self.segments.allocate(&mut control, &region.recipients) {
                Ok(outcome) => {
                    run.allocations.extend(outcome.allocation_rows());
                    run.unallocated.extend(outcome.unallocated_rows());
                    report(observer, Pass::Segment, region.id(), &outcome.warnings);
                    run.warnings.extend(outcome.warnings);
                }
                Err(error) => fail(observer, Pass::Segment, &mut run.failures, region.id(), error),
            }
        }

        info!(
            regions     = ledger.regions.len(),
            allocations = run.allocations.len(),
            warnings    = run.warnings.len(),
            failures    = run.failures.len(),
            "segment pass done"
        );
        run
    }

    // ── Station push-down ─────────────────────────────────────────────────

    /// Distribute every station's targets over its sub-areas.
    pub fn distribute_stations<O: AllocationObserver>(
        &self,
        plans:    &[StationPlan],
        observer: &mut O,
    ) -> StationRun {
        let mut run = StationRun::default();
        for (index, plan) in plans.iter().enumerate() {
            observer.on_region_start(Pass::Station, &plan.region);
            let mut rng = SeededRng::for_region(self.config.seed, index);
            match self.stations.distribute(plan, rng.inner()) {
                Ok(outcome) => {
                    report(observer, Pass::Station, &plan.region, &outcome.warnings);
                    run.warnings.extend(outcome.warnings.iter().cloned());
                    run.outcomes.push(outcome);
                }
                Err(error) => fail(observer, Pass::Station, &mut run.failures, &plan.region, error),
            }
        }

        info!(
            stations = plans.len(),
            warnings = run.warnings.len(),
            failures = run.failures.len(),
            "station pass done"
        );
        run
    }

    // ── Reconciliation ────────────────────────────────────────────────────

    /// Reconcile every `(group, activity)` pair in `rows` against existing
    /// activity.  A bad group fails alone; other groups sharing its region
    /// key still run.
    pub fn reconcile_targets<O: AllocationObserver>(
        &self,
        rows:     &[TargetRow],
        observer: &mut O,
    ) -> ReconcileRun {
        let mut run = ReconcileRun::default();
        let groups = group_targets(rows);
        for group in &groups {
            observer.on_region_start(Pass::Reconcile, &group.group);
            match self.reconciler.reconcile_group(group) {
                Ok(outcome) => {
                    report(observer, Pass::Reconcile, &group.group, &outcome.warnings);
                    run.adjusted.extend(outcome.rows);
                    run.warnings.extend(outcome.warnings);
                }
                Err(error) => fail(observer, Pass::Reconcile, &mut run.failures, &group.group, error),
            }
        }

        info!(
            groups   = groups.len(),
            rows     = run.adjusted.len(),
            warnings = run.warnings.len(),
            failures = run.failures.len(),
            "reconcile pass done"
        );
        run
    }

    /// Reconcile the targets a station pass produced.
    pub fn reconcile_stations<O: AllocationObserver>(
        &self,
        stations: &StationRun,
        observer: &mut O,
    ) -> ReconcileRun {
        self.reconcile_targets(&stations.target_rows(), observer)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn report<O: AllocationObserver>(
    observer: &mut O,
    pass:     Pass,
    region:   &RegionId,
    warnings: &[AllocWarning],
) {
    for warning in warnings {
        observer.on_warning(pass, warning);
    }
    observer.on_region_end(pass, region, warnings.len());
}

fn fail<O: AllocationObserver>(
    observer: &mut O,
    pass:     Pass,
    failures: &mut Vec<RegionFailure>,
    region:   &RegionId,
    error:    AllocError,
) {
    debug!(%pass, %region, %error, "region failed");
    let failure = RegionFailure { region: region.clone(), error };
    observer.on_region_failed(pass, &failure);
    failures.push(failure);
}
