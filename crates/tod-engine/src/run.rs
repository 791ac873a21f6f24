//! Results of one engine pass over a whole table.

use tod_core::AllocWarning;
use tod_gradient::StationOutcome;
use tod_ledger::{AdjustedTargetRow, AllocationRow, RegionFailure, TargetRow, UnallocatedRow};

/// Output of [`Engine::allocate_segments`][crate::Engine::allocate_segments].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentRun {
    /// Non-zero allocations, region by region in rank order.
    pub allocations: Vec<AllocationRow>,
    /// One row per region and activity.
    pub unallocated: Vec<UnallocatedRow>,
    pub warnings:    Vec<AllocWarning>,
    /// Ledger failures first, then regions the allocator rejected.
    pub failures:    Vec<RegionFailure>,
}

/// Output of [`Engine::distribute_stations`][crate::Engine::distribute_stations].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StationRun {
    pub outcomes: Vec<StationOutcome>,
    pub warnings: Vec<AllocWarning>,
    pub failures: Vec<RegionFailure>,
}

impl StationRun {
    /// Target rows for every distributed station, ready for
    /// [`Engine::reconcile_targets`][crate::Engine::reconcile_targets].
    pub fn target_rows(&self) -> Vec<TargetRow> {
        self.outcomes.iter().flat_map(|outcome| outcome.target_rows()).collect()
    }
}

/// Output of [`Engine::reconcile_targets`][crate::Engine::reconcile_targets].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileRun {
    /// Adjusted targets, grouped by `(group, activity)` in first-appearance
    /// order.
    pub adjusted: Vec<AdjustedTargetRow>,
    pub warnings: Vec<AllocWarning>,
    pub failures: Vec<RegionFailure>,
}
