//! Engine observer trait for progress reporting.

use std::fmt;

use tod_core::{AllocWarning, RegionId};
use tod_ledger::RegionFailure;
use tracing::{debug, info, warn};

/// Which engine pass a callback belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Segment,
    Station,
    Reconcile,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Segment   => "segment",
            Pass::Station   => "station",
            Pass::Reconcile => "reconcile",
        })
    }
}

/// Callbacks invoked by [`Engine`][crate::Engine] around each region.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: failure counter
///
/// ```rust,ignore
/// struct FailureCounter(usize);
///
/// impl AllocationObserver for FailureCounter {
///     fn on_region_failed(&mut self, _pass: Pass, _failure: &RegionFailure) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait AllocationObserver {
    /// Called before a region (or reconcile group) is processed.
    fn on_region_start(&mut self, _pass: Pass, _region: &RegionId) {}

    /// Called after a region completes, with the number of warnings it raised.
    fn on_region_end(&mut self, _pass: Pass, _region: &RegionId, _warnings: usize) {}

    /// Called once per warning, in the order they were raised.
    fn on_warning(&mut self, _pass: Pass, _warning: &AllocWarning) {}

    /// Called when a region is skipped because its input was invalid.
    fn on_region_failed(&mut self, _pass: Pass, _failure: &RegionFailure) {}
}

/// An [`AllocationObserver`] that does nothing.
pub struct NoopObserver;

impl AllocationObserver for NoopObserver {}

/// Reports every callback through `tracing`.
pub struct TracingObserver;

impl AllocationObserver for TracingObserver {
    fn on_region_start(&mut self, pass: Pass, region: &RegionId) {
        debug!(%pass, %region, "region start");
    }

    fn on_region_end(&mut self, pass: Pass, region: &RegionId, warnings: usize) {
        info!(%pass, %region, warnings, "region done");
    }

    fn on_warning(&mut self, pass: Pass, warning: &AllocWarning) {
        warn!(%pass, region = %warning.region(), "{warning}");
    }

    fn on_region_failed(&mut self, pass: Pass, failure: &RegionFailure) {
        warn!(%pass, region = %failure.region, error = %failure.error, "region skipped");
    }
}
