//! Run-level configuration shared by every allocation pass.

use crate::{AllocError, AllocResult};

/// Parameters for one engine run.
///
/// Every field has a sensible default, so hosts usually write
/// `EngineConfig { seed: 7, ..Default::default() }`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Global RNG seed.  Per-region generators are derived from it.
    pub seed: u64,

    /// Iteration bound for the commitment reconciler.
    pub max_reconcile_iterations: usize,

    /// Absolute tolerance for floating-point comparisons of totals.
    pub tolerance: f64,

    /// Smallest allocable quantity for water-filling; tentative shares are
    /// rounded up to a multiple of it.
    pub allocable_unit: f64,

    /// Multiply gradient weights by each sub-area's suitability score.
    pub use_suitability: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed:                     0,
            max_reconcile_iterations: 50,
            tolerance:                1e-6,
            allocable_unit:           1.0,
            use_suitability:          false,
        }
    }
}

impl EngineConfig {
    /// Reject parameter combinations the algorithms cannot run with.
    pub fn validate(&self) -> AllocResult<()> {
        if !(self.allocable_unit.is_finite() && self.allocable_unit > 0.0) {
            return Err(AllocError::Config(format!(
                "allocable_unit must be positive, got {}",
                self.allocable_unit
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(AllocError::Config(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if self.max_reconcile_iterations == 0 {
            return Err(AllocError::Config(
                "max_reconcile_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
