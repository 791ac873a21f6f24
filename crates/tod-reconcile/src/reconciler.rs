//! The commitment reconciler.

use tod_core::{AllocError, AllocResult, AllocWarning, EngineConfig, RegionId};
use tracing::{debug, trace};

/// Existing amount and proposed target for one recipient.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Commitment {
    pub existing: f64,
    pub target:   f64,
}

impl Commitment {
    pub fn new(existing: f64, target: f64) -> Self {
        Self { existing, target }
    }
}

/// Result of reconciling one group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    /// Adjusted target per input entry, in input order.
    pub adjusted:   Vec<f64>,
    /// Passes that changed at least one target.
    pub iterations: usize,
    /// `false` when the iteration bound stopped the loop with a recipient
    /// still over-committed.
    pub converged:  bool,
    /// `Σ existing − Σ target` when positive; the amount by which the
    /// adjusted total exceeds the original one.
    pub excess:     f64,
}

impl Reconciliation {
    /// Warnings for this result, attributed to `region` and `activity`.
    pub fn warnings(&self, region: &RegionId, activity: &str) -> Vec<AllocWarning> {
        let mut warnings = Vec::new();
        if !self.converged {
            warnings.push(AllocWarning::NonConvergence {
                region:     region.clone(),
                activity:   Some(activity.to_owned()),
                iterations: self.iterations,
            });
        }
        if self.excess > 0.0 {
            warnings.push(AllocWarning::CommitmentExceedsTarget {
                region:   region.clone(),
                activity: Some(activity.to_owned()),
                excess:   self.excess,
            });
        }
        warnings
    }

    pub fn total(&self) -> f64 {
        self.adjusted.iter().sum()
    }
}

/// Bounded proportional reconciliation of targets against commitments.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CommitmentReconciler {
    max_iterations: usize,
    tolerance:      f64,
}

impl Default for CommitmentReconciler {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            max_iterations: config.max_reconcile_iterations,
            tolerance:      config.tolerance,
        }
    }
}

impl CommitmentReconciler {
    /// `tolerance` is how far `existing` may exceed `target` before a
    /// recipient counts as over-committed.
    pub fn new(max_iterations: usize, tolerance: f64) -> AllocResult<Self> {
        if max_iterations == 0 {
            return Err(AllocError::Config("reconciler needs at least one iteration".into()));
        }
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(AllocError::Config(format!(
                "reconciler tolerance must be non-negative, got {tolerance}"
            )));
        }
        Ok(Self { max_iterations, tolerance })
    }

    pub fn from_config(config: &EngineConfig) -> AllocResult<Self> {
        Self::new(config.max_reconcile_iterations, config.tolerance)
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Reconcile a group given as existing/target pairs.
    pub fn reconcile(&self, group: &[Commitment]) -> AllocResult<Reconciliation> {
        self.reconcile_by(group, |c| c.existing, |c| c.target)
    }

    /// Reconcile arbitrary items through accessor closures.
    ///
    /// Existing amounts and targets must be finite and non-negative.
    pub fn reconcile_by<T, E, G>(
        &self,
        items:       &[T],
        existing_of: E,
        target_of:   G,
    ) -> AllocResult<Reconciliation>
    where
        E: Fn(&T) -> f64,
        G: Fn(&T) -> f64,
    {
        let existing: Vec<f64> = items.iter().map(&existing_of).collect();
        let mut targets: Vec<f64> = items.iter().map(&target_of).collect();
        validate(&existing, &targets)?;

        let total_existing: f64 = existing.iter().sum();
        let total_target: f64 = targets.iter().sum();
        let excess = total_existing - total_target;
        let mut result = Reconciliation {
            adjusted:   Vec::new(),
            iterations: 0,
            converged:  true,
            excess:     if excess > self.tolerance { excess } else { 0.0 },
        };

        if total_target == 0.0 {
            result.adjusted = targets;
            return Ok(result);
        }

        loop {
            let over: Vec<bool> = existing
                .iter()
                .zip(&targets)
                .map(|(&e, &t)| e > t + self.tolerance)
                .collect();
            if !over.contains(&true) {
                break;
            }
            if result.iterations == self.max_iterations {
                result.converged = false;
                break;
            }
            result.iterations += 1;

            let mut increment = 0.0;
            let mut gap_total = 0.0;
            for (i, &is_over) in over.iter().enumerate() {
                if is_over {
                    increment += existing[i] - targets[i];
                    targets[i] = existing[i];
                } else {
                    gap_total += (targets[i] - existing[i]).max(0.0);
                }
            }

            if gap_total <= 0.0 {
                targets.copy_from_slice(&existing);
                trace!(pass = result.iterations, increment, "no growth left; targets set to existing");
                break;
            }

            for (i, &is_over) in over.iter().enumerate() {
                if is_over {
                    continue;
                }
                let gap = (targets[i] - existing[i]).max(0.0);
                let reduced = targets[i] - gap / gap_total * increment;
                targets[i] = reduced.max(existing[i]);
            }
            trace!(pass = result.iterations, increment, gap_total, "reconcile pass");
        }

        result.adjusted = targets;
        debug!(
            recipients = items.len(),
            before     = total_target,
            after      = result.total(),
            iterations = result.iterations,
            converged  = result.converged,
            "reconciliation done"
        );
        Ok(result)
    }
}

fn validate(existing: &[f64], targets: &[f64]) -> AllocResult<()> {
    for (i, (&e, &t)) in existing.iter().zip(targets).enumerate() {
        if !e.is_finite() || e < 0.0 {
            return Err(AllocError::Config(format!("entry {i} has invalid existing amount {e}")));
        }
        if !t.is_finite() || t < 0.0 {
            return Err(AllocError::Config(format!("entry {i} has invalid target {t}")));
        }
    }
    Ok(())
}
