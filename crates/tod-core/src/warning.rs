//! Non-fatal allocation outcomes.
//!
//! Partial allocation is an expected result of distributing a scarce total,
//! so these conditions ride along with the computed values rather than
//! aborting the run.

use std::fmt;

use crate::RegionId;

/// A condition the caller may want to act on, attached to an otherwise
/// valid result.
///
/// `activity` holds the table key of the measure involved (`"Ind"`,
/// `"hotel"`, …) or `None` when the condition covers every measure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllocWarning {
    /// Aggregate capacity ran out before the target was met.
    Exhaustion {
        region:      RegionId,
        activity:    Option<String>,
        unallocated: f64,
    },
    /// The commitment reconciler hit its iteration bound.
    NonConvergence {
        region:     RegionId,
        activity:   Option<String>,
        iterations: usize,
    },
    /// The region or group had no recipients.
    EmptyGroup { region: RegionId },
    /// Existing commitments exceed the group target, so the group total could
    /// not be conserved.
    CommitmentExceedsTarget {
        region:   RegionId,
        activity: Option<String>,
        excess:   f64,
    },
    /// Lottery units that landed below the minimum viable size were taken
    /// back and not handed to anyone else.
    Forfeited {
        region:    RegionId,
        activity:  Option<String>,
        forfeited: f64,
    },
}

impl AllocWarning {
    /// Region the warning belongs to.
    pub fn region(&self) -> &RegionId {
        match self {
            AllocWarning::Exhaustion { region, .. }
            | AllocWarning::NonConvergence { region, .. }
            | AllocWarning::EmptyGroup { region }
            | AllocWarning::CommitmentExceedsTarget { region, .. }
            | AllocWarning::Forfeited { region, .. } => region,
        }
    }
}

fn activity_label(activity: &Option<String>) -> &str {
    activity.as_deref().unwrap_or("all")
}

impl fmt::Display for AllocWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocWarning::Exhaustion { region, activity, unallocated } => write!(
                f,
                "capacity exhausted in region {region} ({}): {unallocated} unallocated",
                activity_label(activity)
            ),
            AllocWarning::NonConvergence { region, activity, iterations } => write!(
                f,
                "reconciliation in region {region} ({}) did not converge after {iterations} iterations",
                activity_label(activity)
            ),
            AllocWarning::EmptyGroup { region } => {
                write!(f, "region {region} has no recipients")
            }
            AllocWarning::CommitmentExceedsTarget { region, activity, excess } => write!(
                f,
                "existing activity in region {region} ({}) exceeds the target by {excess}",
                activity_label(activity)
            ),
            AllocWarning::Forfeited { region, activity, forfeited } => write!(
                f,
                "{forfeited} units in region {region} ({}) fell below the minimum size and were forfeited",
                activity_label(activity)
            ),
        }
    }
}
