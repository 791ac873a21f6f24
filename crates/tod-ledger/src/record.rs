//! Plain data rows handed back to the host.

use tod_core::{ActivityMap, ActivityType, RecipientId, RegionId};

/// Per-recipient allocation across every activity.
#[derive(Clone, Debug, PartialEq)]
pub struct AllocationRecord {
    pub recipient: RecipientId,
    pub region:    RegionId,
    pub allocated: ActivityMap<f64>,
}

impl AllocationRecord {
    pub fn new(recipient: RecipientId, region: RegionId) -> Self {
        Self { recipient, region, allocated: ActivityMap::splat(0.0) }
    }

    /// Flatten into one row per activity, skipping zero allocations.
    pub fn rows(&self) -> impl Iterator<Item = AllocationRow> + '_ {
        self.allocated
            .iter()
            .filter(|&(_, &amount)| amount > 0.0)
            .map(|(activity, &allocated)| AllocationRow {
                recipient: self.recipient,
                activity,
                allocated,
            })
    }
}

/// `{recipient_id, activity, allocated_amount}`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationRow {
    pub recipient: RecipientId,
    pub activity:  ActivityType,
    pub allocated: f64,
}

/// `{region_id, activity, unallocated_remainder}`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnallocatedRow {
    pub region:      RegionId,
    pub activity:    ActivityType,
    pub unallocated: f64,
}

/// `{recipient_id, activity, adjusted_target}`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjustedTargetRow {
    pub recipient:       RecipientId,
    pub group:           RegionId,
    pub activity:        String,
    pub adjusted_target: f64,
}
