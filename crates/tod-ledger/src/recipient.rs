//! Allocation recipients.

use tod_core::{ActivityMap, ActivityType, AllocError, AllocResult, RecipientId, RegionId};

/// A parcel or development sub-area that can receive allocated activity.
#[derive(Clone, Debug, PartialEq)]
pub struct Recipient {
    pub id:              RecipientId,
    pub region:          RegionId,
    /// Higher is more preferred.
    pub suitability:     f64,
    /// Upper bound on what may be allocated, per activity.
    pub capacity:        ActivityMap<f64>,
    /// Already-built or approved activity.
    pub existing:        ActivityMap<f64>,
    /// Size-based multiplier (e.g. land area).  Defaults to 1.
    pub spatial_weight:  f64,
    /// Weight looked up from a distance gradient, once one has been applied.
    pub gradient_weight: Option<f64>,
}

impl Recipient {
    /// A recipient with no capacity and no existing activity.
    pub fn new(id: RecipientId, region: RegionId, suitability: f64) -> Self {
        Self {
            id,
            region,
            suitability,
            capacity:        ActivityMap::splat(0.0),
            existing:        ActivityMap::splat(0.0),
            spatial_weight:  1.0,
            gradient_weight: None,
        }
    }

    /// Set the capacity for one activity.
    pub fn with_capacity(mut self, activity: ActivityType, value: f64) -> Self {
        self.capacity[activity] = value;
        self
    }

    /// Set the existing amount for one activity.
    pub fn with_existing(mut self, activity: ActivityType, value: f64) -> Self {
        self.existing[activity] = value;
        self
    }

    /// Usable capacity for `activity`; zero for non-positive ceilings.
    #[inline]
    pub fn capacity_for(&self, activity: ActivityType) -> f64 {
        self.capacity[activity].max(0.0)
    }

    /// Combined distribution weight: gradient × spatial size, optionally
    /// scaled by suitability.  A recipient without a gradient weight uses 1.
    pub fn distribution_weight(&self, use_suitability: bool) -> f64 {
        let base = self.gradient_weight.unwrap_or(1.0) * self.spatial_weight;
        if use_suitability { base * self.suitability } else { base }
    }

    /// Reject negative or non-finite capacity and existing values.
    pub fn validate(&self) -> AllocResult<()> {
        for map in [&self.capacity, &self.existing] {
            for (activity, &value) in map.iter() {
                if !value.is_finite() || value < 0.0 {
                    return Err(AllocError::InvalidCapacity {
                        recipient: self.id,
                        activity,
                        value,
                    });
                }
            }
        }
        if !self.suitability.is_finite() {
            return Err(AllocError::Config(format!(
                "{} has non-finite suitability {}",
                self.id, self.suitability
            )));
        }
        Ok(())
    }
}
