//! Control regions and their remaining control totals.

use tod_core::{ActivityMap, ActivityType, AllocError, AllocResult, RegionId};

/// A grouping of recipients that shares one set of control totals.
///
/// Each allocation call owns the region it is given and draws `remaining`
/// down as it hands out activity.  `original` never changes and is what the
/// conservation checks compare against.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlRegion {
    pub id:        RegionId,
    pub original:  ActivityMap<f64>,
    pub remaining: ActivityMap<f64>,
}

impl ControlRegion {
    /// Create a region, rejecting negative or non-finite control totals.
    pub fn new(id: RegionId, totals: ActivityMap<f64>) -> AllocResult<Self> {
        for (activity, &value) in totals.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(AllocError::NegativeControl { region: id, activity, value });
            }
        }
        Ok(Self { id, original: totals, remaining: totals })
    }

    #[inline]
    pub fn remaining(&self, activity: ActivityType) -> f64 {
        self.remaining[activity]
    }

    /// Subtract up to `amount` from the remaining control for `activity` and
    /// return how much was actually taken.
    pub fn draw(&mut self, activity: ActivityType, amount: f64) -> f64 {
        let left = &mut self.remaining[activity];
        let taken = amount.max(0.0).min(*left);
        *left -= taken;
        taken
    }

    /// `true` once every activity's remaining control is zero.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_exhausted()
    }

    /// Amount handed out so far for `activity`.
    #[inline]
    pub fn allocated(&self, activity: ActivityType) -> f64 {
        self.original[activity] - self.remaining[activity]
    }
}
