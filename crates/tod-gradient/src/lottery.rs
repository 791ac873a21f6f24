//! Discrete lottery allocation for indivisible activity.
//!
//! Some activity only makes sense above a minimum size (a hotel needs enough
//! rooms to operate).  The lottery hands out one unit at a time to a randomly
//! drawn entry, then forfeits any entry that finished below the minimum.
//!
//! Forfeited units are not redistributed; they are reported in
//! [`LotteryOutcome::forfeited`] so the caller can decide what to do.
//!
//! # Draw weights
//!
//! An entry's chance on each draw is proportional to
//!
//!   weight × remaining_capacity / initial_capacity
//!
//! so it starts at `weight` and shrinks to zero as the entry fills up.  An
//! entry is never drawn once less than one unit of capacity remains.
//!
//! Draws go through a `WeightedIndex` that is patched after each win.  An
//! entry whose weight reaches zero forces a rebuild, so exhausted entries
//! carry an exact zero rather than a rounding residue.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tod_core::{AllocError, AllocResult};
use tracing::debug;

/// One candidate in a lottery.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LotteryEntry {
    pub weight:    f64,
    /// Capacity left to fill; drawn down by one unit per win.
    pub capacity:  f64,
    /// Amount accumulated so far.
    pub allocated: f64,
}

impl LotteryEntry {
    pub fn new(weight: f64, capacity: f64) -> Self {
        Self { weight, capacity, allocated: 0.0 }
    }
}

/// Summary of one lottery call.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LotteryOutcome {
    /// Units handed out, forfeited ones included.
    pub placed:    f64,
    /// Units taken back from entries that ended below the minimum.
    pub forfeited: f64,
    /// Units never handed out because no entry had capacity left.
    pub unplaced:  f64,
    pub draws:     usize,
}

impl LotteryOutcome {
    /// Units that stayed allocated.
    pub fn kept(&self) -> f64 {
        self.placed - self.forfeited
    }
}

/// Unit-by-unit weighted lottery with a minimum viable size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LotteryAllocator {
    unit:     f64,
    min_unit: f64,
}

impl LotteryAllocator {
    /// `min_unit` is the smallest amount an entry may keep.
    pub fn new(min_unit: f64) -> AllocResult<Self> {
        Self::with_unit(1.0, min_unit)
    }

    pub fn with_unit(unit: f64, min_unit: f64) -> AllocResult<Self> {
        if !(unit.is_finite() && unit > 0.0) {
            return Err(AllocError::Config(format!("lottery unit must be positive, got {unit}")));
        }
        if !min_unit.is_finite() || min_unit < 0.0 {
            return Err(AllocError::Config(format!(
                "minimum lottery size must be non-negative, got {min_unit}"
            )));
        }
        Ok(Self { unit, min_unit })
    }

    /// Place `total_units` worth of activity across `entries`.
    ///
    /// Entries whose starting capacity is below the minimum size are never
    /// drawn.  Drawing stops once every unit is placed or no entry can take
    /// another one.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        total_units: f64,
        entries:     &mut [LotteryEntry],
        rng:         &mut R,
    ) -> AllocResult<LotteryOutcome> {
        if !total_units.is_finite() || total_units < 0.0 {
            return Err(AllocError::Config(format!(
                "lottery total must be non-negative, got {total_units}"
            )));
        }
        for (i, e) in entries.iter().enumerate() {
            if !(e.weight.is_finite() && e.capacity.is_finite() && e.allocated.is_finite()) {
                return Err(AllocError::Config(format!("lottery entry {i} has a non-finite value")));
            }
        }

        let initial: Vec<f64> = entries.iter().map(|e| e.capacity).collect();
        let mut weights: Vec<f64> = entries
            .iter()
            .map(|e| if e.capacity >= self.min_unit { self.draw_weight(e, e.capacity) } else { 0.0 })
            .collect();

        let draws_wanted = (total_units / self.unit).floor() as usize;
        let mut outcome = LotteryOutcome::default();
        // `None` once no entry can be drawn.
        let mut index = WeightedIndex::new(&weights).ok();
        while outcome.draws < draws_wanted {
            let Some(dist) = index.as_mut() else { break };
            let i = dist.sample(rng);
            let entry = &mut entries[i];
            entry.allocated += self.unit;
            entry.capacity -= self.unit;
            outcome.draws += 1;

            weights[i] = self.draw_weight(entry, initial[i]);
            if weights[i] <= 0.0 || dist.update_weights(&[(i, &weights[i])]).is_err() {
                index = WeightedIndex::new(&weights).ok();
            }
        }
        outcome.placed = outcome.draws as f64 * self.unit;
        outcome.unplaced = total_units - outcome.placed;

        for entry in entries.iter_mut() {
            if entry.allocated > 0.0 && entry.allocated < self.min_unit {
                outcome.forfeited += entry.allocated;
                entry.capacity += entry.allocated;
                entry.allocated = 0.0;
            }
        }

        debug!(
            total     = total_units,
            placed    = outcome.placed,
            forfeited = outcome.forfeited,
            unplaced  = outcome.unplaced,
            "lottery done"
        );
        Ok(outcome)
    }

    /// Current draw weight for `entry` given its starting capacity.
    fn draw_weight(&self, entry: &LotteryEntry, initial_capacity: f64) -> f64 {
        if entry.weight <= 0.0 || entry.capacity < self.unit || initial_capacity <= 0.0 {
            return 0.0;
        }
        entry.weight * entry.capacity / initial_capacity
    }
}
