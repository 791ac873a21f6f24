//! Iterative proportional ("water-filling") distribution.

use tod_core::{ActivityType, AllocError, AllocResult, AllocWarning, RegionId};
use tod_ledger::Recipient;
use tracing::{debug, trace};

/// Relative slack below which a remainder counts as fully placed.
const EPSILON: f64 = 1e-9;

// ── Slots ─────────────────────────────────────────────────────────────────────

/// One consumer in a water-filling pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FillSlot {
    /// Relative pull on the remaining target.  Zero drops the slot out.
    pub weight:  f64,
    /// Amount accumulated so far (existing allocation on entry).
    pub sum:     f64,
    /// Optional upper bound on `sum`.
    pub ceiling: Option<f64>,
}

impl FillSlot {
    pub fn new(weight: f64) -> Self {
        Self { weight, sum: 0.0, ceiling: None }
    }

    pub fn with_ceiling(mut self, ceiling: f64) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    pub fn with_sum(mut self, sum: f64) -> Self {
        self.sum = sum;
        self
    }
}

/// Summary of one water-filling call.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Distribution {
    pub target:      f64,
    /// Amount added by this call.
    pub distributed: f64,
    /// Part of the target left unplaced because every slot saturated.
    pub shortfall:   f64,
    pub iterations:  usize,
    /// Slots that hit their ceiling or fell below the minimum share.
    pub saturated:   usize,
}

impl Distribution {
    /// An exhaustion warning when part of the target went unplaced.
    pub fn warning(&self, region: &RegionId, activity: &str) -> Option<AllocWarning> {
        (self.shortfall > 0.0).then(|| AllocWarning::Exhaustion {
            region:      region.clone(),
            activity:    Some(activity.to_owned()),
            unallocated: self.shortfall,
        })
    }
}

// ── Distributor ───────────────────────────────────────────────────────────────

/// Proportional distribution of a target over weighted, optionally
/// capped slots.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientWeightedDistributor {
    unit:     f64,
    min_unit: Option<f64>,
}

impl Default for GradientWeightedDistributor {
    fn default() -> Self {
        Self { unit: 1.0, min_unit: None }
    }
}

impl GradientWeightedDistributor {
    /// Tentative shares are rounded up to a multiple of `unit`.
    pub fn new(unit: f64) -> AllocResult<Self> {
        if !(unit.is_finite() && unit > 0.0) {
            return Err(AllocError::Config(format!("allocable unit must be positive, got {unit}")));
        }
        Ok(Self { unit, min_unit: None })
    }

    /// Slots whose first-pass share falls below `min_unit` drop out with
    /// nothing added.  Later passes only top up slots that cleared it.
    pub fn with_min_unit(mut self, min_unit: f64) -> Self {
        self.min_unit = Some(min_unit);
        self
    }

    /// Water-fill `total` into `slots`, mutating each slot's `sum` and
    /// `weight` (saturated slots end with weight zero).
    pub fn distribute(&self, total: f64, slots: &mut [FillSlot]) -> AllocResult<Distribution> {
        validate(total, slots)?;

        let start: f64 = slots.iter().map(|s| s.sum).sum();
        let slack = EPSILON * total.abs().max(1.0);
        let mut result = Distribution { target: total, ..Default::default() };

        // Slots already at or over their ceiling never take part.
        for slot in slots.iter_mut() {
            if slot.ceiling.is_some_and(|c| slot.sum >= c) && slot.weight > 0.0 {
                slot.weight = 0.0;
                result.saturated += 1;
            }
        }

        // Every pass either places all of `remaining` or retires a slot, so
        // `slots.len() + 1` passes always suffice.
        for _ in 0..=slots.len() {
            let remaining = total - slots.iter().map(|s| s.sum).sum::<f64>();
            let weight_total: f64 = slots.iter().map(|s| s.weight).sum();
            if remaining <= slack || weight_total <= 0.0 {
                break;
            }

            result.iterations += 1;
            let first_pass = result.iterations == 1;
            let active_before = active_count(slots);
            let mut budget = remaining;
            for slot in slots.iter_mut() {
                if slot.weight <= 0.0 || budget <= 0.0 {
                    continue;
                }
                let share = slot.weight / weight_total * remaining;
                if first_pass && self.min_unit.is_some_and(|m| share < m) {
                    slot.weight = 0.0;
                    result.saturated += 1;
                    continue;
                }

                let mut add = self.round_up(share);
                if let Some(ceiling) = slot.ceiling {
                    let gap = (ceiling - slot.sum).max(0.0);
                    if add >= gap {
                        add = gap;
                        slot.weight = 0.0;
                        result.saturated += 1;
                    }
                }
                let add = add.min(budget);
                slot.sum += add;
                budget -= add;
            }
            trace!(
                pass      = result.iterations,
                remaining,
                placed    = remaining - budget,
                active    = active_count(slots),
                "water-fill pass"
            );

            if budget > slack && active_count(slots) == active_before {
                // Rounding left a sliver no active slot can absorb.
                break;
            }
        }

        let end: f64 = slots.iter().map(|s| s.sum).sum();
        result.distributed = end - start;
        let left = total - end;
        result.shortfall = if left > slack { left } else { 0.0 };
        debug!(
            target      = total,
            distributed = result.distributed,
            shortfall   = result.shortfall,
            iterations  = result.iterations,
            "water-fill done"
        );
        Ok(result)
    }

    /// Water-fill over arbitrary items through accessor closures.
    ///
    /// `sum_of` gives mutable access to the accumulator each item carries;
    /// its current value is the starting sum.
    pub fn distribute_by<T, W, C, S>(
        &self,
        total:      f64,
        items:      &mut [T],
        weight_of:  W,
        ceiling_of: C,
        mut sum_of: S,
    ) -> AllocResult<Distribution>
    where
        W: Fn(&T) -> f64,
        C: Fn(&T) -> Option<f64>,
        S: FnMut(&mut T) -> &mut f64,
    {
        let mut slots: Vec<FillSlot> = items
            .iter_mut()
            .map(|item| FillSlot {
                weight:  weight_of(&*item),
                ceiling: ceiling_of(&*item),
                sum:     *sum_of(item),
            })
            .collect();

        let result = self.distribute(total, &mut slots)?;
        for (item, slot) in items.iter_mut().zip(&slots) {
            *sum_of(item) = slot.sum;
        }
        Ok(result)
    }

    /// Water-fill `total` of `activity` over a region's recipients, weighted
    /// by [`Recipient::distribution_weight`] and capped by capacity.
    ///
    /// Returns the per-recipient amounts in input order.  Existing activity
    /// is not counted toward the target.
    pub fn distribute_recipients(
        &self,
        total:           f64,
        recipients:      &[Recipient],
        activity:        ActivityType,
        use_suitability: bool,
    ) -> AllocResult<(Vec<f64>, Distribution)> {
        let mut slots: Vec<FillSlot> = recipients
            .iter()
            .map(|r| {
                FillSlot::new(r.distribution_weight(use_suitability).max(0.0))
                    .with_ceiling(r.capacity_for(activity))
            })
            .collect();
        let result = self.distribute(total, &mut slots)?;
        Ok((slots.iter().map(|s| s.sum).collect(), result))
    }

    fn round_up(&self, share: f64) -> f64 {
        (share / self.unit).ceil() * self.unit
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn active_count(slots: &[FillSlot]) -> usize {
    slots.iter().filter(|s| s.weight > 0.0).count()
}

fn validate(total: f64, slots: &[FillSlot]) -> AllocResult<()> {
    if !total.is_finite() || total < 0.0 {
        return Err(AllocError::Config(format!("distribution target must be non-negative, got {total}")));
    }
    for (i, slot) in slots.iter().enumerate() {
        if !slot.weight.is_finite() || slot.weight < 0.0 {
            return Err(AllocError::Config(format!("slot {i} has invalid weight {}", slot.weight)));
        }
        if !slot.sum.is_finite() {
            return Err(AllocError::Config(format!("slot {i} has invalid sum {}", slot.sum)));
        }
        if let Some(c) = slot.ceiling {
            if !c.is_finite() || c < 0.0 {
                return Err(AllocError::Config(format!("slot {i} has invalid ceiling {c}")));
            }
        }
    }
    Ok(())
}
