//! The segment allocator and its outcome type.

use std::cmp::Ordering;

use tod_core::{ActivityMap, ActivityType, AllocError, AllocResult, AllocWarning, RegionId};
use tod_ledger::{AllocationRecord, AllocationRow, ControlRegion, Recipient, UnallocatedRow};
use tracing::{debug, warn};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Result of allocating one region.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentOutcome {
    pub region:      RegionId,
    /// One record per recipient, in rank order.
    pub records:     Vec<AllocationRecord>,
    /// Control left over once every recipient was visited.
    pub unallocated: ActivityMap<f64>,
    pub warnings:    Vec<AllocWarning>,
}

impl SegmentOutcome {
    /// Amount handed out for `activity` across all recipients.
    pub fn allocated_total(&self, activity: ActivityType) -> f64 {
        self.records.iter().map(|r| r.allocated[activity]).sum()
    }

    /// `{recipient, activity, allocated}` rows, skipping zeros.
    pub fn allocation_rows(&self) -> impl Iterator<Item = AllocationRow> + '_ {
        self.records.iter().flat_map(AllocationRecord::rows)
    }

    /// `{region, activity, unallocated}` rows for every activity.
    pub fn unallocated_rows(&self) -> impl Iterator<Item = UnallocatedRow> + '_ {
        self.unallocated.iter().map(|(activity, &unallocated)| UnallocatedRow {
            region: self.region.clone(),
            activity,
            unallocated,
        })
    }
}

// ── Allocator ─────────────────────────────────────────────────────────────────

/// Greedy, rank-ordered fill of a region's control totals.
///
/// Stateless: every call owns only the region and recipients it is handed.
#[derive(Copy, Clone, Debug, Default)]
pub struct SegmentAllocator;

impl SegmentAllocator {
    pub fn new() -> Self {
        SegmentAllocator
    }

    /// Allocate `region`'s remaining control totals to `recipients`, breaking
    /// suitability ties by ascending recipient id.
    pub fn allocate(
        &self,
        region:     &mut ControlRegion,
        recipients: &[Recipient],
    ) -> AllocResult<SegmentOutcome> {
        self.allocate_by_key(region, recipients, |r| r.id)
    }

    /// Like [`allocate`](Self::allocate) but breaks suitability ties with a
    /// caller-supplied key (ascending).
    ///
    /// Recipients with zero or negative capacity for an activity are skipped
    /// for that activity.  `region.remaining` is drawn down in place; the
    /// leftover is also copied into [`SegmentOutcome::unallocated`].
    pub fn allocate_by_key<K, F>(
        &self,
        region:     &mut ControlRegion,
        recipients: &[Recipient],
        tie_key:    F,
    ) -> AllocResult<SegmentOutcome>
    where
        K: Ord,
        F: Fn(&Recipient) -> K,
    {
        check_inputs(region, recipients)?;
        debug!(region = %region.id, recipients = recipients.len(), "segment allocation start");

        let mut warnings = Vec::new();
        if recipients.is_empty() {
            let warning = AllocWarning::EmptyGroup { region: region.id.clone() };
            warn!(%warning, "allocation warning");
            warnings.push(warning);
            return Ok(SegmentOutcome {
                region:      region.id.clone(),
                records:     Vec::new(),
                unallocated: region.remaining,
                warnings,
            });
        }

        let mut ranked: Vec<&Recipient> = recipients.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b).then_with(|| tie_key(a).cmp(&tie_key(b))));

        let mut records: Vec<AllocationRecord> = ranked
            .iter()
            .map(|r| AllocationRecord::new(r.id, region.id.clone()))
            .collect();

        for (recipient, record) in ranked.iter().zip(records.iter_mut()) {
            if region.is_exhausted() {
                break;
            }
            for activity in ActivityType::ALL {
                let cap = recipient.capacity_for(activity);
                if cap <= 0.0 || region.remaining(activity) <= 0.0 {
                    continue;
                }
                record.allocated[activity] = region.draw(activity, cap);
            }
        }

        for (activity, &left) in region.remaining.iter() {
            if left > 0.0 {
                let warning = AllocWarning::Exhaustion {
                    region:      region.id.clone(),
                    activity:    Some(activity.key().to_owned()),
                    unallocated: left,
                };
                warn!(%warning, "allocation warning");
                warnings.push(warning);
            }
        }

        debug!(
            region    = %region.id,
            allocated = region.original.total() - region.remaining.total(),
            remaining = region.remaining.total(),
            "segment allocation end"
        );

        Ok(SegmentOutcome {
            region: region.id.clone(),
            records,
            unallocated: region.remaining,
            warnings,
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Higher suitability first.
fn rank_order(a: &Recipient, b: &Recipient) -> Ordering {
    b.suitability.total_cmp(&a.suitability)
}

fn check_inputs(region: &ControlRegion, recipients: &[Recipient]) -> AllocResult<()> {
    for (activity, &value) in region.remaining.iter() {
        if !value.is_finite() || value < 0.0 {
            return Err(AllocError::NegativeControl {
                region: region.id.clone(),
                activity,
                value,
            });
        }
    }
    if let Some(stray) = recipients.iter().find(|r| r.region != region.id) {
        return Err(AllocError::Config(format!(
            "{} belongs to region {}, not {}",
            stray.id, stray.region, region.id
        )));
    }
    Ok(())
}
