//! Fluent builder that turns host tables into a validated [`Ledger`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use tod_ledger::LedgerBuilder;
//!
//! let ledger = LedgerBuilder::new()
//!     .recipients(parcel_rows)
//!     .control_totals(control_rows)
//!     .build();
//!
//! for failure in &ledger.failures {
//!     eprintln!("skipping region {}: {}", failure.region, failure.error);
//! }
//! ```
//!
//! Validation failures are scoped to the region that raised them.  A bad
//! parcel row knocks out its own region; every other region is still built
//! and can be allocated.

use std::collections::{BTreeMap, HashSet};

use tod_core::{ActivityMap, ActivityType, AllocError, AllocResult, RecipientId, RegionId};
use tracing::{debug, warn};

use crate::{ControlRegion, ControlTotalRow, Recipient, RecipientRow};

/// A region that could not be built, with the reason.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionFailure {
    pub region: RegionId,
    pub error:  AllocError,
}

/// A control region and the recipients that belong to it.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionLedger {
    pub control:    ControlRegion,
    pub recipients: Vec<Recipient>,
}

impl RegionLedger {
    pub fn id(&self) -> &RegionId {
        &self.control.id
    }

    /// Total usable capacity for `activity` across the region's recipients.
    pub fn total_capacity(&self, activity: ActivityType) -> f64 {
        self.recipients.iter().map(|r| r.capacity_for(activity)).sum()
    }
}

/// Validated regions, in the order they first appear in the control table,
/// plus the regions that failed validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    pub regions:  Vec<RegionLedger>,
    pub failures: Vec<RegionFailure>,
}

impl Ledger {
    pub fn region(&self, id: &RegionId) -> Option<&RegionLedger> {
        self.regions.iter().find(|r| r.id() == id)
    }

    pub fn recipient_count(&self) -> usize {
        self.regions.iter().map(|r| r.recipients.len()).sum()
    }
}

/// Fluent builder for [`Ledger`].
#[derive(Default)]
pub struct LedgerBuilder {
    recipients: Vec<RecipientRow>,
    controls:   Vec<ControlTotalRow>,
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the recipient (parcel) table.
    pub fn recipients(mut self, rows: Vec<RecipientRow>) -> Self {
        self.recipients = rows;
        self
    }

    /// Supply the control-total table.
    pub fn control_totals(mut self, rows: Vec<ControlTotalRow>) -> Self {
        self.controls = rows;
        self
    }

    /// Validate the tables and group recipients under their regions.
    pub fn build(self) -> Ledger {
        let mut failed: BTreeMap<RegionId, AllocError> = BTreeMap::new();

        // ── Control totals, grouped in first-appearance order ─────────────
        let mut order: Vec<RegionId> = Vec::new();
        let mut totals: BTreeMap<RegionId, ActivityMap<Option<f64>>> = BTreeMap::new();
        for row in &self.controls {
            if !totals.contains_key(&row.region) {
                order.push(row.region.clone());
                totals.insert(row.region.clone(), ActivityMap::splat(None));
            }
            if failed.contains_key(&row.region) {
                continue;
            }
            if let Err(error) = record_control(&mut totals, row) {
                failed.insert(row.region.clone(), error);
            }
        }

        let mut regions: BTreeMap<RegionId, RegionLedger> = BTreeMap::new();
        for id in &order {
            if failed.contains_key(id) {
                continue;
            }
            match control_region(id, &totals[id]) {
                Ok(control) => {
                    regions.insert(id.clone(), RegionLedger { control, recipients: Vec::new() });
                }
                Err(error) => {
                    failed.insert(id.clone(), error);
                }
            }
        }

        // ── Recipients ────────────────────────────────────────────────────
        let mut seen: HashSet<RecipientId> = HashSet::with_capacity(self.recipients.len());
        for row in self.recipients {
            if failed.contains_key(&row.region) {
                continue;
            }
            if !totals.contains_key(&row.region) {
                failed.insert(row.region.clone(), AllocError::MissingRegion(row.region.clone()));
                order.push(row.region.clone());
                continue;
            }
            if !seen.insert(row.recipient) {
                failed.insert(row.region.clone(), AllocError::DuplicateRecipient(row.recipient));
                continue;
            }

            let recipient = recipient_from_row(row);
            if let Err(error) = recipient.validate() {
                failed.insert(recipient.region.clone(), error);
                continue;
            }
            if let Some(region) = regions.get_mut(&recipient.region) {
                region.recipients.push(recipient);
            }
        }

        // ── Assemble in table order ───────────────────────────────────────
        let mut ledger = Ledger::default();
        for id in order {
            if let Some(error) = failed.remove(&id) {
                warn!(region = %id, %error, "region failed validation");
                ledger.failures.push(RegionFailure { region: id, error });
            } else if let Some(region) = regions.remove(&id) {
                ledger.regions.push(region);
            }
        }

        debug!(
            regions    = ledger.regions.len(),
            recipients = ledger.recipient_count(),
            failures   = ledger.failures.len(),
            "ledger built"
        );
        ledger
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn record_control(
    totals: &mut BTreeMap<RegionId, ActivityMap<Option<f64>>>,
    row:    &ControlTotalRow,
) -> AllocResult<()> {
    let activity: ActivityType = row.activity.parse()?;
    let slot = &mut totals
        .get_mut(&row.region)
        .ok_or_else(|| AllocError::MissingRegion(row.region.clone()))?[activity];
    if slot.is_some() {
        return Err(AllocError::Config(format!(
            "region {} lists {activity} more than once",
            row.region
        )));
    }
    *slot = Some(row.net_demand);
    Ok(())
}

fn control_region(id: &RegionId, totals: &ActivityMap<Option<f64>>) -> AllocResult<ControlRegion> {
    let mut values = ActivityMap::splat(0.0);
    for (activity, value) in totals.iter() {
        values[activity] = value.ok_or_else(|| AllocError::MissingActivity {
            region: id.clone(),
            activity,
        })?;
    }
    ControlRegion::new(id.clone(), values)
}

fn recipient_from_row(row: RecipientRow) -> Recipient {
    let mut recipient = Recipient::new(row.recipient, row.region, row.suitability);
    recipient.capacity = row.capacity;
    if let Some(existing) = row.existing {
        recipient.existing = existing;
    }
    recipient
}
