//! Station target push-down.
//!
//! A station's targets are spread over its development sub-areas in four
//! steps:
//!
//! 1. **Total**: water-fill `residential + jobs + hotel` by density weight
//!    (density gradient at the sub-area's distance × area, optionally ×
//!    suitability).
//! 2. **Residential**: water-fill the residential target by mix weight,
//!    capped at each sub-area's total.
//! 3. **Hotel**: lottery over the non-residential remainder, weighted and
//!    capped by it, with the station's minimum hotel size.
//! 4. **Jobs**: whatever non-residential activity the hotel lottery left,
//!    forfeited hotel units included.

use tod_core::{AllocError, AllocResult, AllocWarning, EngineConfig, RecipientId, RegionId};
use tod_ledger::{DevArea, StationActivity, StationPlan, StationTargets, TargetRow};
use rand::Rng;
use tracing::{debug, warn};

use crate::{FillSlot, GradientWeightedDistributor, LotteryAllocator, LotteryEntry};

/// Key used in warnings for the combined station total.
const TOTAL_KEY: &str = "total";

/// Distributed activity for one sub-area.
#[derive(Clone, Debug, PartialEq)]
pub struct DevAreaAllocation {
    pub id:             RecipientId,
    pub distance:       f64,
    pub density_weight: f64,
    pub total:          f64,
    pub residential:    f64,
    pub nonresidential: f64,
    pub jobs:           f64,
    pub hotel:          f64,
    /// Existing activity carried through from the input.
    pub existing:       StationTargets,
}

impl DevAreaAllocation {
    fn new(area: &DevArea, density_weight: f64) -> Self {
        Self {
            id: area.id,
            distance: area.distance,
            density_weight,
            total: 0.0,
            residential: 0.0,
            nonresidential: 0.0,
            jobs: 0.0,
            hotel: 0.0,
            existing: area.existing,
        }
    }

    pub fn targets(&self) -> StationTargets {
        StationTargets::new(self.residential, self.jobs, self.hotel)
    }
}

/// Result of distributing one station.
#[derive(Clone, Debug, PartialEq)]
pub struct StationOutcome {
    pub region:   RegionId,
    pub areas:    Vec<DevAreaAllocation>,
    /// Sums over `areas`.
    pub summary:  StationTargets,
    pub warnings: Vec<AllocWarning>,
}

impl StationOutcome {
    /// One target row per sub-area and measure, ready for reconciliation
    /// against existing activity.
    pub fn target_rows(&self) -> impl Iterator<Item = TargetRow> + '_ {
        self.areas.iter().flat_map(move |area| {
            StationActivity::ALL.into_iter().map(move |activity| TargetRow {
                recipient: area.id,
                group:     self.region.clone(),
                activity:  activity.key().to_owned(),
                existing:  area.existing.get(activity),
                target:    area.targets().get(activity),
            })
        })
    }
}

/// Runs the four-step push-down for station plans.
#[derive(Clone, Debug)]
pub struct StationDistributor {
    fill:            GradientWeightedDistributor,
    use_suitability: bool,
}

impl StationDistributor {
    pub fn new(config: &EngineConfig) -> AllocResult<Self> {
        Ok(Self {
            fill:            GradientWeightedDistributor::new(config.allocable_unit)?,
            use_suitability: config.use_suitability,
        })
    }

    /// Distribute `plan`'s targets over its sub-areas.  Hotel draws come from
    /// `rng`, which should be scoped to this station.
    pub fn distribute<R: Rng + ?Sized>(
        &self,
        plan: &StationPlan,
        rng:  &mut R,
    ) -> AllocResult<StationOutcome> {
        let region = &plan.region;
        let template = &plan.template;
        let mut warnings = Vec::new();
        debug!(region = %region, areas = plan.dev_areas.len(), "station distribution start");

        if plan.dev_areas.is_empty() {
            let warning = AllocWarning::EmptyGroup { region: region.clone() };
            warn!(%warning, "allocation warning");
            warnings.push(warning);
            return Ok(StationOutcome {
                region: region.clone(),
                areas: Vec::new(),
                summary: StationTargets::default(),
                warnings,
            });
        }

        let mut areas = Vec::with_capacity(plan.dev_areas.len());
        for area in &plan.dev_areas {
            areas.push(DevAreaAllocation::new(area, self.density_weight(plan, area)?));
        }

        // ── 1. Total activity ─────────────────────────────────────────────
        let total = self.fill.distribute_by(
            template.targets.total(),
            &mut areas,
            |a| a.density_weight,
            |_| None,
            |a| &mut a.total,
        )?;
        warnings.extend(total.warning(region, TOTAL_KEY));

        // ── 2. Residential, capped by each area's total ───────────────────
        let mix: Vec<f64> = plan
            .dev_areas
            .iter()
            .map(|area| template.mix_gradient.as_ref().map_or(1.0, |g| g.weight_at(area.distance)))
            .collect();
        let mut slots: Vec<FillSlot> = areas
            .iter()
            .zip(&mix)
            .map(|(a, &w)| FillSlot::new(w).with_ceiling(a.total))
            .collect();
        let residential = self.fill.distribute(template.targets.residential, &mut slots)?;
        warnings.extend(residential.warning(region, StationActivity::Residential.key()));
        for (area, slot) in areas.iter_mut().zip(&slots) {
            area.residential = slot.sum;
            area.nonresidential = area.total - area.residential;
        }

        // ── 3. Hotel lottery over the non-residential remainder ───────────
        let lottery = LotteryAllocator::new(template.min_hotel_size)?;
        let mut entries: Vec<LotteryEntry> = areas
            .iter()
            .map(|a| LotteryEntry::new(a.nonresidential, a.nonresidential))
            .collect();
        let hotel = lottery.allocate(template.targets.hotel, &mut entries, rng)?;
        if hotel.unplaced > 0.0 {
            warnings.push(AllocWarning::Exhaustion {
                region:      region.clone(),
                activity:    Some(StationActivity::Hotel.key().to_owned()),
                unallocated: hotel.unplaced,
            });
        }
        if hotel.forfeited > 0.0 {
            warnings.push(AllocWarning::Forfeited {
                region:    region.clone(),
                activity:  Some(StationActivity::Hotel.key().to_owned()),
                forfeited: hotel.forfeited,
            });
        }

        // ── 4. Jobs take the rest ─────────────────────────────────────────
        let mut summary = StationTargets::default();
        for (area, entry) in areas.iter_mut().zip(&entries) {
            area.hotel = entry.allocated;
            area.jobs = area.nonresidential - area.hotel;
            summary.add(&area.targets());
        }

        for warning in &warnings {
            warn!(%warning, "allocation warning");
        }
        debug!(
            region      = %region,
            residential = summary.residential,
            jobs        = summary.jobs,
            hotel       = summary.hotel,
            "station distribution end"
        );

        Ok(StationOutcome { region: region.clone(), areas, summary, warnings })
    }

    fn density_weight(&self, plan: &StationPlan, area: &DevArea) -> AllocResult<f64> {
        let base = plan.template.density_gradient.weight_at(area.distance) * area.area;
        if !self.use_suitability {
            return Ok(base);
        }
        match area.suitability {
            Some(score) => Ok(base * score),
            None => Err(AllocError::Config(format!(
                "{} in station {} has no suitability score",
                area.id, plan.region
            ))),
        }
    }
}
