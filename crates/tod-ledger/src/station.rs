//! Station templates and the development sub-areas around each station.
//!
//! A station pushes a fixed activity target (residential units, jobs, hotel
//! rooms) down onto the sub-areas within its walkshed.  How steeply the
//! target falls off with distance is set by the station type's density
//! gradient; the residential share of each sub-area follows an optional mix
//! gradient.

use std::collections::BTreeMap;
use std::fmt;

use tod_core::{AllocError, AllocResult, RecipientId, RegionId};

use crate::{DevAreaRow, Gradient, GradientSet, RegionFailure, StationRow};

/// The measures a station target is expressed in.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum StationActivity {
    Residential,
    Jobs,
    Hotel,
}

impl StationActivity {
    pub const ALL: [StationActivity; 3] =
        [StationActivity::Residential, StationActivity::Jobs, StationActivity::Hotel];

    /// Column key used in target tables.
    pub fn key(self) -> &'static str {
        match self {
            StationActivity::Residential => "residential",
            StationActivity::Jobs        => "jobs",
            StationActivity::Hotel       => "hotel",
        }
    }
}

impl fmt::Display for StationActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Residential / jobs / hotel quantities.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StationTargets {
    pub residential: f64,
    pub jobs:        f64,
    pub hotel:       f64,
}

impl StationTargets {
    pub fn new(residential: f64, jobs: f64, hotel: f64) -> Self {
        Self { residential, jobs, hotel }
    }

    pub fn total(&self) -> f64 {
        self.residential + self.jobs + self.hotel
    }

    pub fn get(&self, activity: StationActivity) -> f64 {
        match activity {
            StationActivity::Residential => self.residential,
            StationActivity::Jobs        => self.jobs,
            StationActivity::Hotel       => self.hotel,
        }
    }

    /// Element-wise sum.
    pub fn add(&mut self, other: &StationTargets) {
        self.residential += other.residential;
        self.jobs += other.jobs;
        self.hotel += other.hotel;
    }
}

/// A station type applied to one station.
#[derive(Clone, Debug, PartialEq)]
pub struct StationTemplate {
    pub targets:          StationTargets,
    pub density_gradient: Gradient,
    pub mix_gradient:     Option<Gradient>,
    /// Smallest hotel worth building; smaller lottery results are forfeited.
    pub min_hotel_size:   f64,
}

/// A development sub-area.
#[derive(Clone, Debug, PartialEq)]
pub struct DevArea {
    pub id:          RecipientId,
    pub distance:    f64,
    pub area:        f64,
    pub suitability: Option<f64>,
    pub existing:    StationTargets,
}

/// One station with everything needed to distribute its targets.
#[derive(Clone, Debug, PartialEq)]
pub struct StationPlan {
    pub region:    RegionId,
    pub template:  StationTemplate,
    pub dev_areas: Vec<DevArea>,
}

impl StationPlan {
    /// Assemble station plans from template and sub-area rows.
    ///
    /// Stations keep the order of `stations`.  A station that names an
    /// unknown gradient or carries a negative target fails on its own; a
    /// sub-area pointing at a region with no station row is reported as a
    /// [`AllocError::MissingRegion`] failure for that region.
    pub fn from_tables(
        stations:  &[StationRow],
        dev_areas: &[DevAreaRow],
        gradients: &GradientSet,
    ) -> (Vec<StationPlan>, Vec<RegionFailure>) {
        let mut failures = Vec::new();
        let mut by_region: BTreeMap<&RegionId, Vec<DevArea>> = BTreeMap::new();
        for row in dev_areas {
            by_region.entry(&row.region).or_default().push(DevArea {
                id:          row.recipient,
                distance:    row.distance,
                area:        row.area,
                suitability: row.suitability,
                existing:    StationTargets::new(
                    row.existing_residential,
                    row.existing_jobs,
                    row.existing_hotel,
                ),
            });
        }

        let mut plans = Vec::with_capacity(stations.len());
        for row in stations {
            let areas = by_region.remove(&row.region).unwrap_or_default();
            match template_from_row(row, gradients) {
                Ok(template) => plans.push(StationPlan {
                    region: row.region.clone(),
                    template,
                    dev_areas: areas,
                }),
                Err(error) => failures.push(RegionFailure { region: row.region.clone(), error }),
            }
        }

        for region in by_region.into_keys() {
            failures.push(RegionFailure {
                region: region.clone(),
                error:  AllocError::MissingRegion(region.clone()),
            });
        }

        (plans, failures)
    }
}

fn template_from_row(row: &StationRow, gradients: &GradientSet) -> AllocResult<StationTemplate> {
    let targets = StationTargets::new(row.residential_target, row.job_target, row.hotel_target);
    for activity in StationActivity::ALL {
        let value = targets.get(activity);
        if !value.is_finite() || value < 0.0 {
            return Err(AllocError::Config(format!(
                "station {} has invalid {activity} target {value}",
                row.region
            )));
        }
    }
    if !row.min_hotel_size.is_finite() || row.min_hotel_size < 0.0 {
        return Err(AllocError::Config(format!(
            "station {} has invalid minimum hotel size {}",
            row.region, row.min_hotel_size
        )));
    }

    let density_gradient = gradients.get(&row.density_gradient)?.clone();
    let mix_gradient = match &row.mix_gradient {
        Some(name) => Some(gradients.get(name)?.clone()),
        None => None,
    };

    Ok(StationTemplate {
        targets,
        density_gradient,
        mix_gradient,
        min_hotel_size: row.min_hotel_size,
    })
}
