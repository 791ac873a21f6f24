//! Input row types.
//!
//! These mirror the host's tables one row at a time.  Ids arrive already
//! typed; activity keys arrive as text because control and target tables
//! name them in a column.

use tod_core::{ActivityMap, RecipientId, RegionId};

/// One row of the recipient (parcel) table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecipientRow {
    pub recipient:   RecipientId,
    pub region:      RegionId,
    pub suitability: f64,
    pub capacity:    ActivityMap<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub existing:    Option<ActivityMap<f64>>,
}

/// One row of the control-total table: `{region, activity, net_demand}`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlTotalRow {
    pub region:     RegionId,
    pub activity:   String,
    pub net_demand: f64,
}

/// One row of the gradient table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradientRow {
    pub gradient:    String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub weight:      f64,
}

/// One row of the station template table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationRow {
    pub region:             RegionId,
    pub residential_target: f64,
    pub job_target:         f64,
    pub hotel_target:       f64,
    pub density_gradient:   String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mix_gradient:       Option<String>,
    pub min_hotel_size:     f64,
}

/// One development sub-area around a station.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DevAreaRow {
    pub recipient:            RecipientId,
    pub region:               RegionId,
    pub distance:             f64,
    pub area:                 f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub suitability:          Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub existing_residential: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub existing_jobs:        f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub existing_hotel:       f64,
}

/// One `(recipient, measure)` pair to reconcile against existing activity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetRow {
    pub recipient: RecipientId,
    pub group:     RegionId,
    pub activity:  String,
    pub existing:  f64,
    pub target:    f64,
}
