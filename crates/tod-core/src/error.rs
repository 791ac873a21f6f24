//! Engine error type.
//!
//! Errors are fatal for the record or region that raised them.  Conditions
//! that still leave a usable (partial) result are reported as
//! [`AllocWarning`](crate::AllocWarning)s instead and never travel through
//! this type.

use thiserror::Error;

use crate::{ActivityType, RecipientId, RegionId};

/// The shared error taxonomy for all `tod-*` crates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no control totals for region {0}")]
    MissingRegion(RegionId),

    #[error("region {region} has no control total for activity {activity}")]
    MissingActivity {
        region:   RegionId,
        activity: ActivityType,
    },

    #[error("unknown activity key {0:?}")]
    UnknownActivity(String),

    #[error("unknown gradient {0:?}")]
    UnknownGradient(String),

    #[error("invalid gradient: {0}")]
    InvalidGradient(String),

    #[error("{recipient} has invalid {activity} capacity {value}")]
    InvalidCapacity {
        recipient: RecipientId,
        activity:  ActivityType,
        value:     f64,
    },

    #[error("region {region} has invalid {activity} control total {value}")]
    NegativeControl {
        region:   RegionId,
        activity: ActivityType,
        value:    f64,
    },

    #[error("{0} appears more than once")]
    DuplicateRecipient(RecipientId),
}

/// Shorthand result type for all `tod-*` crates.
pub type AllocResult<T> = Result<T, AllocError>;
