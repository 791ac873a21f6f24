//! `tod-gradient`: push a top-level target down onto weighted sub-recipients.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`distribute`] | `GradientWeightedDistributor`, `FillSlot`, `Distribution`       |
//! | [`lottery`]    | `LotteryAllocator`, `LotteryEntry`, `LotteryOutcome`            |
//! | [`station`]    | `StationDistributor`: total → residential → hotel → jobs        |
//!
//! # Water-filling (summary)
//!
//! ```text
//! loop:
//!     remaining = target − Σ sum
//!     stop if remaining ≤ 0 or no slot has positive weight
//!     for each slot with weight > 0:
//!         add = ceil_to_unit(weight / Σ weight × remaining)
//!         if add ≥ ceiling − sum: add = ceiling − sum, weight = 0
//!         sum += min(add, undistributed part of remaining)
//! ```
//!
//! Each pass either places all of `remaining` or zeroes at least one weight,
//! so the loop runs at most `slots + 1` times.

pub mod distribute;
pub mod lottery;
pub mod station;

#[cfg(test)]
mod tests;

pub use distribute::{Distribution, FillSlot, GradientWeightedDistributor};
pub use lottery::{LotteryAllocator, LotteryEntry, LotteryOutcome};
pub use station::{DevAreaAllocation, StationDistributor, StationOutcome};
