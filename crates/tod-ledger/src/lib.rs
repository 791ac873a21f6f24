//! `tod-ledger`: the in-memory data model every allocator reads and writes.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`recipient`] | `Recipient`: a rankable parcel or sub-area                  |
//! | [`region`]    | `ControlRegion`: per-activity remaining control totals      |
//! | [`gradient`]  | `Gradient`, `GradientSet`: piecewise-constant weight tables |
//! | [`station`]   | `StationPlan`, `StationTemplate`, `DevArea`                 |
//! | [`table`]     | Input row types handed over by the host                     |
//! | [`record`]    | Output row types handed back to the host                    |
//! | [`builder`]   | `LedgerBuilder`, `Ledger`, `RegionLedger`                   |
//!
//! The host reads its tables however it likes and passes rows in; nothing in
//! this crate touches the filesystem.

pub mod builder;
pub mod gradient;
pub mod recipient;
pub mod record;
pub mod region;
pub mod station;
pub mod table;


pub use builder::{Ledger, LedgerBuilder, RegionFailure, RegionLedger};
pub use gradient::{Gradient, GradientRange, GradientSet};
pub use recipient::Recipient;
pub use record::{AdjustedTargetRow, AllocationRecord, AllocationRow, UnallocatedRow};
pub use region::ControlRegion;
pub use station::{DevArea, StationActivity, StationPlan, StationTargets, StationTemplate};
pub use table::{ControlTotalRow, DevAreaRow, GradientRow, RecipientRow, StationRow, TargetRow};
