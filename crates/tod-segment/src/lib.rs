//! `tod-segment`: deterministic greedy allocation of regional control totals.
//!
//! # Crate layout
//!
//! | Module        | Contents                                          |
//! |---------------|---------------------------------------------------|
//! | [`allocator`] | `SegmentAllocator`, `SegmentOutcome`              |
//!
//! # Algorithm (summary)
//!
//! ```text
//! sort recipients by suitability desc, then by a stable secondary key
//! for each recipient, for each activity:
//!     take = min(capacity, remaining[activity])
//!     remaining[activity] -= take
//! stop once every remaining[activity] == 0
//! ```
//!
//! The fill guarantees, per region and activity,
//! `Σ allocated == min(control_total, Σ capacity)`.

pub mod allocator;


pub use allocator::{SegmentAllocator, SegmentOutcome};
