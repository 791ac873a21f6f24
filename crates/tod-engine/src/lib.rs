//! `tod-engine`: runs the allocators over whole tables, one region at a time.
//!
//! # Passes
//!
//! ```text
//! allocate_segments   Ledger        → SegmentRun   (allocation + unallocated rows)
//! distribute_stations [StationPlan] → StationRun   (per-sub-area targets)
//! reconcile_targets   [TargetRow]   → ReconcileRun (adjusted-target rows)
//! ```
//!
//! Every pass isolates failures per region: an invalid region is recorded in
//! the run's `failures` and the rest carry on.  Warnings ride along in the run
//! and are also handed to the observer as they occur.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tod_core::EngineConfig;
//! use tod_engine::{Engine, TracingObserver};
//! use tod_ledger::LedgerBuilder;
//!
//! let ledger = LedgerBuilder::new()
//!     .recipients(parcels)
//!     .control_totals(controls)
//!     .build();
//! let engine = Engine::new(EngineConfig { seed: 7, ..Default::default() })?;
//! let run = engine.allocate_segments(&ledger, &mut TracingObserver);
//! ```

pub mod engine;
pub mod observer;
pub mod run;


pub use engine::Engine;
pub use observer::{AllocationObserver, NoopObserver, Pass, TracingObserver};
pub use run::{ReconcileRun, SegmentRun, StationRun};
