//! `tod-reconcile`: lower development targets to respect committed activity.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`reconciler`] | `CommitmentReconciler`, `Commitment`, `Reconciliation`       |
//! | [`groups`]     | `TargetGroup`, `GroupOutcome`, table-level grouping          |
//!
//! # Algorithm (summary)
//!
//! ```text
//! if Σ target == 0: done
//! repeat up to max_iterations:
//!     over  = { i : existing[i] > target[i] }
//!     stop if over is empty
//!     increment = Σ over (existing − target);  target[over] = existing
//!     gap[i]    = target[i] − existing[i]  for i ∉ over
//!     if Σ gap == 0: target = existing; stop
//!     target[i] = max(existing[i], target[i] − gap[i] / Σ gap × increment)
//! ```
//!
//! When `Σ existing ≤ Σ target` the group total is conserved.  Otherwise no
//! feasible answer exists; every target ends at its existing amount and the
//! excess is reported as a warning.

pub mod groups;
pub mod reconciler;


pub use groups::{GroupOutcome, TargetGroup, group_targets};
pub use reconciler::{Commitment, CommitmentReconciler, Reconciliation};
