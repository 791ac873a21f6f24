//! `tod-core`: foundational types for the `rust_tod` allocation engine.
//!
//! This crate is a dependency of every other `tod-*` crate.  It has no
//! `tod-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `RecipientId`, `RegionId`                             |
//! | [`activity`]    | `ActivityType` enum, `ActivityMap<T>`                 |
//! | [`config`]      | `EngineConfig`                                        |
//! | [`rng`]         | `SeededRng`                                           |
//! | [`warning`]     | `AllocWarning` (non-fatal outcomes)                   |
//! | [`error`]       | `AllocError`, `AllocResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod activity;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod warning;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use activity::{ActivityMap, ActivityType};
pub use config::EngineConfig;
pub use error::{AllocError, AllocResult};
pub use ids::{RecipientId, RegionId};
pub use rng::SeededRng;
pub use warning::AllocWarning;
