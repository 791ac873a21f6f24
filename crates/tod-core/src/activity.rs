//! Activity types and the fixed-size per-activity map.
//!
//! The activity set is small and closed, so per-activity quantities are kept
//! in a plain array indexed by the enum discriminant rather than a hash map.
//! Iteration always follows declaration order, which keeps allocation output
//! deterministic.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::AllocError;

/// A kind of floor area that can be allocated to a recipient.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityType {
    SingleFamily,
    Multifamily,
    Retail,
    Industrial,
    Office,
    Hotel,
}

impl ActivityType {
    /// Number of activity types.
    pub const COUNT: usize = 6;

    /// Every activity type, in declaration order.
    pub const ALL: [ActivityType; Self::COUNT] = [
        ActivityType::SingleFamily,
        ActivityType::Multifamily,
        ActivityType::Retail,
        ActivityType::Industrial,
        ActivityType::Office,
        ActivityType::Hotel,
    ];

    /// Position of this activity in [`ActivityType::ALL`].
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short key used in control and capacity tables.
    pub fn key(self) -> &'static str {
        match self {
            ActivityType::SingleFamily => "SF",
            ActivityType::Multifamily  => "MF",
            ActivityType::Retail       => "Ret",
            ActivityType::Industrial   => "Ind",
            ActivityType::Office       => "Off",
            ActivityType::Hotel        => "Hot",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ActivityType {
    type Err = AllocError;

    /// Accepts the short table keys (`"MF"`, `"Ret"`, …) or the snake-case
    /// names (`"multifamily"`, `"retail"`, …), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let activity = match lower.as_str() {
            "sf" | "single_family" | "singlefamily" => ActivityType::SingleFamily,
            "mf" | "multifamily" | "multi_family"   => ActivityType::Multifamily,
            "ret" | "retail"                        => ActivityType::Retail,
            "ind" | "industrial"                    => ActivityType::Industrial,
            "off" | "office"                        => ActivityType::Office,
            "hot" | "hotel"                         => ActivityType::Hotel,
            _ => return Err(AllocError::UnknownActivity(s.to_owned())),
        };
        Ok(activity)
    }
}

// ── ActivityMap ───────────────────────────────────────────────────────────────

/// One value of `T` per [`ActivityType`].
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityMap<T>([T; ActivityType::COUNT]);

impl<T> ActivityMap<T> {
    /// Build a map by evaluating `f` once per activity.
    pub fn from_fn(mut f: impl FnMut(ActivityType) -> T) -> Self {
        ActivityMap(ActivityType::ALL.map(&mut f))
    }

    /// `(activity, &value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ActivityType, &T)> {
        ActivityType::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ActivityType, &mut T)> {
        ActivityType::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl<T: Copy> ActivityMap<T> {
    /// A map holding `value` for every activity.
    pub fn splat(value: T) -> Self {
        ActivityMap([value; ActivityType::COUNT])
    }
}

impl ActivityMap<f64> {
    /// Sum over all activities.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// `true` when every entry is zero or below.
    pub fn is_exhausted(&self) -> bool {
        self.0.iter().all(|&v| v <= 0.0)
    }
}

impl<T> Index<ActivityType> for ActivityMap<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, activity: ActivityType) -> &T {
        &self.0[activity.index()]
    }
}

impl<T> IndexMut<ActivityType> for ActivityMap<T> {
    #[inline(always)]
    fn index_mut(&mut self, activity: ActivityType) -> &mut T {
        &mut self.0[activity.index()]
    }
}
