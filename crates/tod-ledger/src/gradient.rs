//! Distance-decay gradients.
//!
//! A gradient is an ordered list of `[lower, upper] → weight` ranges over a
//! scalar domain (usually distance to a station).  Lookup is piecewise
//! constant: a value outside every range weighs zero.
//!
//! Ranges may touch but not overlap.  Both bounds are inclusive, and a value
//! sitting exactly on a shared boundary takes the weight of the range that
//! starts there, so `[0, 500] → 100` followed by `[500, 1000] → 75` gives
//! 75 at 500.

use std::collections::BTreeMap;

use tod_core::{AllocError, AllocResult};

use crate::GradientRow;

/// One `[lower, upper] → weight` step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientRange {
    pub lower:  f64,
    pub upper:  f64,
    pub weight: f64,
}

/// A piecewise-constant weight lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gradient {
    ranges: Vec<GradientRange>,
}

impl Gradient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(lower, upper, weight)` triples in any order.
    pub fn from_ranges(ranges: impl IntoIterator<Item = (f64, f64, f64)>) -> AllocResult<Self> {
        let mut gradient = Self::new();
        for (lower, upper, weight) in ranges {
            gradient.add_range(lower, upper, weight)?;
        }
        Ok(gradient)
    }

    /// Insert a range, keeping the list sorted by lower bound.
    ///
    /// Fails on inverted bounds, non-finite values, negative weights, or an
    /// overlap with an existing range.
    pub fn add_range(&mut self, lower: f64, upper: f64, weight: f64) -> AllocResult<()> {
        if !(lower.is_finite() && upper.is_finite() && weight.is_finite()) {
            return Err(AllocError::InvalidGradient(format!(
                "non-finite range ({lower}, {upper}, {weight})"
            )));
        }
        if lower > upper {
            return Err(AllocError::InvalidGradient(format!(
                "lower bound {lower} exceeds upper bound {upper}"
            )));
        }
        if weight < 0.0 {
            return Err(AllocError::InvalidGradient(format!(
                "negative weight {weight} for range [{lower}, {upper}]"
            )));
        }

        let at = self.ranges.partition_point(|r| r.lower <= lower);
        let overlaps_prev = at > 0 && self.ranges[at - 1].upper > lower;
        let overlaps_next = at < self.ranges.len() && self.ranges[at].lower < upper;
        let duplicate_start = at > 0 && self.ranges[at - 1].lower == lower;
        if overlaps_prev || overlaps_next || duplicate_start {
            return Err(AllocError::InvalidGradient(format!(
                "range [{lower}, {upper}] overlaps an existing range"
            )));
        }

        self.ranges.insert(at, GradientRange { lower, upper, weight });
        Ok(())
    }

    /// Weight of the range containing `value`, or zero.
    pub fn weight_at(&self, value: f64) -> f64 {
        // Last match wins so shared boundaries resolve to the upper range.
        self.ranges
            .iter()
            .rev()
            .find(|r| r.lower <= value && value <= r.upper)
            .map_or(0.0, |r| r.weight)
    }

    pub fn ranges(&self) -> &[GradientRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

// ── GradientSet ───────────────────────────────────────────────────────────────

/// Named gradients, as read from a gradient table.
#[derive(Clone, Debug, Default)]
pub struct GradientSet {
    by_name: BTreeMap<String, Gradient>,
}

impl GradientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group gradient rows by name.  Any invalid or overlapping range fails
    /// the whole table.
    pub fn from_rows(rows: &[GradientRow]) -> AllocResult<Self> {
        let mut set = Self::new();
        for row in rows {
            set.by_name
                .entry(row.gradient.clone())
                .or_default()
                .add_range(row.lower_bound, row.upper_bound, row.weight)
                .map_err(|e| match e {
                    AllocError::InvalidGradient(msg) => {
                        AllocError::InvalidGradient(format!("{}: {msg}", row.gradient))
                    }
                    other => other,
                })?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, name: impl Into<String>, gradient: Gradient) {
        self.by_name.insert(name.into(), gradient);
    }

    /// Look up a gradient by name.
    pub fn get(&self, name: &str) -> AllocResult<&Gradient> {
        self.by_name
            .get(name)
            .ok_or_else(|| AllocError::UnknownGradient(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
