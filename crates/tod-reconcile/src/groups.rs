//! Reconciliation over adjusted-target tables.
//!
//! A target table mixes many groups and measures.  Rows are split into one
//! [`TargetGroup`] per `(group, activity)` pair, each reconciled on its own.

use std::collections::{BTreeSet, HashMap};

use tod_core::{AllocError, AllocResult, AllocWarning, RegionId};
use tod_ledger::{AdjustedTargetRow, TargetRow};
use tracing::warn;

use crate::{CommitmentReconciler, Reconciliation};

/// Rows sharing a group and activity key.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetGroup<'a> {
    pub group:    RegionId,
    pub activity: String,
    pub rows:     Vec<&'a TargetRow>,
}

/// Split `rows` by `(group, activity)`, keeping first-appearance order for
/// groups and input order within each group.
pub fn group_targets(rows: &[TargetRow]) -> Vec<TargetGroup<'_>> {
    let mut groups: Vec<TargetGroup<'_>> = Vec::new();
    let mut index: HashMap<(&RegionId, &str), usize> = HashMap::new();
    for row in rows {
        let at = *index.entry((&row.group, row.activity.as_str())).or_insert_with(|| {
            groups.push(TargetGroup {
                group:    row.group.clone(),
                activity: row.activity.clone(),
                rows:     Vec::new(),
            });
            groups.len() - 1
        });
        groups[at].rows.push(row);
    }
    groups
}

/// Reconciled rows for one group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupOutcome {
    pub group:          RegionId,
    pub activity:       String,
    pub rows:           Vec<AdjustedTargetRow>,
    pub reconciliation: Reconciliation,
    pub warnings:       Vec<AllocWarning>,
}

impl CommitmentReconciler {
    /// Reconcile one group of target rows.
    ///
    /// A recipient listed twice in the same group is an error.
    pub fn reconcile_group(&self, group: &TargetGroup<'_>) -> AllocResult<GroupOutcome> {
        let mut seen = BTreeSet::new();
        for row in &group.rows {
            if !seen.insert(row.recipient) {
                return Err(AllocError::DuplicateRecipient(row.recipient));
            }
        }

        let reconciliation = self
            .reconcile_by(&group.rows, |r| r.existing, |r| r.target)
            .map_err(|e| match e {
                AllocError::Config(msg) => AllocError::Config(format!(
                    "group {} ({}): {msg}",
                    group.group, group.activity
                )),
                other => other,
            })?;

        let mut warnings = Vec::new();
        if group.rows.is_empty() {
            warnings.push(AllocWarning::EmptyGroup { region: group.group.clone() });
        }
        warnings.extend(reconciliation.warnings(&group.group, &group.activity));
        for warning in &warnings {
            warn!(%warning, "allocation warning");
        }

        let rows = group
            .rows
            .iter()
            .zip(&reconciliation.adjusted)
            .map(|(row, &adjusted_target)| AdjustedTargetRow {
                recipient: row.recipient,
                group:     row.group.clone(),
                activity:  row.activity.clone(),
                adjusted_target,
            })
            .collect();

        Ok(GroupOutcome {
            group: group.group.clone(),
            activity: group.activity.clone(),
            rows,
            reconciliation,
            warnings,
        })
    }

    /// Reconcile every `(group, activity)` pair in `rows`.
    ///
    /// Stops at the first invalid group; use [`group_targets`] with
    /// [`reconcile_group`](Self::reconcile_group) to isolate failures.
    pub fn reconcile_groups(
        &self,
        rows: &[TargetRow],
    ) -> AllocResult<(Vec<AdjustedTargetRow>, Vec<AllocWarning>)> {
        let mut adjusted = Vec::with_capacity(rows.len());
        let mut warnings = Vec::new();
        for group in group_targets(rows) {
            let outcome = self.reconcile_group(&group)?;
            adjusted.extend(outcome.rows);
            warnings.extend(outcome.warnings);
        }
        Ok((adjusted, warnings))
    }
}
