//! Badge evaluation: which catalog entries a user newly satisfies.
//!
//! Evaluation is a pure read over counters + the earned set. It never
//! mutates anything; the processor decides what to persist.

use crate::catalog::{BadgeCatalog, BadgeDefinition};
use crate::counters::ActivityCounters;
use std::collections::HashSet;

/// Walk the catalog in declared order and return every definition that is
/// not already earned and whose metric has reached its requirement.
///
/// All newly satisfied badges come back in one pass, so an action that
/// jumps a counter across several thresholds (a backfill, say) awards all
/// of them together.
pub fn newly_satisfied<'a>(
    counters: &ActivityCounters,
    already_earned: &HashSet<String>,
    catalog: &'a BadgeCatalog,
) -> Vec<&'a BadgeDefinition> {
    catalog
        .iter()
        .filter(|badge| !already_earned.contains(badge.id.as_str()))
        .filter(|badge| counters.metric_value(badge.metric) >= badge.requirement)
        .collect()
}

/// Percentage progress toward one badge, clamped to 0..=100.
pub fn progress_toward(badge: &BadgeDefinition, counters: &ActivityCounters) -> u8 {
    let value = counters.metric_value(badge.metric).max(0);
    let pct = value.saturating_mul(100) / badge.requirement;
    pct.min(100) as u8
}
