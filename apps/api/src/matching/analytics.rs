//! Analytics Aggregator — reduces the curated matched-mapping into per-role
//! counts and grand totals for display.
//!
//! Baseline policy: `applied_count` and `passed_count` both equal the number
//! of surviving candidates for the role. They are deliberately separate
//! fields so a richer pipeline-stage model can diverge them without changing
//! the persisted shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::curation::CuratedOutput;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAnalytics {
    pub applied_count: u32,
    pub passed_count: u32,
}

/// Per-role counts plus grand totals. An empty matched-mapping yields an
/// empty report, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub per_role: BTreeMap<String, RoleAnalytics>,
    pub total_applications: u32,
    pub total_passed: u32,
}

pub fn aggregate(curated: &CuratedOutput) -> AnalyticsReport {
    let per_role: BTreeMap<String, RoleAnalytics> = curated
        .matched
        .iter()
        .map(|(role, candidates)| {
            let count = candidates.len() as u32;
            (
                role.clone(),
                RoleAnalytics {
                    applied_count: count,
                    passed_count: count,
                },
            )
        })
        .collect();

    let total_applications = per_role.values().map(|a| a.applied_count).sum();
    let total_passed = per_role.values().map(|a| a.passed_count).sum();

    AnalyticsReport {
        per_role,
        total_applications,
        total_passed,
    }
}
