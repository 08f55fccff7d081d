// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Orderings and filters shared by every store.

use crate::days_ago;
use chrono::{DateTime, Utc};
use llm_health_core::TestResult;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub(crate) fn newest_first(mut records: Vec<TestResult>, limit: Option<usize>) -> Vec<TestResult> {
    records.sort_by(|a, b| b.tested_at.cmp(&a.tested_at));
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}

pub(crate) fn latest_per_integration(records: Vec<TestResult>) -> Vec<TestResult> {
    let mut latest: BTreeMap<String, TestResult> = BTreeMap::new();
    for record in records {
        match latest.get(&record.integration_name) {
            Some(current) if current.tested_at >= record.tested_at => {}
            _ => {
                latest.insert(record.integration_name.clone(), record);
            }
        }
    }

    let mut latest: Vec<TestResult> = latest.into_values().collect();
    latest.sort_by(|a, b| {
        b.compatibility_score
            .partial_cmp(&a.compatibility_score)
            .unwrap_or(Ordering::Equal)
    });
    latest
}

pub(crate) fn since(records: Vec<TestResult>, cutoff: DateTime<Utc>) -> Vec<TestResult> {
    let mut recent: Vec<TestResult> = records
        .into_iter()
        .filter(|r| r.tested_at >= cutoff)
        .collect();
    recent.sort_by(|a, b| a.tested_at.cmp(&b.tested_at));
    recent
}

pub(crate) fn history(records: Vec<TestResult>, integration_name: &str) -> Vec<TestResult> {
    let matching = records
        .into_iter()
        .filter(|r| r.integration_name == integration_name)
        .collect();
    newest_first(matching, None)
}

/// Split records into (kept, removed count) around `now - days`.
pub(crate) fn retain_recent(records: Vec<TestResult>, days: i64) -> (Vec<TestResult>, usize) {
    let cutoff = days_ago(days);
    let before = records.len();
    let kept: Vec<TestResult> = records
        .into_iter()
        .filter(|r| r.tested_at >= cutoff)
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(name: &str, hours_ago: i64, score: f64) -> TestResult {
        let mut result = TestResult::new(name, None);
        result.tested_at = Utc::now() - Duration::hours(hours_ago);
        result.compatibility_score = score;
        result
    }

    #[test]
    fn test_latest_per_integration_picks_newest_then_sorts_by_score() {
        let records = vec![
            record("a", 5, 0.9),
            record("a", 1, 0.2),
            record("b", 3, 0.5),
        ];
        let latest = latest_per_integration(records);
        let summary: Vec<(&str, f64)> = latest
            .iter()
            .map(|r| (r.integration_name.as_str(), r.compatibility_score))
            .collect();
        assert_eq!(summary, vec![("b", 0.5), ("a", 0.2)]);
    }

    #[test]
    fn test_retain_recent() {
        let records = vec![record("a", 24 * 100, 0.1), record("b", 1, 0.1)];
        let (kept, removed) = retain_recent(records, 90);
        assert_eq!(removed, 1);
        assert_eq!(kept[0].integration_name, "b");
    }

    #[test]
    fn test_retain_recent_with_out_of_range_days() {
        let records = vec![record("a", 24 * 100, 0.1), record("b", 1, 0.1)];
        let (kept, removed) = retain_recent(records, 1_000_000_000_000);
        assert_eq!(removed, 0);
        assert_eq!(kept.len(), 2);

        let (kept, removed) = retain_recent(kept, i64::MIN);
        assert_eq!(removed, 2);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_days_ago_saturates() {
        assert_eq!(days_ago(i64::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(days_ago(i64::MIN), DateTime::<Utc>::MAX_UTC);
        assert!(days_ago(1) < Utc::now());
    }

    #[test]
    fn test_newest_first_with_limit() {
        let records = vec![record("old", 10, 0.0), record("new", 1, 0.0), record("mid", 5, 0.0)];
        let names: Vec<String> = newest_first(records, Some(2))
            .into_iter()
            .map(|r| r.integration_name)
            .collect();
        assert_eq!(names, vec!["new", "mid"]);
    }
}
