// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Usage snapshot bridge
//!
//! Narrow contract for receiving externally-computed usage aggregates.
//! The collaborator delivers snapshots on its own cadence, possibly never
//! and possibly out of order by day; the bridge keeps the latest one and
//! answers comparison queries from it.

use std::path::Path;
use std::sync::RwLock;

use tracing::{debug, warn};

use unscroll_common::{ComparisonPeriod, Result, UsageComparison, UsageSnapshot};

#[derive(Default)]
pub struct UsageBridge {
    latest: RwLock<Option<UsageSnapshot>>,
}

impl UsageBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest snapshot, overwriting the previous one
    ///
    /// A snapshot dated an earlier day than the one held is stale
    /// delivery and is dropped.
    pub fn ingest(&self, snapshot: UsageSnapshot) {
        let mut latest = self.latest.write().expect("snapshot lock poisoned");

        if let Some(current) = latest.as_ref() {
            if snapshot.captured_at.date_naive() < current.captured_at.date_naive() {
                warn!(
                    incoming = %snapshot.captured_at,
                    held = %current.captured_at,
                    "ignoring out-of-order usage snapshot"
                );
                return;
            }
        }

        debug!(apps = snapshot.apps.len(), "usage snapshot ingested");
        *latest = Some(snapshot);
    }

    /// The most recent snapshot, if any has arrived
    pub fn latest(&self) -> Option<UsageSnapshot> {
        self.latest.read().expect("snapshot lock poisoned").clone()
    }

    /// Compare today's usage against a baseline period
    pub fn compare(&self, period: ComparisonPeriod) -> UsageComparison {
        match self.latest.read().expect("snapshot lock poisoned").as_ref() {
            Some(snapshot) => snapshot.compare(period),
            None => UsageComparison::NotApplicable,
        }
    }
}

/// Read a snapshot from the collaborator's JSON document
pub fn load_snapshot(path: &Path) -> Result<UsageSnapshot> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use unscroll_common::HistoricalAverages;

    use super::*;

    fn snapshot_at(days_ago: i64, total: u64) -> UsageSnapshot {
        UsageSnapshot {
            captured_at: Utc::now() - Duration::days(days_ago),
            total_duration_secs: total,
            apps: Vec::new(),
            historical: None,
        }
    }

    #[test]
    fn test_compare_without_snapshot_is_not_applicable() {
        let bridge = UsageBridge::new();
        assert_eq!(
            bridge.compare(ComparisonPeriod::Yesterday),
            UsageComparison::NotApplicable
        );
    }

    #[test]
    fn test_ingest_overwrites_same_day() {
        let bridge = UsageBridge::new();
        bridge.ingest(snapshot_at(0, 100));
        bridge.ingest(snapshot_at(0, 200));

        assert_eq!(
            bridge.latest().map(|s| s.total_duration_secs),
            Some(200)
        );
    }

    #[test]
    fn test_ingest_drops_older_day() {
        let bridge = UsageBridge::new();
        bridge.ingest(snapshot_at(0, 100));
        bridge.ingest(snapshot_at(2, 999));

        assert_eq!(
            bridge.latest().map(|s| s.total_duration_secs),
            Some(100)
        );
    }

    #[test]
    fn test_compare_uses_latest_snapshot() {
        let bridge = UsageBridge::new();
        let mut snapshot = snapshot_at(0, 1800);
        snapshot.historical = Some(HistoricalAverages {
            yesterday_secs: 3600,
            last7_avg_secs: 0,
            last30_avg_secs: 7200,
        });
        bridge.ingest(snapshot);

        assert!(matches!(
            bridge.compare(ComparisonPeriod::Yesterday),
            UsageComparison::Change { .. }
        ));
        // Zero baseline for the week never divides.
        assert_eq!(
            bridge.compare(ComparisonPeriod::Week),
            UsageComparison::NotApplicable
        );
    }
}
