// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Usage snapshot model
//!
//! Snapshots are produced wholesale by an external reporting collaborator
//! and are read-only to the core. Historical averages arrive pre-computed
//! and are absent until at least two distinct days of data exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time aggregate of per-application screen time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// When the collaborator produced this snapshot
    pub captured_at: DateTime<Utc>,
    /// Total screen time today, in seconds
    pub total_duration_secs: u64,
    /// Per-application breakdown, ordered by the collaborator
    #[serde(default)]
    pub apps: Vec<AppUsage>,
    /// Pre-computed baselines; absent until two distinct days exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical: Option<HistoricalAverages>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppUsage {
    pub name: String,
    /// Bundle identifier of the application
    pub id: String,
    pub duration_secs: u64,
    pub category: String,
}

/// Daily-average baselines in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistoricalAverages {
    pub yesterday_secs: u64,
    pub last7_avg_secs: u64,
    pub last30_avg_secs: u64,
}

/// Baseline period for usage comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonPeriod {
    Yesterday,
    Week,
    Month,
}

/// Direction of change relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Less usage than the baseline
    Improved,
    /// More usage than the baseline
    Worsened,
    Unchanged,
}

/// Result of comparing today's usage against a baseline period
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageComparison {
    /// No snapshot, no baseline for the period, or a zero baseline
    NotApplicable,
    Change { percent: f64, direction: Trend },
}

impl UsageSnapshot {
    /// Compare today's total against the given baseline period
    ///
    /// Positive percent means improvement (less usage than baseline).
    pub fn compare(&self, period: ComparisonPeriod) -> UsageComparison {
        let Some(historical) = self.historical else {
            return UsageComparison::NotApplicable;
        };

        let baseline = match period {
            ComparisonPeriod::Yesterday => historical.yesterday_secs,
            ComparisonPeriod::Week => historical.last7_avg_secs,
            ComparisonPeriod::Month => historical.last30_avg_secs,
        };

        if baseline == 0 {
            return UsageComparison::NotApplicable;
        }

        let baseline = baseline as f64;
        let percent = (baseline - self.total_duration_secs as f64) / baseline * 100.0;
        let direction = if percent > 0.0 {
            Trend::Improved
        } else if percent < 0.0 {
            Trend::Worsened
        } else {
            Trend::Unchanged
        };

        UsageComparison::Change { percent, direction }
    }
}

/// Render a duration in seconds as "2h 15m" / "42m"
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
