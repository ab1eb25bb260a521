// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

// Unscroll - Common Library
// Shared types, error taxonomy, and wire models

pub mod error;
pub mod profile;
pub mod types;
pub mod usage;

pub use error::{Error, Result};
pub use profile::{TunnelProfile, TUNNEL_CONFIG_KEY};
pub use types::{
    AuthTokenResponse, BandwidthLimits, BandwidthUpdate, BandwidthUpdateResponse, TunnelConfig,
    TunnelState, UserRecord,
};
pub use usage::{
    format_duration, AppUsage, ComparisonPeriod, HistoricalAverages, Trend, UsageComparison,
    UsageSnapshot,
};

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
