// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

// Unscroll - Core Library
// Backend API client, tunnel lifecycle, bandwidth control, usage bridge

pub mod api;
pub mod auth;
pub mod bandwidth;
pub mod entitlement;
pub mod tunnel;
pub mod usage;

pub use api::{ApiClient, ConfigProvider};
pub use auth::{authenticate, credentials_for_device, AuthOutcome, BackendCredentials};
pub use bandwidth::BandwidthManager;
pub use entitlement::{AlwaysEntitled, EntitlementGate};
pub use tunnel::{
    status_channel, ProfileStore, StatusHandle, StatusInbox, TunnelBackend, TunnelController,
    TunnelDescriptor,
};
pub use usage::{load_snapshot, UsageBridge};

// Re-export the shared vocabulary so binaries depend on one crate
pub use unscroll_common::{Error, Result};
