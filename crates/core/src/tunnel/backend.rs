// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Platform tunnel subsystem capability
//!
//! The controller's state machine is decoupled from any specific OS
//! tunneling API behind this trait. Production wires in a real platform
//! adapter; tests use an in-memory double. Status changes are not part of
//! the trait: adapters post them through the controller's `StatusHandle`.

use async_trait::async_trait;

use unscroll_common::{Result, TunnelProfile, TunnelState};

#[async_trait]
pub trait TunnelBackend: Send + Sync {
    /// Enumerate the platform's persisted tunnel profiles
    async fn load_profiles(&self) -> Result<Vec<TunnelProfile>>;

    /// Persist a profile; callers must reload before start/stop
    async fn save_profile(&self, profile: &TunnelProfile) -> Result<()>;

    /// Request tunnel start; completion is reported via notifications
    async fn start(&self, profile: &TunnelProfile) -> Result<()>;

    /// Request tunnel stop
    async fn stop(&self, profile: &TunnelProfile) -> Result<()>;

    /// Query the platform's current view of the tunnel state
    async fn status(&self, profile: &TunnelProfile) -> Result<TunnelState>;
}
