// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Tunnel configuration store
//!
//! Loads and saves the single logical tunnel profile through the platform
//! backend. The persisted handle obtained at save time may not yet be
//! valid for control operations, so every save reloads and returns the
//! validated instance.

use std::sync::Arc;

use tracing::{debug, warn};

use unscroll_common::{Error, Result, TunnelProfile};

use super::backend::TunnelBackend;

pub struct ProfileStore {
    backend: Arc<dyn TunnelBackend>,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn TunnelBackend>) -> Self {
        Self { backend }
    }

    /// Load the canonical profile, if any
    ///
    /// The first profile encountered is canonical; extras left behind by
    /// platform quirks are ignored, not deleted.
    pub async fn load(&self) -> Result<Option<TunnelProfile>> {
        let mut profiles = self.backend.load_profiles().await?;

        if profiles.len() > 1 {
            warn!(
                count = profiles.len(),
                "multiple tunnel profiles found, using the first"
            );
        }

        if profiles.is_empty() {
            Ok(None)
        } else {
            Ok(Some(profiles.remove(0)))
        }
    }

    /// Persist a profile and reload it to obtain a usable handle
    pub async fn save_and_reload(&self, profile: &TunnelProfile) -> Result<TunnelProfile> {
        self.backend.save_profile(profile).await?;
        debug!(profile = %profile.display_name, "tunnel profile saved");

        let profiles = self.backend.load_profiles().await?;
        profiles
            .into_iter()
            .find(|p| p.bundle_identifier == profile.bundle_identifier)
            .ok_or_else(|| Error::SaveFailed("profile missing after reload".to_string()))
    }
}
