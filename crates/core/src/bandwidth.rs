// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Bandwidth limit management
//!
//! The local copy of the limits is optimistic only until the backend
//! answers: every successful update replaces it wholesale with the
//! server's echoed values (the server may clamp a request). A failed
//! update leaves the local copy untouched.

use std::sync::{Arc, RwLock};

use tracing::info;

use unscroll_common::{BandwidthLimits, Result};

use crate::api::ApiClient;

pub struct BandwidthManager {
    api: Arc<ApiClient>,
    current: RwLock<BandwidthLimits>,
}

impl BandwidthManager {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            current: RwLock::new(BandwidthLimits::default()),
        }
    }

    /// The last server-confirmed limits
    pub fn current(&self) -> BandwidthLimits {
        self.current.read().expect("limits lock poisoned").clone()
    }

    /// Seed local limits from the user record
    pub async fn refresh(&self) -> Result<BandwidthLimits> {
        let user = self.api.user_info().await?;
        let limits = user.limits();
        *self.current.write().expect("limits lock poisoned") = limits.clone();
        Ok(limits)
    }

    /// Propose new limits; the server's echo is what gets stored
    pub async fn set_limits(
        &self,
        upload_mbps: Option<u32>,
        download_mbps: Option<u32>,
    ) -> Result<BandwidthLimits> {
        let response = self.api.update_bandwidth(upload_mbps, download_mbps).await?;
        info!(message = %response.message, "bandwidth limits updated");

        let limits = response.limits();
        *self.current.write().expect("limits lock poisoned") = limits.clone();
        Ok(limits)
    }
}
