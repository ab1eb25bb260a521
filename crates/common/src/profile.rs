// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Locally persisted tunnel profile
//!
//! Exactly one logical profile exists per installation. The fetched tunnel
//! config text travels to the platform tunnel subsystem inside the
//! provider configuration map under a fixed key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provider-configuration key the tunnel extension reads its config from
pub const TUNNEL_CONFIG_KEY: &str = "wgQuickConfig";

/// The persisted, platform-registered tunnel descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelProfile {
    /// Identifier of the tunnel provider component
    pub bundle_identifier: String,
    /// Human-readable label shown by the platform
    pub display_name: String,
    /// Server address label passed to the platform tunnel subsystem
    pub server_address: String,
    /// Whether the profile is enabled for use
    pub enabled: bool,
    /// Opaque provider configuration handed to the tunnel extension
    #[serde(default)]
    pub provider_config: BTreeMap<String, String>,
}

impl TunnelProfile {
    pub fn new(
        bundle_identifier: impl Into<String>,
        display_name: impl Into<String>,
        server_address: impl Into<String>,
    ) -> Self {
        Self {
            bundle_identifier: bundle_identifier.into(),
            display_name: display_name.into(),
            server_address: server_address.into(),
            enabled: true,
            provider_config: BTreeMap::new(),
        }
    }

    /// Replace the tunnel config text carried in the provider configuration
    pub fn set_tunnel_config(&mut self, config_text: impl Into<String>) {
        self.provider_config
            .insert(TUNNEL_CONFIG_KEY.to_string(), config_text.into());
    }

    /// The tunnel config text, if one has been injected
    pub fn tunnel_config(&self) -> Option<&str> {
        self.provider_config
            .get(TUNNEL_CONFIG_KEY)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_injection_replaces_previous() {
        let mut profile = TunnelProfile::new("app.unscroll.tunnel", "Unscroll", "Unscroll VPN");
        assert!(profile.tunnel_config().is_none());

        profile.set_tunnel_config("first");
        profile.set_tunnel_config("second");
        assert_eq!(profile.tunnel_config(), Some("second"));
        assert_eq!(profile.provider_config.len(), 1);
    }

    #[test]
    fn test_profile_toml_round_trip() {
        let mut profile = TunnelProfile::new("app.unscroll.tunnel", "Unscroll", "Unscroll VPN");
        profile.set_tunnel_config("[Interface]\nPrivateKey = x");

        let text = toml::to_string_pretty(&profile).expect("Should serialize profile");
        let reloaded: TunnelProfile = toml::from_str(&text).expect("Should parse profile");
        assert_eq!(reloaded, profile);
    }
}
