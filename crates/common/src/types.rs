// Common types for Unscroll

use serde::{Deserialize, Serialize};

/// Status of the on-device tunnel
///
/// Owned by the tunnel controller; mutated only by platform status
/// notifications or the controller's own transition requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TunnelState {
    Disconnected, // initial/terminal state
    Connecting,
    Connected,
    Reasserting,
    Disconnecting,
    Invalid,
}

impl Default for TunnelState {
    fn default() -> Self {
        TunnelState::Disconnected
    }
}

impl TunnelState {
    /// Check if the state represents an active connection
    pub fn is_connected(&self) -> bool {
        matches!(self, TunnelState::Connected)
    }

    /// States in which a stop request is meaningful
    pub fn is_stoppable(&self) -> bool {
        matches!(
            self,
            TunnelState::Connected | TunnelState::Connecting | TunnelState::Reasserting
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TunnelState::Disconnected => "disconnected",
            TunnelState::Connecting => "connecting",
            TunnelState::Connected => "connected",
            TunnelState::Reasserting => "reasserting",
            TunnelState::Disconnecting => "disconnecting",
            TunnelState::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for TunnelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token response from /api/register and /api/login
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokenResponse {
    #[serde(rename = "access_token")]
    pub token: String,
    pub token_type: String,
}

/// User record from /api/user/me
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub ip_address: String,
    pub created_at: String,
    pub is_active: bool,
    #[serde(rename = "upload_limit")]
    pub upload_mbps: Option<u32>,
    #[serde(rename = "download_limit")]
    pub download_mbps: Option<u32>,
}

/// Tunnel configuration issued by the backend per user
///
/// Fetched fresh on every connect attempt, never cached.
#[derive(Debug, Clone, Deserialize)]
pub struct TunnelConfig {
    #[serde(rename = "config")]
    pub config_text: String,
    pub qr_code_url: Option<String>,
}

/// Bandwidth limits in Mbps; `None` means unlimited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandwidthLimits {
    #[serde(rename = "upload_limit")]
    pub upload_mbps: Option<u32>,
    #[serde(rename = "download_limit")]
    pub download_mbps: Option<u32>,
}

/// Request body for PUT /api/user/bandwidth
///
/// Absent fields are omitted from the wire, not sent as null.
#[derive(Debug, Clone, Serialize)]
pub struct BandwidthUpdate {
    #[serde(rename = "upload_limit", skip_serializing_if = "Option::is_none")]
    pub upload_mbps: Option<u32>,
    #[serde(rename = "download_limit", skip_serializing_if = "Option::is_none")]
    pub download_mbps: Option<u32>,
}

/// Response from PUT /api/user/bandwidth
///
/// The echoed limits are authoritative; the server may clamp the request.
#[derive(Debug, Clone, Deserialize)]
pub struct BandwidthUpdateResponse {
    pub message: String,
    #[serde(rename = "upload_limit")]
    pub upload_mbps: Option<u32>,
    #[serde(rename = "download_limit")]
    pub download_mbps: Option<u32>,
}

impl BandwidthUpdateResponse {
    pub fn limits(&self) -> BandwidthLimits {
        BandwidthLimits {
            upload_mbps: self.upload_mbps,
            download_mbps: self.download_mbps,
        }
    }
}

impl UserRecord {
    pub fn limits(&self) -> BandwidthLimits {
        BandwidthLimits {
            upload_mbps: self.upload_mbps,
            download_mbps: self.download_mbps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_state_predicates() {
        assert!(TunnelState::Connected.is_connected());
        assert!(!TunnelState::Connecting.is_connected());
        assert!(TunnelState::Connecting.is_stoppable());
        assert!(TunnelState::Reasserting.is_stoppable());
        assert!(!TunnelState::Disconnected.is_stoppable());
        assert!(!TunnelState::Invalid.is_stoppable());
    }

    #[test]
    fn test_auth_token_wire_format() {
        let response: AuthTokenResponse =
            serde_json::from_str(r#"{"access_token":"abc123","token_type":"bearer"}"#)
                .expect("Should parse token response");
        assert_eq!(response.token, "abc123");
        assert_eq!(response.token_type, "bearer");
    }

    #[test]
    fn test_tunnel_config_wire_format() {
        let config: TunnelConfig =
            serde_json::from_str(r#"{"config":"[Interface]\nPrivateKey = x"}"#)
                .expect("Should parse config without QR url");
        assert!(config.config_text.starts_with("[Interface]"));
        assert!(config.qr_code_url.is_none());
    }

    #[test]
    fn test_bandwidth_response_wire_format() {
        let response: BandwidthUpdateResponse =
            serde_json::from_str(r#"{"message":"ok","upload_limit":10,"download_limit":15}"#)
                .expect("Should parse bandwidth response");
        assert_eq!(
            response.limits(),
            BandwidthLimits {
                upload_mbps: Some(10),
                download_mbps: Some(15),
            }
        );
    }

    #[test]
    fn test_user_record_wire_format() {
        let user: UserRecord = serde_json::from_str(
            r#"{
                "username": "user_abc",
                "email": "user_abc@unscroll.app",
                "ip_address": "10.8.0.2",
                "created_at": "2025-11-16T10:00:00Z",
                "is_active": true,
                "upload_limit": null,
                "download_limit": 50
            }"#,
        )
        .expect("Should parse user record");
        assert_eq!(user.username, "user_abc");
        assert_eq!(user.limits().download_mbps, Some(50));
        assert_eq!(user.limits().upload_mbps, None);
    }
}
