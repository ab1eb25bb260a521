// Error types for Unscroll

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Server returned status {status}")]
    Server { status: u16 },

    #[error("Failed to decode server response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to persist tunnel profile: {0}")]
    SaveFailed(String),

    #[error("No tunnel configuration available")]
    NoConfiguration,

    #[error("Tunnel failed to start: {cause}")]
    ConnectionFailed { cause: String },

    #[error("Another tunnel operation is in flight")]
    Busy,

    #[error("Active subscription required")]
    SubscriptionRequired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
