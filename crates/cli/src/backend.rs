// Unscroll - wg-quick Tunnel Backend
// Production TunnelBackend adapter: profiles persisted as TOML, tunnel
// brought up and down by spawning wg-quick on a rendered config file.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use unscroll_common::{Error, Result, TunnelProfile, TunnelState};
use unscroll_core::{StatusHandle, TunnelBackend};

/// Interface name wg-quick derives from the config file name
const INTERFACE: &str = "unscroll0";

pub struct WgQuickBackend {
    profiles_dir: PathBuf,
    runtime_dir: PathBuf,
    status: StatusHandle,
}

impl WgQuickBackend {
    /// Create a backend rooted in the user's config directory
    pub fn new(status: StatusHandle) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        let base = config_dir.join("unscroll");

        Ok(Self::with_dirs(
            base.join("profiles"),
            base.join("run"),
            status,
        ))
    }

    /// Create a backend over explicit directories
    pub fn with_dirs(profiles_dir: PathBuf, runtime_dir: PathBuf, status: StatusHandle) -> Self {
        Self {
            profiles_dir,
            runtime_dir,
            status,
        }
    }

    fn conf_path(&self) -> PathBuf {
        self.runtime_dir.join(format!("{INTERFACE}.conf"))
    }

    fn profile_path(&self, profile: &TunnelProfile) -> PathBuf {
        self.profiles_dir
            .join(format!("{}.toml", profile.bundle_identifier))
    }

    /// Render the tunnel config to the runtime file wg-quick consumes
    fn write_conf(&self, config_text: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.runtime_dir)?;

        let path = self.conf_path();
        std::fs::write(&path, config_text)?;

        // wg-quick refuses world-readable configs
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(path)
    }

    async fn wg_quick(&self, action: &str, conf: &PathBuf) -> Result<()> {
        let output = Command::new("wg-quick")
            .arg(action)
            .arg(conf)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::ConnectionFailed {
                cause: format!("wg-quick {action} failed: {}", stderr.trim()),
            })
        }
    }
}

#[async_trait]
impl TunnelBackend for WgQuickBackend {
    async fn load_profiles(&self) -> Result<Vec<TunnelProfile>> {
        if !self.profiles_dir.exists() {
            debug!(
                "Profiles directory does not exist: {}",
                self.profiles_dir.display()
            );
            return Ok(Vec::new());
        }

        let mut profiles = Vec::new();

        for entry in std::fs::read_dir(&self.profiles_dir)? {
            let path = entry?.path();

            // Skip non-TOML files
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                continue;
            }

            let contents = std::fs::read_to_string(&path)?;
            match toml::from_str::<TunnelProfile>(&contents) {
                Ok(profile) => {
                    debug!("Loaded profile: {}", profile.display_name);
                    profiles.push(profile);
                }
                Err(e) => {
                    warn!("Failed to load profile {}: {}", path.display(), e);
                }
            }
        }

        Ok(profiles)
    }

    async fn save_profile(&self, profile: &TunnelProfile) -> Result<()> {
        std::fs::create_dir_all(&self.profiles_dir)?;

        let contents = toml::to_string_pretty(profile)
            .map_err(|e| Error::SaveFailed(e.to_string()))?;
        std::fs::write(self.profile_path(profile), contents)?;

        debug!("Saved profile '{}'", profile.display_name);
        Ok(())
    }

    async fn start(&self, profile: &TunnelProfile) -> Result<()> {
        let config_text = profile.tunnel_config().ok_or(Error::NoConfiguration)?;
        let conf = self.write_conf(config_text)?;

        self.status.notify(TunnelState::Connecting);

        match self.wg_quick("up", &conf).await {
            Ok(()) => {
                self.status.notify(TunnelState::Connected);
                Ok(())
            }
            Err(err) => {
                self.status.notify(TunnelState::Invalid);
                Err(err)
            }
        }
    }

    async fn stop(&self, _profile: &TunnelProfile) -> Result<()> {
        let conf = self.conf_path();
        if !conf.exists() {
            debug!("No rendered config, tunnel was never started here");
            self.status.notify(TunnelState::Disconnected);
            return Ok(());
        }

        self.status.notify(TunnelState::Disconnecting);

        if let Err(err) = self.wg_quick("down", &conf).await {
            // Interface already gone counts as stopped.
            warn!(%err, "wg-quick down failed, treating tunnel as stopped");
        }
        self.status.notify(TunnelState::Disconnected);
        Ok(())
    }

    async fn status(&self, _profile: &TunnelProfile) -> Result<TunnelState> {
        if !self.conf_path().exists() {
            return Ok(TunnelState::Disconnected);
        }

        let output = Command::new("wg").arg("show").arg(INTERFACE).output().await;
        match output {
            Ok(output) if output.status.success() => Ok(TunnelState::Connected),
            Ok(_) => Ok(TunnelState::Disconnected),
            Err(err) => {
                warn!(%err, "wg not available, reporting disconnected");
                Ok(TunnelState::Disconnected)
            }
        }
    }
}
