// Unscroll - CLI Client
// Command-line interface for the tunnel lifecycle and bandwidth control

mod backend;
mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

use unscroll_common::{
    format_duration, ComparisonPeriod, Trend, TunnelState, UsageComparison,
};
use unscroll_core::{
    authenticate, credentials_for_device, load_snapshot, status_channel, AlwaysEntitled,
    ApiClient, AuthOutcome, BandwidthManager, TunnelController, TunnelDescriptor, UsageBridge,
};

use backend::WgQuickBackend;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "unscroll")]
#[command(about = "Doomscroll throttling from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate this device against the backend
    Login,

    /// Drop the stored backend session
    Logout,

    /// Show the backend account record
    Account,

    /// Show the current tunnel state
    Status,

    /// Fetch a fresh config and start the tunnel
    Connect {
        /// Seconds to wait for the tunnel to come up
        #[arg(long, default_value = "30")]
        wait_secs: u64,
    },

    /// Stop the tunnel
    Disconnect,

    /// Connect if down, disconnect if up
    Toggle,

    /// Fetch the tunnel configuration metadata
    Config,

    /// Show or set bandwidth limits
    Bandwidth {
        #[command(subcommand)]
        command: BandwidthCommands,
    },

    /// Inspect usage snapshots from the reporting collaborator
    Usage {
        #[command(subcommand)]
        command: UsageCommands,
    },
}

#[derive(Subcommand)]
enum BandwidthCommands {
    /// Show the server-confirmed limits
    Show,

    /// Propose new limits; the server's echo is what sticks
    Set {
        /// Upload limit in Mbps (omit for unlimited)
        #[arg(long)]
        upload: Option<u32>,

        /// Download limit in Mbps (omit for unlimited)
        #[arg(long)]
        download: Option<u32>,
    },
}

#[derive(Subcommand)]
enum UsageCommands {
    /// Show today's snapshot
    Show {
        /// Snapshot JSON file dropped by the reporting collaborator
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Compare today against a baseline period
    Compare {
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "yesterday")]
        period: Period,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Period {
    Yesterday,
    Week,
    Month,
}

impl From<Period> for ComparisonPeriod {
    fn from(period: Period) -> Self {
        match period {
            Period::Yesterday => ComparisonPeriod::Yesterday,
            Period::Week => ComparisonPeriod::Week,
            Period::Month => ComparisonPeriod::Month,
        }
    }
}

fn tunnel_descriptor() -> TunnelDescriptor {
    TunnelDescriptor {
        bundle_identifier: "app.unscroll.tunnel".to_string(),
        display_name: "Unscroll".to_string(),
        server_address: "Unscroll VPN".to_string(),
    }
}

/// Wire the controller over the wg-quick adapter
fn build_controller(api: Arc<ApiClient>) -> Result<Arc<TunnelController>> {
    let (handle, inbox) = status_channel();
    let backend = Arc::new(WgQuickBackend::new(handle)?);

    Ok(TunnelController::new(
        api,
        backend,
        Arc::new(AlwaysEntitled),
        tunnel_descriptor(),
        inbox,
    ))
}

fn print_state(state: TunnelState) {
    let rendered = match state {
        TunnelState::Connected => state.as_str().green().bold(),
        TunnelState::Connecting | TunnelState::Reasserting | TunnelState::Disconnecting => {
            state.as_str().yellow()
        }
        TunnelState::Disconnected => state.as_str().normal(),
        TunnelState::Invalid => state.as_str().red().bold(),
    };
    println!("Tunnel: {rendered}");
}

fn default_snapshot_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(data_dir.join("unscroll").join("screentime.json"))
}

fn load_bridge(file: Option<PathBuf>) -> Result<UsageBridge> {
    let path = match file {
        Some(path) => path,
        None => default_snapshot_path()?,
    };

    let bridge = UsageBridge::new();
    match load_snapshot(&path) {
        Ok(snapshot) => bridge.ingest(snapshot),
        Err(err) => {
            // Snapshots may simply never arrive; show "no data" downstream.
            tracing::debug!(%err, path = %path.display(), "no usage snapshot available");
        }
    }
    Ok(bridge)
}

async fn wait_for_settled(
    controller: &TunnelController,
    wait_secs: u64,
) -> TunnelState {
    let mut watch = controller.watch();

    let settled = tokio::time::timeout(Duration::from_secs(wait_secs), async {
        loop {
            let state = *watch.borrow_and_update();
            if matches!(state, TunnelState::Connected | TunnelState::Invalid) {
                return state;
            }
            if watch.changed().await.is_err() {
                return state;
            }
        }
    })
    .await;

    settled.unwrap_or_else(|_| controller.state())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = CliConfig::load()?;

    let api = Arc::new(
        ApiClient::new(config.api_base_url.as_str()).context("Failed to build API client")?,
    );
    if !config.auth_token.is_empty() {
        api.set_token(config.auth_token.as_str());
    }

    match cli.command {
        Commands::Login => {
            let creds = credentials_for_device(&config.device_id, config.app_domain());
            let outcome = authenticate(&api, &creds)
                .await
                .context("Backend authentication failed")?;

            match outcome {
                AuthOutcome::LoggedIn => println!("{}", "Logged in.".green()),
                AuthOutcome::Registered => {
                    println!("{}", "Registered a new account and logged in.".green())
                }
            }

            if let Some(token) = api.token() {
                config.auth_token = token;
                config.save()?;
            }

            let user = api.user_info().await.context("Failed to fetch account")?;
            println!("Account: {} <{}>", user.username.bold(), user.email);
        }

        Commands::Logout => {
            api.clear_token();
            config.auth_token.clear();
            config.save()?;
            println!("Signed out.");
        }

        Commands::Account => {
            let user = api.user_info().await.context("Failed to fetch account")?;
            println!("Username:  {}", user.username.bold());
            println!("Email:     {}", user.email);
            println!("Tunnel IP: {}", user.ip_address);
            println!("Created:   {}", user.created_at);
            println!(
                "Active:    {}",
                if user.is_active {
                    "yes".green()
                } else {
                    "no".red()
                }
            );
        }

        Commands::Status => {
            let controller = build_controller(api)?;
            let state = controller
                .refresh_status()
                .await
                .context("Failed to query tunnel state")?;
            print_state(state);
        }

        Commands::Connect { wait_secs } => {
            let controller = build_controller(api)?;
            controller.refresh_status().await?;
            controller.connect().await.context("Failed to connect")?;

            let state = wait_for_settled(&controller, wait_secs).await;
            print_state(state);
        }

        Commands::Disconnect => {
            let controller = build_controller(api)?;
            controller.refresh_status().await?;
            controller
                .disconnect()
                .await
                .context("Failed to disconnect")?;

            let state = controller.refresh_status().await?;
            print_state(state);
        }

        Commands::Toggle => {
            let controller = build_controller(api)?;
            controller.refresh_status().await?;
            let was_connected = controller.is_connected();
            controller.toggle().await.context("Toggle failed")?;

            if was_connected {
                let state = controller.refresh_status().await?;
                print_state(state);
            } else {
                let state = wait_for_settled(&controller, 30).await;
                print_state(state);
            }
        }

        Commands::Config => {
            let tunnel_config = api
                .vpn_config()
                .await
                .context("Failed to fetch tunnel config")?;
            println!(
                "Config: {} bytes of tunnel configuration",
                tunnel_config.config_text.len()
            );
            match tunnel_config.qr_code_url {
                Some(url) => println!("QR:     {url}"),
                None => println!("QR:     not provided"),
            }
        }

        Commands::Bandwidth { command } => {
            let manager = BandwidthManager::new(api);

            let limits = match command {
                BandwidthCommands::Show => manager
                    .refresh()
                    .await
                    .context("Failed to fetch bandwidth limits")?,
                BandwidthCommands::Set { upload, download } => manager
                    .set_limits(upload, download)
                    .await
                    .context("Failed to update bandwidth limits")?,
            };

            let render = |limit: Option<u32>| match limit {
                Some(mbps) => format!("{mbps} Mbps"),
                None => "unlimited".to_string(),
            };
            println!("Upload:   {}", render(limits.upload_mbps));
            println!("Download: {}", render(limits.download_mbps));
        }

        Commands::Usage { command } => match command {
            UsageCommands::Show { file } => {
                let bridge = load_bridge(file)?;
                let Some(snapshot) = bridge.latest() else {
                    println!("No usage data available.");
                    return Ok(());
                };

                println!(
                    "Today: {} across {} apps",
                    format_duration(snapshot.total_duration_secs).bold(),
                    snapshot.apps.len()
                );

                let mut table = Table::new();
                table
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["App", "Category", "Time"]);
                for app in &snapshot.apps {
                    table.add_row(vec![
                        Cell::new(&app.name),
                        Cell::new(&app.category),
                        Cell::new(format_duration(app.duration_secs)),
                    ]);
                }
                println!("{table}");
            }

            UsageCommands::Compare { file, period } => {
                let bridge = load_bridge(file)?;
                match bridge.compare(period.into()) {
                    UsageComparison::NotApplicable => {
                        println!("Not enough data to compare yet.");
                    }
                    UsageComparison::Change { percent, direction } => {
                        let summary = format!("{:+.1}% vs baseline", percent);
                        match direction {
                            Trend::Improved => {
                                println!("{} {}", summary.green().bold(), "(less scrolling)")
                            }
                            Trend::Worsened => {
                                println!("{} {}", summary.red().bold(), "(more scrolling)")
                            }
                            Trend::Unchanged => println!("{summary}"),
                        }
                    }
                }
            }
        },
    }

    Ok(())
}
