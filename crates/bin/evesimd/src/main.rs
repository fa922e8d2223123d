//! # evesimd: Eve accessory emulator daemon
//!
//! Composition root that wires the host adapter and the accessory platforms
//! together and runs them until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the in-memory host shared by every accessory; each platform
//!   only ever unregisters its own devices
//! - Run one [`AccessoryPlatform`] per configured accessory through
//!   initialize → start → configure
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use evesim_adapter_host_memory::InMemoryHost;
use evesim_app::platform::AccessoryPlatform;
use evesim_domain::error::EmulatorError;
use tracing_subscriber::EnvFilter;

use config::{AccessoryConfig, Config};

type Platform = AccessoryPlatform<InMemoryHost>;

async fn launch(
    host: &Arc<InMemoryHost>,
    accessory: &AccessoryConfig,
    minimum: &str,
) -> Result<Platform, EmulatorError> {
    let mut platform =
        AccessoryPlatform::new(Arc::clone(host), accessory.kind, accessory.platform.clone());
    platform.initialize(minimum)?;
    platform.start(Some("daemon startup")).await?;
    platform.configure().await?;
    Ok(platform)
}

async fn shutdown_all(platforms: &mut [Platform], reason: &str) {
    for platform in platforms.iter_mut() {
        platform.shutdown(Some(reason)).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let host = Arc::new(
        InMemoryHost::new(config.host.version.clone()).with_log_capacity(config.host.log_capacity),
    );

    let mut platforms = Vec::with_capacity(config.accessories.len());
    for accessory in &config.accessories {
        match launch(&host, accessory, &config.host.minimum_version).await {
            Ok(platform) => platforms.push(platform),
            Err(err) => {
                tracing::error!(kind = %accessory.kind, error = %err, "failed to launch accessory");
                shutdown_all(&mut platforms, "startup failed").await;
                return Err(err.into());
            }
        }
    }

    tracing::info!(
        accessories = platforms.len(),
        host_version = %config.host.version,
        "evesimd running, press Ctrl-C to stop"
    );
    tokio::signal::ctrl_c().await?;

    tracing::info!("shutdown requested");
    shutdown_all(&mut platforms, "interrupted").await;
    for platform in &platforms {
        platform.history_dump(false).await;
    }
    Ok(())
}
