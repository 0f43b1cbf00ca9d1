//! # lumad
//!
//! Composition root that wires persistence, origins, and the service
//! together.
//!
//! ## Responsibilities
//! - Parse configuration (`luma.toml`, env vars)
//! - Initialize tracing
//! - Initialize the `SQLite` pool and run migrations
//! - Construct the vendor origins from their credential sections
//! - Validate the children registry
//! - Start the service and wait for ctrl-c
//!
//! ## Dependency rule
//! This is the only crate that depends on all other crates. It is the
//! wiring layer, no domain logic belongs here.

use std::collections::BTreeMap;
use std::sync::Arc;

use luma_adapter_hubitat::{HttpMaker, HubitatOrigin};
use luma_adapter_philips::{HttpBridge, PhilipsOrigin};
use luma_adapter_storage_sqlite_sqlx::{Config as DatabaseConfig, SqlitePersistStore};
use luma_adapter_ubiquiti::{HttpController, UbiquitiOrigin};
use luma_app::ports::{Origin, Origins};
use luma_app::service::Service;

mod config;

use config::{Config, OriginConfig};

fn build_origins(configs: &BTreeMap<String, OriginConfig>) -> anyhow::Result<Origins> {
    let mut origins = Origins::new();
    for (name, section) in configs {
        let origin: Arc<dyn Origin> = match section {
            OriginConfig::Philips(bridge) => {
                Arc::new(PhilipsOrigin::new(name.clone(), HttpBridge::new(bridge)?))
            }
            OriginConfig::Hubitat(maker) => {
                Arc::new(HubitatOrigin::new(name.clone(), HttpMaker::new(maker)?))
            }
            OriginConfig::Ubiquiti(controller) => Arc::new(UbiquitiOrigin::new(
                name.clone(),
                HttpController::new(controller)?,
            )),
        };
        origins.insert(name.clone(), origin);
    }
    Ok(origins)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    let database = DatabaseConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let store = SqlitePersistStore::new(database.pool().clone());

    let origins = build_origins(&config.origins)?;
    let children = config.children()?;

    let handle = Service::start(children, origins, store, config.service.options())?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    handle.stop().await;

    Ok(())
}
