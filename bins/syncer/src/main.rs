//! Operator CLI for Omie synchronization.
//!
//! Usage:
//!   syncer                       - Run the full sync sequence
//!   syncer <resource>            - Run one entity sync (categories,
//!                                  parties, projects, payables, movements)
//!   syncer <resource> --full     - Ignore the checkpoint, fetch everything
//!   syncer <resource> --days N   - Force an N-day window
//!
//! Exits non-zero only on startup failures; per-job failures are
//! reported in the printed steps (best-effort policy).

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lastro_core::omie::OmieResource;
use lastro_service::sync::{SyncOptions, SyncService};
use lastro_service::OmieClient;
use lastro_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lastro=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().map_err(|err| anyhow::anyhow!("configuration: {err}"))?;

    // Connect to database
    let db = lastro_db::connect(&config.database.url).await?;
    info!("Connected to database");

    // Build the sync service over the real ERP transport
    let transport = OmieClient::new(&config.omie)
        .map_err(|err| anyhow::anyhow!("omie client: {err}"))?;
    let service = SyncService::new(
        db,
        Arc::new(transport),
        config.sync.page_size,
        config.omie.page_cap,
    );

    let (resource, options) = parse_args()?;

    match resource {
        Some(resource) => {
            let report = service.sync_resource(resource, &options).await;
            match report {
                Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                Err(err) => println!(
                    "{}",
                    serde_json::json!({ "ok": false, "error": err.to_string() })
                ),
            }
        }
        None => {
            let report = service.run_full_sync(&options).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn parse_args() -> anyhow::Result<(Option<OmieResource>, SyncOptions)> {
    let mut resource = None;
    let mut options = SyncOptions::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--full" => options.full_sync = true,
            "--days" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--days requires a value"))?;
                options.force_days = Some(value.parse()?);
            }
            name => {
                resource = Some(
                    name.parse()
                        .map_err(|err: String| anyhow::anyhow!(err))?,
                );
            }
        }
    }

    Ok((resource, options))
}
