use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bike_share::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use bike_share::database::DatabaseConnection;
use bike_share::repositories::{InventoryStore, MemoryStore, PgInventoryStore};
use bike_share::services::{BikeShareService, Geocoder, GeocodingService};
use bike_share::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("🚲 Bike Share - Station Inventory & Rentals");
    info!("================================================");
    info!("🌍 Environment: {}", config.environment);

    let store = build_store(&config).await?;
    let service = BikeShareService::load(store, config.travel_speeds)
        .await
        .context("Failed to load inventory")?;

    let geocoder = build_geocoder(&config)?;
    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Invalid HOST/PORT: {}", config.server_url()))?;

    let app = bike_share::create_app(AppState::new(service, config, geocoder));

    info!("🌐 Server listening on http://{}", addr);
    info!("🔍 Endpoints:");
    info!("   GET  /health");
    info!("   /api/stations  list, create*, get, status*, nearest, summary");
    info!("   /api/bikes     list, register*, get, status*");
    info!("   /api/rentals   create, return, history, current");
    info!("   /api/routes    plan");
    info!("   /api/repairs   report, mine, list*, get, advance*");
    info!("   /api/admin     audit*");
    info!("   (* = admin only)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Server error: {}", e);
            e
        })?;

    info!("👋 Server stopped");
    Ok(())
}

async fn build_store(config: &EnvironmentConfig) -> Result<Arc<dyn InventoryStore>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let connection = DatabaseConnection::connect(&db_config).await?;
            Ok(Arc::new(PgInventoryStore::new(connection.into_pool())))
        }
        StorageBackend::Memory => {
            let store = match &config.seed_file {
                Some(path) => MemoryStore::from_json_file(path).await?,
                None => {
                    warn!("⚠️ Memory backend without SEED_FILE: starting with an empty inventory");
                    MemoryStore::new()
                }
            };
            Ok(Arc::new(store))
        }
    }
}

fn build_geocoder(config: &EnvironmentConfig) -> Result<Option<Arc<dyn Geocoder>>> {
    match &config.mapbox_token {
        Some(token) => {
            let service = GeocodingService::new(token.clone(), config.geocoding_country.clone())?;
            info!("🗺️ Address lookup enabled (country: {})", config.geocoding_country);
            Ok(Some(Arc::new(service)))
        }
        None => {
            warn!("⚠️ MAPBOX_TOKEN not set: route planning accepts coordinates only");
            Ok(None)
        }
    }
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 SIGTERM received, shutting down...");
        },
    }
}
