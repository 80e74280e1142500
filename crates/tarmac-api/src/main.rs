//! Tarmac API Server
//!
//! REST API for the plan catalog and router catalog.

use std::sync::Arc;

use tarmac_api::auth::{StaticTokenVerifier, TokenVerifier};
use tarmac_api::{build_router, AppState};
use tarmac_core::{ConfigSnapshot, PlanRouter, PlanService};
use tarmac_router::{RouterCatalogService, RouterRegistry};
use tarmac_storage::{LocalSqliteBackend, PlanBackend, SqlitePlanStore};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

/// Router backends compiled into the platform, always present without
/// operator configuration. Exactly one carries the default flag.
fn built_in_routers() -> Vec<PlanRouter> {
    vec![
        PlanRouter {
            name: "hipache".to_string(),
            router_type: "hipache".to_string(),
            is_default: true,
        },
        PlanRouter {
            name: "planb".to_string(),
            router_type: "planb".to_string(),
            is_default: false,
        },
    ]
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load process configuration
    let config_path =
        std::env::var("TARMAC_CONFIG").unwrap_or_else(|_| "tarmac.yaml".to_string());
    let config = match ConfigSnapshot::from_file(&config_path) {
        Ok(config) => {
            tracing::info!("Using configuration from: {}", config_path);
            config
        }
        Err(err) => {
            tracing::warn!("Cannot load {}: {}; starting with empty configuration", config_path, err);
            ConfigSnapshot::empty()
        }
    };
    let config = Arc::new(config);

    // Plan database path from configuration or environment
    let db_path = config
        .get_str("database:path")
        .map(str::to_string)
        .or_else(|| std::env::var("TARMAC_DB_PATH").ok())
        .unwrap_or_else(|| "tarmac.db".to_string());

    tracing::info!("Using plan database at: {}", db_path);

    let backend = LocalSqliteBackend::new(&db_path);
    if !backend.exists().unwrap_or(false) {
        tracing::warn!("Plan database does not exist, initializing");
        backend.initialize().expect("Failed to initialize plan database");
    }

    let plans = Arc::new(PlanService::new(
        SqlitePlanStore::new(backend),
        config.clone(),
    ));

    let registry = RouterRegistry::new(built_in_routers(), config.clone())
        .expect("Invalid built-in router set");
    let catalog = Arc::new(RouterCatalogService::new(Arc::new(registry)));

    let verifier: Arc<dyn TokenVerifier> = Arc::new(
        StaticTokenVerifier::from_config(&config).expect("Invalid auth token configuration"),
    );

    let state = AppState { plans, catalog };
    let app = build_router(state, verifier).layer(CorsLayer::permissive());

    // Listening port from configuration or environment
    let port = config
        .get_i64("listen:port")
        .map(|p| p as u16)
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(8080);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Tarmac API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
