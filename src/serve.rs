use anyhow::Context;
use axum::{
    extract::State,
    http::{Method, StatusCode},
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

mod address;
mod env;
mod logs;
mod types;

use env::APP_CONFIG;

pub use types::{ApiResponse, JsonBody};

use crate::{
    history::{HistoryStore, StoreHistoryRepository},
    lookup::LookupService,
    tron::TronGridClient,
};

#[derive(Clone)]
pub struct AppState {
    lookup: Arc<LookupService>,
    store: HistoryStore,
}

impl AppState {
    pub fn new(lookup: LookupService, store: HistoryStore) -> Self {
        Self {
            lookup: Arc::new(lookup),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/healthz", get(health))
        .route("/address/", post(address::address_info))
        .route("/logs/", get(logs::history))
        .route("/logs/:id", get(logs::history_entry))
        .with_state(state)
        .layer(cors)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", err);
    }
    info!("received signal to shutdown");
}

pub async fn start_server() -> anyhow::Result<()> {
    crate::log::init();

    let addr = SocketAddr::from(([0, 0, 0, 0], APP_CONFIG.port));

    let store = HistoryStore::connect(
        &APP_CONFIG.database_url,
        APP_CONFIG.max_connections,
        APP_CONFIG.debug,
    )
    .await
    .context("can't connect to database")?;
    store
        .init_schema()
        .await
        .context("failed to initialize database schema")?;

    let tron_client = TronGridClient::new(
        &APP_CONFIG.tron_nodes(),
        APP_CONFIG.tron_api_key.as_deref(),
        APP_CONFIG.tron_request_timeout(),
    )?;

    info!(network = %APP_CONFIG.tron_network, "using TRON network");

    let lookup = LookupService::new(
        Arc::new(StoreHistoryRepository::new(store.clone())),
        Arc::new(tron_client),
    );
    let app = router(AppState::new(lookup, store));

    info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");

    Ok(())
}

async fn health(State(state): State<AppState>) -> StatusCode {
    match state.store.ping().await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!("health check failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
