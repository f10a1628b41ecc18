//! HTTP API over the vault and the live overlays.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/keys` | Every enumerated `country/state/city` key |
//! | `GET`  | `/api/countries` | Country slugs |
//! | `GET`  | `/api/countries/{country}/states` | State slugs beneath a country |
//! | `GET`  | `/api/guides/{country}` | Country rollup |
//! | `GET`  | `/api/guides/{country}/{state}` | State rollup |
//! | `GET`  | `/api/guides/{country}/{state}/{city}` | One document |
//! | `GET`  | `/api/live/{country}/{state}/{city}` | Air quality and weather for the document's coordinate |
//! | `GET`  | `/sitemap.xml` | Sitemap |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "not found: us/nevada" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! Live responses carry `Cache-Control: no-store`; every request re-runs
//! both overlays.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use workout_safety_core::aggregate::AggregateRollup;
use workout_safety_core::catalog::{all_keys, countries, states_of};
use workout_safety_core::document::Document;
use workout_safety_core::error::VaultError;
use workout_safety_core::geo::{validate_slug, GeoKey};
use workout_safety_core::live::Coordinate;
use workout_safety_core::vault::Vault;

use crate::config::{Config, SiteConfig};
use crate::fs_vault::FsVault;
use crate::get::get_document;
use crate::overlay::{LiveOverlays, LiveReport};
use crate::rollup::rollup_for;
use crate::sitemap::build_sitemap;

/// Shared state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    vault: Arc<dyn Vault>,
    overlays: Arc<LiveOverlays>,
    site: Arc<SiteConfig>,
}

impl AppState {
    pub fn new(vault: Arc<dyn Vault>, overlays: LiveOverlays, site: SiteConfig) -> Self {
        Self {
            vault,
            overlays: Arc::new(overlays),
            site: Arc::new(site),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let vault = Arc::new(FsVault::from_config(&config.vault));
        let overlays = LiveOverlays::from_config(&config.overlay, config.resolve_credentials())?;
        Ok(Self::new(vault, overlays, config.site.clone()))
    }

    /// Runs a vault query on the blocking pool; file reads are synchronous.
    async fn with_vault<T, F>(&self, query: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn Vault) -> T + Send + 'static,
        T: Send + 'static,
    {
        let vault = Arc::clone(&self.vault);
        tokio::task::spawn_blocking(move || query(vault.as_ref()))
            .await
            .map_err(|e| internal(format!("vault task failed: {}", e)))
    }
}

/// Builds the router with CORS open to all origins.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/keys", get(handle_keys))
        .route("/api/countries", get(handle_countries))
        .route("/api/countries/{country}/states", get(handle_states))
        .route("/api/guides/{country}", get(handle_country_guide))
        .route("/api/guides/{country}/{state}", get(handle_state_guide))
        .route("/api/guides/{country}/{state}/{city}", get(handle_city_guide))
        .route("/api/live/{country}/{state}/{city}", get(handle_live))
        .route("/sitemap.xml", get(handle_sitemap))
        .layer(cors)
        .with_state(state)
}

/// Starts the server on `[server].bind` and runs until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    if !state.overlays.air_quality.has_credentials() {
        info!(
            env = %config.overlay.api_key_env,
            "no provider API key set, live overlays will synthesize readings"
        );
    }

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, root = %config.vault.root.display(), "server listening");
    println!("Workout safety API listening on http://{}", bind_addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<VaultError> for AppError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::NotFound(_) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found",
                message: err.to_string(),
            },
            VaultError::InvalidKey { .. } => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "bad_request",
                message: err.to_string(),
            },
        }
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ Enumeration ============

#[derive(Serialize)]
struct KeysResponse {
    keys: Vec<String>,
}

async fn handle_keys(State(state): State<AppState>) -> Result<Json<KeysResponse>, AppError> {
    let keys: Vec<String> = state
        .with_vault(|vault| all_keys(vault).iter().map(|k| k.to_string()).collect())
        .await?;
    Ok(Json(KeysResponse { keys }))
}

#[derive(Serialize)]
struct CountriesResponse {
    countries: Vec<String>,
}

async fn handle_countries(
    State(state): State<AppState>,
) -> Result<Json<CountriesResponse>, AppError> {
    let slugs: Vec<String> = state
        .with_vault(|vault| countries(vault).into_iter().collect())
        .await?;
    Ok(Json(CountriesResponse { countries: slugs }))
}

#[derive(Serialize)]
struct StatesResponse {
    country: String,
    states: Vec<String>,
}

async fn handle_states(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<StatesResponse>, AppError> {
    validate_slug(&country)?;
    let scope = country.clone();
    let states: Vec<String> = state
        .with_vault(move |vault| states_of(vault, &scope).into_iter().collect())
        .await?;
    Ok(Json(StatesResponse { country, states }))
}

// ============ Guides ============

async fn handle_country_guide(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<AggregateRollup>, AppError> {
    let rollup = state
        .with_vault(move |vault| rollup_for(vault, &country, None))
        .await??;
    Ok(Json(rollup))
}

async fn handle_state_guide(
    State(state): State<AppState>,
    Path((country, region)): Path<(String, String)>,
) -> Result<Json<AggregateRollup>, AppError> {
    let rollup = state
        .with_vault(move |vault| rollup_for(vault, &country, Some(&region)))
        .await??;
    Ok(Json(rollup))
}

async fn load_document(
    state: &AppState,
    (country, region, city): (String, String, String),
) -> Result<Document, AppError> {
    let key = GeoKey::new(country, region, city)?;
    let doc = state
        .with_vault(move |vault| get_document(vault, &key))
        .await??;
    Ok(doc)
}

async fn handle_city_guide(
    State(state): State<AppState>,
    Path(parts): Path<(String, String, String)>,
) -> Result<Json<Document>, AppError> {
    Ok(Json(load_document(&state, parts).await?))
}

// ============ GET /api/live/... ============

async fn handle_live(
    State(state): State<AppState>,
    Path(parts): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let doc = load_document(&state, parts).await?;
    let coord = Coordinate::new(doc.frontmatter.lat, doc.frontmatter.lon);
    let report: LiveReport = state.overlays.fetch(coord).await;
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(report)))
}

// ============ GET /sitemap.xml ============

async fn handle_sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let site = Arc::clone(&state.site);
    let xml = state
        .with_vault(move |vault| build_sitemap(vault, &site, Utc::now()))
        .await?
        .map_err(|e| internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}
