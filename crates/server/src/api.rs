use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use portfolio_tracker_core::models::{
    analytics::{Dashboard, EnrichedHolding, PortfolioSummary, SectorSummary},
    price::CacheStats,
};
use serde_json::{json, Value};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{ApiError, ApiResult, PanicHandler},
    main_lib::AppState,
};

const INVALID_SYMBOLS: &str = "Invalid symbols array";

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_holdings(State(state): State<Arc<AppState>>) -> Json<Vec<EnrichedHolding>> {
    Json(state.tracker.enriched_holdings().await)
}

async fn get_portfolio_summary(State(state): State<Arc<AppState>>) -> Json<PortfolioSummary> {
    Json(state.tracker.portfolio_summary().await)
}

async fn get_sector_summaries(State(state): State<Arc<AppState>>) -> Json<Vec<SectorSummary>> {
    Json(state.tracker.sector_summaries().await)
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<Dashboard> {
    Json(state.tracker.dashboard().await)
}

/// `{"symbols": [string, ...]}`, or `None` for anything else.
fn parse_symbols(body: &[u8]) -> Option<Vec<String>> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("symbols")?
        .as_array()?
        .iter()
        .map(|s| s.as_str().map(str::to_string))
        .collect()
}

async fn refresh_prices(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let Some(symbols) = parse_symbols(&body) else {
        warn!("Rejected refresh request: {INVALID_SYMBOLS}");
        return Err(ApiError::BadRequest(INVALID_SYMBOLS.into()));
    };

    let outcome = state.tracker.refresh_prices(&symbols).await;
    Ok(Json(json!({
        "success": true,
        "message": format!("Refreshed {} symbols", outcome.symbols.len()),
        "data": outcome.quotes,
    })))
}

async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.tracker.cache_stats())
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.tracker.clear_cache();
    Json(json!({ "success": true, "message": "Cache cleared" }))
}

async fn reload_holdings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let count = state
        .tracker
        .reload_holdings()
        .map_err(|e| ApiError::internal(e, state.debug))?;
    info!("Reloaded {count} holdings");
    Ok(Json(json!({
        "success": true,
        "message": format!("Reloaded {count} holdings"),
    })))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new()
        .route("/holdings", get(get_holdings))
        .route("/portfolio-summary", get(get_portfolio_summary))
        .route("/sector-summaries", get(get_sector_summaries))
        .route("/dashboard", get(get_dashboard))
        .route("/refresh-prices", post(refresh_prices))
        .route("/cache-stats", get(cache_stats))
        .route("/clear-cache", post(clear_cache))
        .route("/reload-holdings", post(reload_holdings));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(PanicHandler::new(config.debug)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}
