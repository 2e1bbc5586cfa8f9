//! HTTP transport for the registry - maps the query and mutation surface
//! onto axum.
//!
//! ## Routes
//!
//! - `GET /search` — filtered/sampled read over the live snapshot.
//! - `POST /addClan` — append one validated record.
//! - `DELETE /deleteClan` — remove the first record with the given id.
//! - `GET /health` — readiness probe with the live snapshot size.
//!
//! Everything else is a 404. Mutation outcomes and rejections are plain
//! text; search results and health are JSON.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clan_registry::{ClanRegistry, RegistryConfig};
//!
//! let registry = Arc::new(ClanRegistry::new(store, RegistryConfig::default()));
//! registry.load().await?;
//!
//! // Get the router to compose with other axum routes
//! let app = clan_registry::router(registry.clone());
//!
//! // Or serve directly
//! clan_registry::serve(registry, "0.0.0.0:16098").await?;
//! ```

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::clan::{ClanRecord, ClanType};
use crate::error::RegistryError;
use crate::registry::{ClanRegistry, SearchCriteria};
use crate::store::ClanStore;

/// Build an axum `Router` serving the registry query and mutation surface.
pub fn router<S: ClanStore>(registry: Arc<ClanRegistry<S>>) -> Router {
    // Per-route fallbacks turn axum's default 405 on a method mismatch into
    // the surface's blanket 404.
    Router::new()
        .route("/search", get(search_handler).fallback(not_found_handler))
        .route("/addClan", post(add_clan_handler).fallback(not_found_handler))
        .route("/deleteClan", delete(delete_clan_handler).fallback(not_found_handler))
        .route("/health", get(health_handler).fallback(not_found_handler))
        .fallback(not_found_handler)
        .with_state(registry)
}

/// Serve the registry over HTTP at the given address (e.g.
/// `"0.0.0.0:16098"`).
pub async fn serve<S: ClanStore>(
    registry: Arc<ClanRegistry<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(registry);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// `GET /search` — filtered or sampled read over the live snapshot.
async fn search_handler<S: ClanStore>(
    State(registry): State<Arc<ClanRegistry<S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let criteria = match parse_search_params(&params, registry.config().max_result_ceiling) {
        Ok(criteria) => criteria,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    match registry.search(&criteria) {
        Ok(clans) => (StatusCode::OK, Json(clans)).into_response(),
        Err(err @ RegistryError::InvalidPattern(_)) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

/// `POST /addClan` — validate the payload and append the record.
async fn add_clan_handler<S: ClanStore>(
    State(registry): State<Arc<ClanRegistry<S>>>,
    body: String,
) -> Response {
    let payload: Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(err) => {
            return (StatusCode::BAD_REQUEST, format!("Malformed JSON body: {}", err))
                .into_response()
        }
    };

    let clan = match ClanRecord::from_payload(&payload) {
        Ok(clan) => clan,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    match registry.add(clan) {
        Ok(()) => (StatusCode::OK, "Clan added successfully").into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

/// `DELETE /deleteClan` — remove the first record matching the body's id.
async fn delete_clan_handler<S: ClanStore>(
    State(registry): State<Arc<ClanRegistry<S>>>,
    body: String,
) -> Response {
    let clan_id = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|payload| payload.get("clanId").and_then(Value::as_str).map(String::from));
    let Some(clan_id) = clan_id else {
        return (StatusCode::BAD_REQUEST, "Invalid or missing clanId.").into_response();
    };

    match registry.delete(&clan_id) {
        Ok(true) => (StatusCode::OK, "Clan deleted successfully").into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Clan not found.").into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

/// `GET /health` — returns `{ "ok": true, "clans": <count> }`.
async fn health_handler<S: ClanStore>(
    State(registry): State<Arc<ClanRegistry<S>>>,
) -> Response {
    match registry.len() {
        Ok(count) => Json(json!({ "ok": true, "clans": count })).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Assemble `SearchCriteria` from the raw query string.
///
/// The four numeric bounds are required; `searchName` and `type` are
/// optional and an empty string counts as absent for both.
fn parse_search_params(
    params: &HashMap<String, String>,
    max_result_ceiling: usize,
) -> Result<SearchCriteria, String> {
    const REQUIRED: [&str; 4] = ["minClanLevel", "minClanTrophy", "minMember", "maxResult"];
    if REQUIRED.iter().any(|name| !params.contains_key(*name)) {
        return Err("All query parameters are required".to_string());
    }

    let min_clan_level = parse_bound::<u32>(params, "minClanLevel")?;
    let min_clan_trophy = parse_bound::<u32>(params, "minClanTrophy")?;
    let min_member = parse_bound::<u32>(params, "minMember")?;
    let max_result = parse_bound::<usize>(params, "maxResult")?;
    if max_result > max_result_ceiling {
        return Err(format!("maxResult must not exceed {}", max_result_ceiling));
    }

    let clan_type = match params
        .get("type")
        .map(String::as_str)
        .filter(|value| !value.is_empty())
    {
        Some(value) => Some(value.parse::<ClanType>().map_err(|err| err.to_string())?),
        None => None,
    };

    let search_name = params
        .get("searchName")
        .cloned()
        .filter(|name| !name.is_empty());

    Ok(SearchCriteria {
        search_name,
        clan_type,
        min_clan_level,
        min_clan_trophy,
        min_member,
        max_result,
    })
}

fn parse_bound<T: FromStr>(params: &HashMap<String, String>, name: &str) -> Result<T, String> {
    params
        .get(name)
        .map(String::as_str)
        .unwrap_or_default()
        .parse::<T>()
        .map_err(|_| format!("Query parameter {} must be a non-negative integer", name))
}
