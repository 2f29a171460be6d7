//! HTTP adapter over the session: controls come in as requests and become
//! `set_region_radius` / `set_region_center` calls, the map view goes out as
//! JSON.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use ingest::{Notice, SourceError};
use proximity::{Region, StaleLoad, km_to_meters, parse_radius_km};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::map_view::MapView;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/map", get(get_map))
        .route("/visibility", get(get_visibility))
        .route("/region/radius", put(put_radius))
        .route("/region/search", post(post_search))
        .route("/locations/reload", post(post_reload))
        .route("/notices", get(get_notices))
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

#[derive(Debug, Serialize)]
struct MapResponse {
    region: Region,
    map: MapView,
}

async fn get_map(State(state): State<AppState>) -> Json<MapResponse> {
    let session = state.session.lock();
    Json(MapResponse {
        region: *session.region(),
        map: session.renderer().clone(),
    })
}

async fn get_visibility(State(state): State<AppState>) -> Response {
    let visibility = state.session.lock().visibility();
    Json(visibility).into_response()
}

/// The radius control sends kilometers, either as the raw input text or as a
/// number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RadiusInput {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RadiusRequest {
    km: RadiusInput,
}

async fn put_radius(State(state): State<AppState>, Json(req): Json<RadiusRequest>) -> Response {
    let meters = match req.km {
        RadiusInput::Number(km) => km_to_meters(km),
        RadiusInput::Text(text) => match parse_radius_km(&text) {
            Ok(m) => m,
            Err(err) => return api_error(StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        },
    };

    let mut session = state.session.lock();
    let delta = session.set_region_radius(meters);
    Json(json!({ "region": session.region(), "delta": delta })).into_response()
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    address: String,
}

async fn post_search(State(state): State<AppState>, Json(req): Json<SearchRequest>) -> Response {
    let address = req.address.trim();
    if address.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "address is required").into_response();
    }

    match state.loader.geocoder().geocode(address).await {
        Ok(point) => {
            info!(%address, center = %point, "moving region");
            let mut session = state.session.lock();
            let delta = session.set_region_center(point);
            session.renderer_mut().focus(point, state.config.search_zoom);
            Json(json!({ "region": session.region(), "delta": delta })).into_response()
        }
        Err(err) => {
            let status = if err.is_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::BAD_GATEWAY
            };
            state.notices.lock().emit(Notice::from_geocode(&err));
            api_error(status, err.to_string()).into_response()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
    pub generation: u64,
    pub loaded: usize,
    pub skipped: usize,
    pub stale: bool,
}

#[derive(Debug)]
pub enum ReloadError {
    Source(SourceError),
    Stale(StaleLoad, ReloadReport),
}

/// Fetches the address list, geocodes it and commits the result, unless a
/// newer reload started in the meantime.
pub async fn reload(state: &AppState) -> Result<ReloadReport, ReloadError> {
    let generation = state.session.lock().begin_load();

    let outcome = match state.loader.load(state.source.as_ref()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            state
                .notices
                .lock()
                .emit(Notice::from_source(state.source.describe(), &err));
            return Err(ReloadError::Source(err));
        }
    };

    let mut report = ReloadReport {
        generation: generation.get(),
        loaded: outcome.records.len(),
        skipped: outcome.skipped(),
        stale: false,
    };

    let committed = state
        .session
        .lock()
        .commit_load(generation, outcome.records);
    match committed {
        Ok(_) => {
            state.notices.lock().extend(outcome.notices);
            Ok(report)
        }
        Err(stale) => {
            warn!(%stale, "reload superseded; results dropped");
            report.stale = true;
            Err(ReloadError::Stale(stale, report))
        }
    }
}

async fn post_reload(State(state): State<AppState>) -> Response {
    match reload(&state).await {
        Ok(report) => Json(report).into_response(),
        Err(ReloadError::Source(err)) => {
            api_error(StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
        Err(ReloadError::Stale(_, report)) => (StatusCode::CONFLICT, Json(report)).into_response(),
    }
}

async fn get_notices(State(state): State<AppState>) -> Response {
    let notices = state.notices.lock().drain();
    Json(notices).into_response()
}
