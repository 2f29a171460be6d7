mod api;
mod config;
mod map_view;

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use ingest::{Geocoder, LocationSource, Loader, NominatimGeocoder, NoticeBoard, source_for};
use parking_lot::Mutex;
use proximity::{Region, Session, km_to_meters};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::map_view::MapView;

/// Shared handler state. The session lock is never held across an `.await`.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    session: Arc<Mutex<Session<MapView>>>,
    notices: Arc<Mutex<NoticeBoard>>,
    loader: Arc<Loader>,
    source: Arc<dyn LocationSource>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        geocoder: Arc<dyn Geocoder>,
        source: Arc<dyn LocationSource>,
    ) -> Self {
        let region = Region::new(config.center, km_to_meters(config.radius_km));
        let view = MapView::new(config.center, config.initial_zoom);
        let loader = Loader::new(geocoder).with_concurrency(config.geocode_concurrency);
        Self {
            config: Arc::new(config),
            session: Arc::new(Mutex::new(Session::new(region, view))),
            notices: Arc::new(Mutex::new(NoticeBoard::new())),
            loader: Arc::new(loader),
            source,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let http = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(15))
        .build()?;

    let geocoder = Arc::new(NominatimGeocoder::with_client(
        config.geocoder_url.clone(),
        http.clone(),
    ));
    let source: Arc<dyn LocationSource> = Arc::from(source_for(&config.locations, http));
    info!(locations = %source.describe(), geocoder = %config.geocoder_url, "configured");

    let addr = config.addr;
    let load_on_start = config.load_on_start;
    let state = AppState::new(config, geocoder, source);

    if load_on_start {
        let state = state.clone();
        tokio::spawn(async move {
            match api::reload(&state).await {
                Ok(report) => info!(?report, "initial load finished"),
                Err(err) => error!(?err, "initial load failed"),
            }
        });
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS]);

    let app = api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("proximity server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
