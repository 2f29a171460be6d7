use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use foundation::GeoPoint;
use ingest::{DEFAULT_GEOCODE_CONCURRENCY, DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};

/// Server settings, read from `PROXIMITY_*` environment variables.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Path or http(s) URL of the address list.
    pub locations: String,
    pub geocoder_url: String,
    pub user_agent: String,
    pub center: GeoPoint,
    pub radius_km: f64,
    pub initial_zoom: u8,
    pub search_zoom: u8,
    pub geocode_concurrency: usize,
    pub load_on_start: bool,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let addr: SocketAddr = string("PROXIMITY_ADDR", "127.0.0.1:9200")
            .parse()
            .context("invalid PROXIMITY_ADDR")?;

        // Centered on the middle of the Netherlands.
        let center = GeoPoint::new(
            parsed(&lookup, "PROXIMITY_CENTER_LAT", 52.0907),
            parsed(&lookup, "PROXIMITY_CENTER_LON", 5.1214),
        )
        .context("invalid PROXIMITY_CENTER_LAT/PROXIMITY_CENTER_LON")?;

        Ok(Self {
            addr,
            locations: string("PROXIMITY_LOCATIONS", "locations.json"),
            geocoder_url: string("PROXIMITY_GEOCODER_URL", DEFAULT_NOMINATIM_URL),
            user_agent: string("PROXIMITY_USER_AGENT", DEFAULT_USER_AGENT),
            center,
            radius_km: parsed(&lookup, "PROXIMITY_RADIUS_KM", 5.0),
            initial_zoom: parsed(&lookup, "PROXIMITY_INITIAL_ZOOM", 8),
            search_zoom: parsed(&lookup, "PROXIMITY_SEARCH_ZOOM", 11),
            geocode_concurrency: parsed(
                &lookup,
                "PROXIMITY_GEOCODE_CONCURRENCY",
                DEFAULT_GEOCODE_CONCURRENCY,
            ),
            load_on_start: parsed(&lookup, "PROXIMITY_LOAD_ON_START", true),
        })
    }
}

/// Unset or unparsable values fall back to `default`.
fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
