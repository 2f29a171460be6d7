//! Address → coordinate lookup.
//!
//! `Geocoder` is the seam; `NominatimGeocoder` talks to an OpenStreetMap
//! Nominatim instance and `MemoryGeocoder` answers from a table (tests and
//! offline runs). One attempt per lookup, no retries.

use std::collections::HashMap;
use std::time::Duration;

use foundation::GeoPoint;
use serde::Deserialize;

use crate::BoxFuture;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("proximity-map/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("address not found: {address:?}")]
    NotFound { address: String },
    #[error("geocoding {address:?} failed: {message}")]
    Network {
        address: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GeocodeError {
    pub fn not_found(address: impl Into<String>) -> Self {
        Self::NotFound {
            address: address.into(),
        }
    }

    pub fn network(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            address: address.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn network_with_source(
        address: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            address: address.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Self::NotFound { address } | Self::Network { address, .. } => address,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Resolves free-text addresses to points.
///
/// Implementations must be `Send + Sync` so lookups can run concurrently.
/// Methods return boxed futures for dyn-compatibility.
pub trait Geocoder: Send + Sync {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<GeoPoint, GeocodeError>>;
}

/// Nominatim `/search` client.
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<GeoPoint, GeocodeError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.search_url())
                .query(&[("format", "json"), ("limit", "1"), ("q", address)])
                .send()
                .await
                .map_err(|e| GeocodeError::network_with_source(address, "request failed", e))?;

            if !resp.status().is_success() {
                return Err(GeocodeError::network(
                    address,
                    format!("HTTP error: {}", resp.status()),
                ));
            }

            let places: Vec<NominatimPlace> = resp.json().await.map_err(|e| {
                GeocodeError::network_with_source(address, "undecodable response", e)
            })?;
            first_place_point(address, &places)
        })
    }
}

fn first_place_point(address: &str, places: &[NominatimPlace]) -> Result<GeoPoint, GeocodeError> {
    let Some(place) = places.first() else {
        return Err(GeocodeError::not_found(address));
    };
    let lat: f64 = place
        .lat
        .trim()
        .parse()
        .map_err(|_| GeocodeError::network(address, format!("bad latitude {:?}", place.lat)))?;
    let lon: f64 = place
        .lon
        .trim()
        .parse()
        .map_err(|_| GeocodeError::network(address, format!("bad longitude {:?}", place.lon)))?;
    GeoPoint::new(lat, lon)
        .map_err(|e| GeocodeError::network_with_source(address, "coordinates out of range", e))
}

/// Table-backed geocoder. Lookups ignore case and surrounding whitespace.
#[derive(Debug, Default, Clone)]
pub struct MemoryGeocoder {
    known: HashMap<String, GeoPoint>,
    failing: HashMap<String, String>,
    delays: HashMap<String, Duration>,
}

impl MemoryGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, point: GeoPoint) -> Self {
        self.known.insert(normalize(address), point);
        self
    }

    /// Lookups of `address` fail with a network error.
    pub fn with_failure(mut self, address: &str, message: impl Into<String>) -> Self {
        self.failing.insert(normalize(address), message.into());
        self
    }

    /// Lookups of `address` complete after `delay`.
    pub fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(address), delay);
        self
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_lowercase()
}

impl Geocoder for MemoryGeocoder {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<GeoPoint, GeocodeError>> {
        let key = normalize(address);
        Box::pin(async move {
            if let Some(delay) = self.delays.get(&key) {
                tokio::time::sleep(*delay).await;
            }
            if let Some(message) = self.failing.get(&key) {
                return Err(GeocodeError::network(address, message.clone()));
            }
            self.known
                .get(&key)
                .copied()
                .ok_or_else(|| GeocodeError::not_found(address))
        })
    }
}
