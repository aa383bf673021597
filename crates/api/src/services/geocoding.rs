//! CEP geocoding against external providers.
//!
//! Brasil API is the primary provider; OpenCage is the fallback. Every
//! request is bounded by the configured timeout and any provider failure is
//! logged and swallowed — the caller only sees `Option<Coordenadas>`, and
//! `None` means both providers came up empty.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::config::GeocodingConfig;
use shared::validation::normalize_cep;

/// A resolved coordinate pair, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordenadas {
    pub latitude: f64,
    pub longitude: f64,
}

/// HTTP client for CEP resolution.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    http: Client,
    brasil_api_url: String,
    opencage_url: String,
    opencage_api_key: String,
}

impl GeocodingClient {
    /// Builds the client with the configured per-request timeout.
    pub fn new(config: &GeocodingConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            brasil_api_url: config.brasil_api_url.trim_end_matches('/').to_string(),
            opencage_url: config.opencage_url.trim_end_matches('/').to_string(),
            opencage_api_key: config.opencage_api_key.clone(),
        })
    }

    /// Resolves a CEP to coordinates, trying Brasil API then OpenCage.
    pub async fn get_coordinates(&self, cep: &str) -> Option<Coordenadas> {
        let cep_limpo = normalize_cep(cep);
        if cep_limpo.len() != 8 {
            return None;
        }

        if let Some(coords) = self.try_brasil_api(&cep_limpo).await {
            debug!(cep = %cep_limpo, "coordinates resolved via Brasil API");
            return Some(coords);
        }

        debug!(cep = %cep_limpo, "Brasil API had no coordinates, falling back to OpenCage");
        let coords = self.try_opencage(&cep_limpo).await;
        match coords {
            Some(_) => debug!(cep = %cep_limpo, "coordinates resolved via OpenCage"),
            None => warn!(cep = %cep_limpo, "both geocoding providers failed"),
        }
        coords
    }

    async fn try_brasil_api(&self, cep: &str) -> Option<Coordenadas> {
        let url = format!("{}/api/cep/v2/{}", self.brasil_api_url, cep);

        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(cep, error = %e, "Brasil API request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(cep, status = %response.status(), "Brasil API returned an error status");
            return None;
        }

        let body: BrasilApiResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(cep, error = %e, "Brasil API returned an unreadable body");
                return None;
            }
        };

        let coordinates = body.location?.coordinates?;
        Some(Coordenadas {
            latitude: coordinates.latitude?,
            longitude: coordinates.longitude?,
        })
    }

    async fn try_opencage(&self, cep: &str) -> Option<Coordenadas> {
        if self.opencage_api_key.is_empty() {
            debug!("OpenCage fallback skipped: no API key configured");
            return None;
        }

        let url = format!("{}/geocode/v1/json", self.opencage_url);
        let response = match self
            .http
            .get(&url)
            .query(&[
                ("q", format!("{}, Brasil", cep)),
                ("key", self.opencage_api_key.clone()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(cep, error = %e, "OpenCage request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(cep, status = %response.status(), "OpenCage returned an error status");
            return None;
        }

        let body: OpenCageResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(cep, error = %e, "OpenCage returned an unreadable body");
                return None;
            }
        };

        let geometry = body.results.into_iter().next()?.geometry?;
        Some(Coordenadas {
            latitude: geometry.lat,
            longitude: geometry.lng,
        })
    }
}

// Brasil API serves coordinates as strings on some CEPs and numbers on
// others, so the deserializer accepts both.
fn coord_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

#[derive(Debug, Deserialize)]
struct BrasilApiResponse {
    location: Option<BrasilApiLocation>,
}

#[derive(Debug, Deserialize)]
struct BrasilApiLocation {
    coordinates: Option<BrasilApiCoordinates>,
}

#[derive(Debug, Deserialize)]
struct BrasilApiCoordinates {
    #[serde(default, deserialize_with = "coord_from_any")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "coord_from_any")]
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: Option<OpenCageGeometry>,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}
