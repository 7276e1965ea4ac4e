use crate::adapters::http::build_client;
use crate::domain::ports::{GeocodedPlace, Geocoder};
use crate::utils::error::{MapError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Nominatim search client (`/search?q=...&format=json&limit=1`).
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: serde_json::Value,
    lon: serde_json::Value,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

/// Nominatim sends coordinates as strings; other services send numbers.
fn coordinate(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>> {
        let url = format!("{}/search", self.endpoint);
        tracing::debug!("Geocoding '{}' via {}", query, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let hits: Vec<SearchHit> = serde_json::from_str(&body)?;

        let Some(hit) = hits.into_iter().next() else {
            tracing::debug!("No geocoding match for '{}'", query);
            return Ok(None);
        };

        match (coordinate(&hit.lon), coordinate(&hit.lat)) {
            (Some(lon), Some(lat)) => {
                tracing::debug!("Geocoded '{}' to ({:.4}, {:.4})", query, lon, lat);
                Ok(Some(GeocodedPlace {
                    lon,
                    lat,
                    display_name: hit.display_name,
                }))
            }
            _ => Err(MapError::render_failure(format!(
                "geocoder returned malformed coordinates for '{}'",
                query
            ))),
        }
    }
}
