//! Servicio de geocodificación
//!
//! Convierte direcciones en coordenadas con la API de geocodificación de
//! Mapbox (v6 forward). El planificador de rutas lo usa cuando el cliente
//! envía direcciones en lugar de coordenadas.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::services::geo_math::Coordinate;
use crate::utils::errors::{AppError, AppResult};

/// Dirección resuelta
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub coordinate: Coordinate,
    pub formatted_address: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> AppResult<GeocodedAddress>;
}

#[derive(Debug, Deserialize)]
struct MapboxGeocodingResponse {
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    geometry: MapboxGeometry,
    properties: MapboxProperties,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    coordinates: Vec<f64>, // [longitude, latitude]
}

#[derive(Debug, Deserialize)]
struct MapboxProperties {
    full_address: Option<String>,
    name: Option<String>,
    place_name: Option<String>,
}

pub struct GeocodingService {
    mapbox_token: String,
    country: String,
    client: reqwest::Client,
}

impl GeocodingService {
    pub fn new(mapbox_token: String, country: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            mapbox_token,
            country,
            client,
        })
    }

    fn request_url(&self, address: &str) -> String {
        format!(
            "https://api.mapbox.com/search/geocode/v6/forward?q={}&access_token={}&country={}&limit=1",
            urlencoding::encode(address),
            self.mapbox_token,
            self.country
        )
    }
}

#[async_trait]
impl Geocoder for GeocodingService {
    async fn geocode(&self, address: &str) -> AppResult<GeocodedAddress> {
        log::info!("🗺️ Geocoding address: {}", address);

        let response = self
            .client
            .get(self.request_url(address))
            .header("User-Agent", "BikeShare/1.0")
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Geocoding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Geocoding failed with status {}: {}", status, error_text);
            return Err(AppError::ExternalApi(format!("Geocoding failed: {}", status)));
        }

        let body: MapboxGeocodingResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to parse geocoding response: {}", e)))?;

        parse_first_feature(body).ok_or_else(|| {
            log::warn!("⚠️ No coordinates found for address: {}", address);
            AppError::BadRequest(format!("No coordinates found for address '{}'", address))
        })
    }
}

fn parse_first_feature(body: MapboxGeocodingResponse) -> Option<GeocodedAddress> {
    let feature = body.features.into_iter().next()?;
    let (lng, lat) = match feature.geometry.coordinates.as_slice() {
        [lng, lat, ..] => (*lng, *lat),
        _ => return None,
    };
    let coordinate = Coordinate::checked(lat, lng).ok()?;
    let formatted_address = feature
        .properties
        .full_address
        .or(feature.properties.place_name)
        .or(feature.properties.name);

    Some(GeocodedAddress {
        coordinate,
        formatted_address,
    })
}
