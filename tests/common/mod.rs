#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use bike_share::config::{EnvironmentConfig, StorageBackend};
use bike_share::models::{Bike, BikeStatus, Station, StationStatus};
use bike_share::repositories::MemoryStore;
use bike_share::services::{
    BikeShareService, Coordinate, GeocodedAddress, Geocoder, InventorySnapshot, TravelSpeeds,
};
use bike_share::state::AppState;
use bike_share::utils::errors::{AppError, AppResult};
use bike_share::utils::jwt::{generate_token, JwtConfig, UserRole};

pub const ADMIN_ID: i64 = 1;
pub const RIDER_ID: i64 = 7;
pub const OTHER_RIDER_ID: i64 = 8;

pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: "integration-secret".to_string(),
        jwt_expiration: 3600,
        cors_origins: vec!["*".to_string()],
        log_level: "warn".to_string(),
        storage_backend: StorageBackend::Memory,
        seed_file: None,
        mapbox_token: None,
        geocoding_country: "kr".to_string(),
        travel_speeds: TravelSpeeds::default(),
    }
}

fn station(id: i64, name: &str, lat: f64, lng: f64, capacity: i32, bike_count: i32, status: StationStatus) -> Station {
    Station {
        id,
        name: name.to_string(),
        address: format!("{} Plaza", name),
        latitude: lat,
        longitude: lng,
        capacity,
        bike_count,
        status,
    }
}

/// Tres estaciones en el centro de Seúl: 1 con dos bicis, 2 vacía, 3 inactiva
pub fn seed() -> InventorySnapshot {
    InventorySnapshot {
        stations: vec![
            station(1, "City Hall", 37.5665, 126.9780, 10, 2, StationStatus::Active),
            station(2, "Gwanghwamun", 37.5759, 126.9769, 5, 0, StationStatus::Active),
            station(3, "Euljiro", 37.5660, 126.9910, 8, 0, StationStatus::Inactive),
        ],
        bikes: (1..=2)
            .map(|id| Bike {
                id,
                current_station: Some(1),
                status: BikeStatus::Available,
                use_count: 0,
            })
            .collect(),
        ..Default::default()
    }
}

/// Geocodificador de prueba con direcciones fijas
pub struct FixedGeocoder {
    pub addresses: HashMap<String, Coordinate>,
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<GeocodedAddress> {
        self.addresses
            .get(address)
            .map(|coordinate| GeocodedAddress {
                coordinate: *coordinate,
                formatted_address: Some(address.to_string()),
            })
            .ok_or_else(|| AppError::BadRequest(format!("No coordinates found for address '{}'", address)))
    }
}

pub struct TestApp {
    pub router: Router,
    pub service: BikeShareService,
    pub store: Arc<MemoryStore>,
    jwt: JwtConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_geocoder(None).await
    }

    pub async fn with_geocoder(geocoder: Option<Arc<dyn Geocoder>>) -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::with_seed(seed()));
        let service = BikeShareService::load(store.clone(), config.travel_speeds)
            .await
            .unwrap();
        let state = AppState::new(service.clone(), config, geocoder);
        let jwt = state.jwt.clone();

        Self {
            router: bike_share::create_app(state),
            service,
            store,
            jwt,
        }
    }

    pub fn token(&self, user_id: i64, role: UserRole) -> String {
        generate_token(user_id, role, &self.jwt).unwrap()
    }

    pub fn rider(&self) -> String {
        self.token(RIDER_ID, UserRole::User)
    }

    pub fn admin(&self) -> String {
        self.token(ADMIN_ID, UserRole::Admin)
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }
}
