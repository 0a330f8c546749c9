//! Cálculos geográficos
//!
//! Distancia Haversine y estimación de duración por velocidad media.
//! Funciones puras, sin estado.

use serde::{Deserialize, Serialize};

use crate::utils::errors::DomainError;

/// Radio terrestre en kilómetros
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Velocidad media en bici (km/h)
pub const BIKING_SPEED_KMH: f64 = 15.0;

/// Velocidad media a pie (km/h)
pub const WALKING_SPEED_KMH: f64 = 4.0;

/// Coordenada en grados decimales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coordenada validada: lat ∈ [-90, 90], lng ∈ [-180, 180]
    pub fn checked(lat: f64, lng: f64) -> Result<Self, DomainError> {
        let coord = Self::new(lat, lng);
        coord.validate()?;
        Ok(coord)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(DomainError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// Distancia great-circle (Haversine) en kilómetros
pub fn distance_km(a: Coordinate, b: Coordinate) -> Result<f64, DomainError> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_km(a, b))
}

/// Variante sin validación para coordenadas ya verificadas (estaciones registradas)
pub(crate) fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // clamp: errores de redondeo pueden dejar h apenas por encima de 1
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Duración en minutos para recorrer `distance_km` a `speed_kmh`
pub fn duration_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return f64::INFINITY;
    }
    distance_km / speed_kmh * 60.0
}
