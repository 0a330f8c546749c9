//! Modelo de Station
//!
//! Mapea a la tabla `stations`. El campo `bike_count` solo se escribe a través
//! de `StationDirectory::adjust_bike_count`.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

use crate::services::geo_math::Coordinate;

/// Estado de la estación - mapea al ENUM station_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "station_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Active,
    Inactive,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Active => "active",
            StationStatus::Inactive => "inactive",
        }
    }
}

/// Station principal - mapea exactamente a la tabla stations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: i32,
    pub bike_count: i32,
    pub status: StationStatus,
}

impl Station {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn is_active(&self) -> bool {
        self.status == StationStatus::Active
    }

    pub fn has_bikes(&self) -> bool {
        self.bike_count > 0
    }

    pub fn has_free_dock(&self) -> bool {
        self.bike_count < self.capacity
    }
}

/// Datos para registrar una estación nueva
#[derive(Debug, Clone)]
pub struct NewStation {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: i32,
}

/// Conteos agregados de estaciones
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StationStatusSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub available: usize,
}
