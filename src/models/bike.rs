//! Modelo de Bike

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado de la bici - mapea al ENUM bike_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "bike_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BikeStatus {
    Available,
    Rented,
    Maintenance,
    Broken,
}

impl BikeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BikeStatus::Available => "available",
            BikeStatus::Rented => "rented",
            BikeStatus::Maintenance => "maintenance",
            BikeStatus::Broken => "broken",
        }
    }
}

/// Bike principal - mapea a la tabla bikes.
/// `current_station = None` significa "en tránsito" (alquilada).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Bike {
    pub id: i64,
    pub current_station: Option<i64>,
    pub status: BikeStatus,
    pub use_count: i32,
}

impl Bike {
    pub fn is_docked_at(&self, station_id: i64) -> bool {
        self.current_station == Some(station_id)
    }

    pub fn is_rentable(&self) -> bool {
        self.status == BikeStatus::Available && self.current_station.is_some()
    }
}
