//! Modelo de Rental

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado del alquiler - mapea al ENUM rental_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "rental_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Rented,
    Returned,
}

/// Rental principal - mapea a la tabla rentals
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Rental {
    pub id: i64,
    pub user_id: i64,
    pub bike_id: i64,
    pub start_station: i64,
    pub end_station: Option<i64>,
    pub rental_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
    /// Minutos, se fija al devolver
    pub duration: Option<i32>,
    /// Kilómetros, se fija al devolver
    pub distance: Option<f64>,
    pub status: RentalStatus,
}

impl Rental {
    pub fn is_open(&self) -> bool {
        self.status == RentalStatus::Rented
    }
}

/// Métricas de un viaje al devolver la bici.
/// `None` significa "calcular en el servidor".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReturnMetrics {
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<i32>,
}
