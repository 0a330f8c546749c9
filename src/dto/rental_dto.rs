use serde::Deserialize;
use validator::Validate;

use crate::models::ReturnMetrics;

// Request para alquilar en una estación
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRentalRequest {
    #[validate(range(min = 1))]
    pub station_id: i64,
}

// Request para devolver una bici
#[derive(Debug, Deserialize, Validate)]
pub struct ReturnRentalRequest {
    #[validate(range(min = 1))]
    pub end_station_id: i64,
    #[validate(range(min = 0.0))]
    pub distance_km: Option<f64>,
    #[validate(range(min = 0))]
    pub duration_minutes: Option<i32>,
}

impl ReturnRentalRequest {
    pub fn metrics(&self) -> ReturnMetrics {
        ReturnMetrics {
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
        }
    }
}
