use serde::Deserialize;
use validator::Validate;

use crate::models::{NewStation, StationStatus};

// Request para registrar una estación
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStationRequest {
    #[validate(length(max = 120), custom = "crate::utils::validation::validate_not_blank")]
    pub name: String,
    #[validate(length(max = 255), custom = "crate::utils::validation::validate_not_blank")]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 1, max = 500))]
    pub capacity: i32,
}

impl From<CreateStationRequest> for NewStation {
    fn from(request: CreateStationRequest) -> Self {
        NewStation {
            name: request.name.trim().to_string(),
            address: request.address.trim().to_string(),
            latitude: request.latitude,
            longitude: request.longitude,
            capacity: request.capacity,
        }
    }
}

// Request para activar o desactivar una estación
#[derive(Debug, Deserialize)]
pub struct UpdateStationStatusRequest {
    pub status: StationStatus,
}

// Query para buscar la estación más cercana
#[derive(Debug, Deserialize, Validate)]
pub struct NearestStationQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    /// `rent` (por defecto) o `return`
    #[serde(default)]
    pub purpose: NearestPurpose,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NearestPurpose {
    #[default]
    Rent,
    Return,
}
