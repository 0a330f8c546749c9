use serde::Deserialize;
use validator::Validate;

use crate::models::BikeStatus;

// Request para dar de alta una bici anclada en una estación
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBikeRequest {
    #[validate(range(min = 1))]
    pub station_id: i64,
}

// Request para cambiar el estado de mantenimiento de una bici
#[derive(Debug, Deserialize)]
pub struct UpdateBikeStatusRequest {
    pub status: BikeStatus,
}

// Filtro opcional del listado
#[derive(Debug, Default, Deserialize)]
pub struct ListBikesQuery {
    pub station_id: Option<i64>,
}
