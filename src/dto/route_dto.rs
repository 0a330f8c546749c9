use serde::Deserialize;

use crate::dto::common_dto::LocationInput;

// Request para planificar una ruta; cada extremo es coordenada o dirección
#[derive(Debug, Deserialize)]
pub struct PlanRouteRequest {
    pub origin: LocationInput,
    pub destination: LocationInput,
}
