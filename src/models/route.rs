//! Resultado de planificación de ruta (efímero, no se persiste)

use serde::Serialize;

use crate::models::station::Station;
use crate::services::geo_math::Coordinate;

/// Un tramo de la ruta
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteLeg {
    pub mode: LegMode,
    pub from: Coordinate,
    pub to: Coordinate,
    pub distance_km: f64,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LegMode {
    Walk,
    Bike,
}

/// RouteQuery resuelta
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteResult {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub start_station: Station,
    pub end_station: Station,
    pub walking_to_start_km: f64,
    pub bike_distance_km: f64,
    pub walking_from_end_km: f64,
    pub total_duration_minutes: i64,
    pub legs: Vec<RouteLeg>,
}
