//! Estimador de rutas
//!
//! Compone `geo_math` y `StationDirectory` para estimar una ruta en tres
//! tramos: a pie hasta la estación de salida, en bici hasta la estación de
//! llegada y a pie hasta el destino. Solo lee el directorio.

use crate::models::{LegMode, RouteLeg, RouteResult};
use crate::services::geo_math::{self, Coordinate, BIKING_SPEED_KMH, WALKING_SPEED_KMH};
use crate::services::station_directory::StationDirectory;
use crate::utils::errors::DomainError;

/// Velocidades medias usadas para estimar duraciones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelSpeeds {
    pub walking_kmh: f64,
    pub biking_kmh: f64,
}

impl Default for TravelSpeeds {
    fn default() -> Self {
        Self {
            walking_kmh: WALKING_SPEED_KMH,
            biking_kmh: BIKING_SPEED_KMH,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteEstimator {
    speeds: TravelSpeeds,
}

impl RouteEstimator {
    pub fn new(speeds: TravelSpeeds) -> Self {
        Self { speeds }
    }

    pub fn plan_route(
        &self,
        directory: &StationDirectory,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, DomainError> {
        let start_station = directory.find_nearest_for_rent(origin)?.clone();
        let end_station = directory.find_nearest_for_return(destination)?.clone();

        let legs = vec![
            self.leg(LegMode::Walk, origin, start_station.coordinate())?,
            self.leg(LegMode::Bike, start_station.coordinate(), end_station.coordinate())?,
            self.leg(LegMode::Walk, end_station.coordinate(), destination)?,
        ];
        let total_minutes: f64 = legs.iter().map(|l| l.duration_minutes).sum();

        Ok(RouteResult {
            origin,
            destination,
            walking_to_start_km: legs[0].distance_km,
            bike_distance_km: legs[1].distance_km,
            walking_from_end_km: legs[2].distance_km,
            total_duration_minutes: total_minutes.round() as i64,
            start_station,
            end_station,
            legs,
        })
    }

    fn leg(&self, mode: LegMode, from: Coordinate, to: Coordinate) -> Result<RouteLeg, DomainError> {
        let speed = match mode {
            LegMode::Walk => self.speeds.walking_kmh,
            LegMode::Bike => self.speeds.biking_kmh,
        };
        let distance_km = geo_math::distance_km(from, to)?;
        Ok(RouteLeg {
            mode,
            from,
            to,
            distance_km,
            duration_minutes: geo_math::duration_minutes(distance_km, speed),
        })
    }
}
