//! Directorio de estaciones
//!
//! Guarda los registros de estaciones y responde consultas de estación más
//! cercana y conteos agregados. `adjust_bike_count` es el único punto que
//! escribe `bike_count`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{NewStation, Station, StationStatus, StationStatusSummary};
use crate::services::change_set::Staged;
use crate::services::geo_math::{haversine_km, Coordinate};
use crate::utils::errors::DomainError;

#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: BTreeMap<i64, Station>,
    next_id: i64,
}

impl Default for StationDirectory {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl StationDirectory {
    pub fn from_records(records: Vec<Station>) -> Self {
        let next_id = records.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let stations = records.into_iter().map(|s| (s.id, s)).collect();
        Self { stations, next_id }
    }

    pub fn get(&self, station_id: i64) -> Result<&Station, DomainError> {
        self.stations
            .get(&station_id)
            .ok_or(DomainError::UnknownStation(station_id))
    }

    pub fn list(&self) -> Vec<Station> {
        self.stations.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Registrar una estación activa y vacía
    pub fn register(&mut self, new_station: NewStation) -> Result<Staged<Station>, DomainError> {
        Coordinate::checked(new_station.latitude, new_station.longitude)?;
        if new_station.capacity <= 0 {
            return Err(DomainError::InvalidCapacity(new_station.capacity));
        }
        let id = self.next_id;

        let station = Station {
            id,
            name: new_station.name,
            address: new_station.address,
            latitude: new_station.latitude,
            longitude: new_station.longitude,
            capacity: new_station.capacity,
            bike_count: 0,
            status: StationStatus::Active,
        };
        self.next_id += 1;
        self.stations.insert(id, station.clone());
        Ok(Staged::created(station))
    }

    pub fn set_status(
        &mut self,
        station_id: i64,
        status: StationStatus,
    ) -> Result<Staged<Station>, DomainError> {
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or(DomainError::UnknownStation(station_id))?;
        let before = station.clone();
        station.status = status;
        Ok(Staged::updated(before, station.clone()))
    }

    /// Estación activa con bicis más cercana. Empates: menor id.
    pub fn find_nearest_for_rent(&self, coord: Coordinate) -> Result<&Station, DomainError> {
        coord.validate()?;
        self.nearest(coord, |s| s.is_active() && s.has_bikes())
            .ok_or(DomainError::NoAvailableStation)
    }

    /// Estación activa con al menos un anclaje libre más cercana. Empates: menor id.
    pub fn find_nearest_for_return(&self, coord: Coordinate) -> Result<&Station, DomainError> {
        coord.validate()?;
        self.nearest(coord, |s| s.is_active() && s.has_free_dock())
            .ok_or(DomainError::NoActiveStation)
    }

    fn nearest<F>(&self, coord: Coordinate, eligible: F) -> Option<&Station>
    where
        F: Fn(&Station) -> bool,
    {
        let mut best: Option<(&Station, f64)> = None;
        // BTreeMap itera por id ascendente: con `<` estricto gana el menor id
        for station in self.stations.values().filter(|s| eligible(s)) {
            let d = haversine_km(coord, station.coordinate());
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((station, d)),
            }
        }
        best.map(|(station, d)| {
            debug!("📍 Nearest station {} at {:.3} km", station.id, d);
            station
        })
    }

    /// `bike_count += delta`, fallando si sale de [0, capacity]
    pub(crate) fn adjust_bike_count(
        &mut self,
        station_id: i64,
        delta: i32,
    ) -> Result<Staged<Station>, DomainError> {
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or(DomainError::UnknownStation(station_id))?;

        let attempted = i64::from(station.bike_count) + i64::from(delta);
        if attempted < 0 || attempted > i64::from(station.capacity) {
            return Err(DomainError::CapacityViolation {
                station_id,
                attempted,
                capacity: station.capacity,
            });
        }

        let before = station.clone();
        station.bike_count = attempted as i32;
        Ok(Staged::updated(before, station.clone()))
    }

    pub fn status_summary(&self) -> StationStatusSummary {
        self.stations
            .values()
            .fold(StationStatusSummary::default(), |mut summary, s| {
                summary.total += 1;
                if s.is_active() {
                    summary.active += 1;
                    if s.has_bikes() {
                        summary.available += 1;
                    }
                } else {
                    summary.inactive += 1;
                }
                summary
            })
    }

    /// Deshacer un cambio preparado
    pub(crate) fn restore(&mut self, staged: &Staged<Station>) {
        match &staged.before {
            Some(before) => {
                self.stations.insert(before.id, before.clone());
            }
            None => {
                self.stations.remove(&staged.after.id);
                if staged.after.id + 1 == self.next_id {
                    self.next_id = staged.after.id;
                }
            }
        }
    }
}
