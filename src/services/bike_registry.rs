//! Registro de bicis
//!
//! Cada bici está anclada en exactamente una estación o en tránsito
//! (`current_station = None`, estado `rented`).

use std::collections::BTreeMap;

use crate::models::{Bike, BikeStatus};
use crate::services::change_set::Staged;
use crate::utils::errors::DomainError;

#[derive(Debug, Clone)]
pub struct BikeRegistry {
    bikes: BTreeMap<i64, Bike>,
    next_id: i64,
}

impl Default for BikeRegistry {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl BikeRegistry {
    pub fn from_records(records: Vec<Bike>) -> Self {
        let next_id = records.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let bikes = records.into_iter().map(|b| (b.id, b)).collect();
        Self { bikes, next_id }
    }

    pub fn get(&self, bike_id: i64) -> Result<&Bike, DomainError> {
        self.bikes.get(&bike_id).ok_or(DomainError::UnknownBike(bike_id))
    }

    pub fn list(&self) -> Vec<Bike> {
        self.bikes.values().cloned().collect()
    }

    pub fn list_at(&self, station_id: i64) -> Vec<Bike> {
        self.bikes
            .values()
            .filter(|b| b.is_docked_at(station_id))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bike> {
        self.bikes.values()
    }

    /// Bicis físicamente ancladas en la estación, sea cual sea su estado
    pub fn docked_count(&self, station_id: i64) -> usize {
        self.bikes.values().filter(|b| b.is_docked_at(station_id)).count()
    }

    /// Alta de una bici disponible en una estación. El conteo de la estación
    /// lo ajusta quien llama, dentro de la misma transacción.
    pub(crate) fn register(&mut self, station_id: i64) -> Staged<Bike> {
        let bike = Bike {
            id: self.next_id,
            current_station: Some(station_id),
            status: BikeStatus::Available,
            use_count: 0,
        };
        self.next_id += 1;
        self.bikes.insert(bike.id, bike.clone());
        Staged::created(bike)
    }

    /// Elegir la bici disponible de menor id anclada en la estación y
    /// marcarla como alquilada.
    pub(crate) fn assign_for_rental(&mut self, station_id: i64) -> Result<Staged<Bike>, DomainError> {
        let bike = self
            .bikes
            .values_mut()
            .find(|b| b.is_docked_at(station_id) && b.status == BikeStatus::Available)
            .ok_or(DomainError::NoBikeAtStation(station_id))?;

        let before = bike.clone();
        bike.status = BikeStatus::Rented;
        bike.current_station = None;
        bike.use_count += 1;
        Ok(Staged::updated(before, bike.clone()))
    }

    pub(crate) fn release_to_station(
        &mut self,
        bike_id: i64,
        station_id: i64,
    ) -> Result<Staged<Bike>, DomainError> {
        let bike = self
            .bikes
            .get_mut(&bike_id)
            .ok_or(DomainError::UnknownBike(bike_id))?;
        if bike.status != BikeStatus::Rented {
            return Err(DomainError::BikeNotRented(bike_id));
        }

        let before = bike.clone();
        bike.status = BikeStatus::Available;
        bike.current_station = Some(station_id);
        Ok(Staged::updated(before, bike.clone()))
    }

    /// Cambio administrativo de estado (mantenimiento, avería, disponible)
    pub fn set_status(&mut self, bike_id: i64, status: BikeStatus) -> Result<Staged<Bike>, DomainError> {
        if status == BikeStatus::Rented {
            return Err(DomainError::InvalidBikeStatus(status.as_str().to_string()));
        }
        let bike = self
            .bikes
            .get_mut(&bike_id)
            .ok_or(DomainError::UnknownBike(bike_id))?;
        if bike.status == BikeStatus::Rented {
            return Err(DomainError::BikeCurrentlyRented(bike_id));
        }

        let before = bike.clone();
        bike.status = status;
        Ok(Staged::updated(before, bike.clone()))
    }

    pub(crate) fn restore(&mut self, staged: &Staged<Bike>) {
        match &staged.before {
            Some(before) => {
                self.bikes.insert(before.id, before.clone());
            }
            None => {
                self.bikes.remove(&staged.after.id);
                if staged.after.id + 1 == self.next_id {
                    self.next_id = staged.after.id;
                }
            }
        }
    }
}
