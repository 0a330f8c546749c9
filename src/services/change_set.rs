//! Conjunto de cambios de una transición
//!
//! Cada registro modificado queda con su imagen anterior y posterior. El
//! almacén persiste las imágenes posteriores; si el commit falla, el motor
//! restaura las anteriores.

use serde::Serialize;

use crate::models::{Bike, Rental, Repair, Station};

/// Imagen anterior (None = registro nuevo) y posterior de un registro
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Staged<T> {
    pub before: Option<T>,
    pub after: T,
}

impl<T> Staged<T> {
    pub fn created(after: T) -> Self {
        Self { before: None, after }
    }

    pub fn updated(before: T, after: T) -> Self {
        Self {
            before: Some(before),
            after,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    pub stations: Vec<Staged<Station>>,
    pub bikes: Vec<Staged<Bike>>,
    pub rentals: Vec<Staged<Rental>>,
    pub repairs: Vec<Staged<Repair>>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
            && self.bikes.is_empty()
            && self.rentals.is_empty()
            && self.repairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stations.len() + self.bikes.len() + self.rentals.len() + self.repairs.len()
    }

    pub fn with_station(mut self, staged: Staged<Station>) -> Self {
        self.stations.push(staged);
        self
    }

    pub fn with_bike(mut self, staged: Staged<Bike>) -> Self {
        self.bikes.push(staged);
        self
    }

    pub fn with_rental(mut self, staged: Staged<Rental>) -> Self {
        self.rentals.push(staged);
        self
    }

    pub fn with_repair(mut self, staged: Staged<Repair>) -> Self {
        self.repairs.push(staged);
        self
    }
}

/// Resultado de una transición: el registro principal y todo lo que tocó
#[derive(Debug, Clone)]
pub struct Transition<T> {
    pub record: T,
    pub changes: ChangeSet,
}

impl<T> Transition<T> {
    pub fn new(record: T, changes: ChangeSet) -> Self {
        Self { record, changes }
    }
}
