//! Inventario completo en memoria
//!
//! Agrupa directorio de estaciones, registro de bicis, libro de alquileres y
//! flujo de reparaciones. Toda mutación devuelve una `Transition` con su
//! `ChangeSet`, que `rollback` sabe deshacer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::models::*;
use crate::services::bike_registry::BikeRegistry;
use crate::services::change_set::{ChangeSet, Transition};
use crate::services::geo_math::Coordinate;
use crate::services::rental_ledger::RentalLedger;
use crate::services::repair_workflow::RepairWorkflow;
use crate::services::route_estimator::RouteEstimator;
use crate::services::station_directory::StationDirectory;
use crate::utils::errors::DomainError;

/// Volcado completo del estado, tal como lo carga o guarda un almacén
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub bikes: Vec<Bike>,
    #[serde(default)]
    pub rentals: Vec<Rental>,
    #[serde(default)]
    pub repairs: Vec<Repair>,
}

/// Estación cuyo `bike_count` no coincide con las bicis ancladas
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct InventoryDiscrepancy {
    pub station_id: i64,
    pub bike_count: i32,
    pub docked_bikes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    stations: StationDirectory,
    bikes: BikeRegistry,
    rentals: RentalLedger,
    repairs: RepairWorkflow,
}

impl Inventory {
    pub fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        let inventory = Self {
            stations: StationDirectory::from_records(snapshot.stations),
            bikes: BikeRegistry::from_records(snapshot.bikes),
            rentals: RentalLedger::from_records(snapshot.rentals),
            repairs: RepairWorkflow::from_records(snapshot.repairs),
        };
        for d in inventory.audit() {
            warn!(
                target: "integrity",
                station_id = d.station_id,
                "⚠️ Loaded station count {} but {} bikes are docked",
                d.bike_count,
                d.docked_bikes
            );
        }
        inventory
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            stations: self.stations.list(),
            bikes: self.bikes.list(),
            rentals: self.rentals.iter().cloned().collect(),
            repairs: self.repairs.iter().cloned().collect(),
        }
    }

    pub fn stations(&self) -> &StationDirectory {
        &self.stations
    }

    pub fn bikes(&self) -> &BikeRegistry {
        &self.bikes
    }

    pub fn rentals(&self) -> &RentalLedger {
        &self.rentals
    }

    pub fn repairs(&self) -> &RepairWorkflow {
        &self.repairs
    }

    // ---- Alquileres ----

    pub fn create_rental(
        &mut self,
        user_id: i64,
        station_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Transition<Rental>, DomainError> {
        self.rentals
            .create_rental(&mut self.stations, &mut self.bikes, user_id, station_id, now)
    }

    pub fn return_rental(
        &mut self,
        rental_id: i64,
        end_station_id: i64,
        metrics: ReturnMetrics,
        now: DateTime<Utc>,
    ) -> Result<Transition<Rental>, DomainError> {
        self.rentals.return_rental(
            &mut self.stations,
            &mut self.bikes,
            rental_id,
            end_station_id,
            metrics,
            now,
        )
    }

    // ---- Estaciones ----

    pub fn find_nearest_station(
        &self,
        coord: Coordinate,
        for_return: bool,
    ) -> Result<&Station, DomainError> {
        if for_return {
            self.stations.find_nearest_for_return(coord)
        } else {
            self.stations.find_nearest_for_rent(coord)
        }
    }

    pub fn register_station(&mut self, new_station: NewStation) -> Result<Transition<Station>, DomainError> {
        let staged = self.stations.register(new_station)?;
        Ok(Transition::new(
            staged.after.clone(),
            ChangeSet::default().with_station(staged),
        ))
    }

    pub fn set_station_status(
        &mut self,
        station_id: i64,
        status: StationStatus,
    ) -> Result<Transition<Station>, DomainError> {
        let staged = self.stations.set_status(station_id, status)?;
        Ok(Transition::new(
            staged.after.clone(),
            ChangeSet::default().with_station(staged),
        ))
    }

    // ---- Bicis ----

    /// Dar de alta una bici anclada en `station_id`; incrementa el conteo
    pub fn register_bike(&mut self, station_id: i64) -> Result<Transition<Bike>, DomainError> {
        let station = self.stations.get(station_id)?;
        if !station.has_free_dock() {
            return Err(DomainError::StationFull(station_id));
        }

        let bike_stage = self.bikes.register(station_id);
        let station_stage = match self.stations.adjust_bike_count(station_id, 1) {
            Ok(staged) => staged,
            Err(e) => {
                self.bikes.restore(&bike_stage);
                return Err(e);
            }
        };

        Ok(Transition::new(
            bike_stage.after.clone(),
            ChangeSet::default()
                .with_bike(bike_stage)
                .with_station(station_stage),
        ))
    }

    pub fn set_bike_status(
        &mut self,
        bike_id: i64,
        status: BikeStatus,
    ) -> Result<Transition<Bike>, DomainError> {
        let staged = self.bikes.set_status(bike_id, status)?;
        Ok(Transition::new(
            staged.after.clone(),
            ChangeSet::default().with_bike(staged),
        ))
    }

    // ---- Reparaciones ----

    pub fn report_repair(
        &mut self,
        new_repair: NewRepair,
        now: DateTime<Utc>,
    ) -> Result<Transition<Repair>, DomainError> {
        match new_repair.target_type {
            RepairTarget::Bike => {
                self.bikes.get(new_repair.target_id)?;
            }
            RepairTarget::Station => {
                self.stations.get(new_repair.target_id)?;
            }
        }
        let staged = self.repairs.report(new_repair, now);
        Ok(Transition::new(
            staged.after.clone(),
            ChangeSet::default().with_repair(staged),
        ))
    }

    pub fn advance_repair(
        &mut self,
        repair_id: i64,
        action: RepairAction,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Transition<Repair>, DomainError> {
        let staged = self.repairs.advance(repair_id, action, note, now)?;
        Ok(Transition::new(
            staged.after.clone(),
            ChangeSet::default().with_repair(staged),
        ))
    }

    // ---- Rutas ----

    pub fn plan_route(
        &self,
        estimator: &RouteEstimator,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, DomainError> {
        estimator.plan_route(&self.stations, origin, destination)
    }

    // ---- Integridad ----

    /// Estaciones cuyo conteo no coincide con las bicis ancladas
    pub fn audit(&self) -> Vec<InventoryDiscrepancy> {
        self.stations
            .iter()
            .filter_map(|s| {
                let docked = self.bikes.docked_count(s.id);
                (docked != s.bike_count as usize).then_some(InventoryDiscrepancy {
                    station_id: s.id,
                    bike_count: s.bike_count,
                    docked_bikes: docked,
                })
            })
            .collect()
    }

    /// Restaurar las imágenes anteriores de un `ChangeSet` ya aplicado
    pub fn rollback(&mut self, changes: &ChangeSet) {
        for staged in changes.rentals.iter().rev() {
            self.rentals.restore(staged);
        }
        for staged in changes.repairs.iter().rev() {
            self.repairs.restore(staged);
        }
        for staged in changes.stations.iter().rev() {
            self.stations.restore(staged);
        }
        for staged in changes.bikes.iter().rev() {
            self.bikes.restore(staged);
        }

        let drift = self.audit();
        if !drift.is_empty() {
            error!(target: "integrity", "🚨 Rollback left {} stations inconsistent", drift.len());
        }
    }
}
