//! Libro de alquileres
//!
//! Dueño exclusivo de los registros `Rental`. Orquesta las transacciones de
//! alquiler y devolución sobre `StationDirectory` y `BikeRegistry`: o se
//! aplican los tres cambios (bici, estación, alquiler) o ninguno.
//!
//! Estados por usuario: `Idle` (sin alquiler abierto) -> `Active` -> `Idle`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::models::{Rental, RentalStatus, ReturnMetrics};
use crate::services::bike_registry::BikeRegistry;
use crate::services::change_set::{ChangeSet, Staged, Transition};
use crate::services::geo_math::haversine_km;
use crate::services::station_directory::StationDirectory;
use crate::utils::errors::DomainError;

#[derive(Debug, Clone)]
pub struct RentalLedger {
    rentals: BTreeMap<i64, Rental>,
    /// user_id -> id del alquiler abierto
    open_by_user: HashMap<i64, i64>,
    next_id: i64,
}

impl Default for RentalLedger {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl RentalLedger {
    pub fn from_records(records: Vec<Rental>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let open_by_user = records
            .iter()
            .filter(|r| r.is_open())
            .map(|r| (r.user_id, r.id))
            .collect();
        let rentals = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            rentals,
            open_by_user,
            next_id,
        }
    }

    pub fn get(&self, rental_id: i64) -> Result<&Rental, DomainError> {
        self.rentals
            .get(&rental_id)
            .ok_or(DomainError::RentalNotFound(rental_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rental> {
        self.rentals.values()
    }

    pub fn active_for_user(&self, user_id: i64) -> Option<&Rental> {
        self.open_by_user
            .get(&user_id)
            .and_then(|id| self.rentals.get(id))
    }

    /// Historial del usuario, el más reciente primero
    pub fn user_rentals(&self, user_id: i64) -> Vec<Rental> {
        let mut rentals: Vec<Rental> = self
            .rentals
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rentals.sort_by(|a, b| b.rental_time.cmp(&a.rental_time).then(b.id.cmp(&a.id)));
        rentals
    }

    pub fn open_count(&self) -> usize {
        self.open_by_user.len()
    }

    /// Abrir un alquiler en `station_id`. La bici la elige el sistema.
    pub fn create_rental(
        &mut self,
        stations: &mut StationDirectory,
        bikes: &mut BikeRegistry,
        user_id: i64,
        station_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Transition<Rental>, DomainError> {
        if self.open_by_user.contains_key(&user_id) {
            return Err(DomainError::AlreadyRenting(user_id));
        }

        let station = stations.get(station_id)?;
        if !station.is_active() || !station.has_bikes() {
            return Err(DomainError::StationUnavailable(station_id));
        }
        let claimed = station.bike_count;

        let bike_stage = bikes.assign_for_rental(station_id).map_err(|e| match e {
            DomainError::NoBikeAtStation(_) if bikes.docked_count(station_id) == 0 => {
                error!(
                    target: "integrity",
                    station_id,
                    claimed_bike_count = claimed,
                    "🚨 Station reports bikes but none are docked"
                );
                e
            }
            // Hay bicis ancladas pero todas en mantenimiento o averiadas
            DomainError::NoBikeAtStation(_) => DomainError::StationUnavailable(station_id),
            other => other,
        })?;

        let station_stage = match stations.adjust_bike_count(station_id, -1) {
            Ok(staged) => staged,
            Err(e) => {
                // Ninguna bici alquilada sin alquiler que la respalde
                bikes.restore(&bike_stage);
                error!(
                    target: "integrity",
                    station_id,
                    bike_id = bike_stage.after.id,
                    "🚨 Bike assignment rolled back: {}", e
                );
                return Err(e);
            }
        };

        let rental = Rental {
            id: self.next_id,
            user_id,
            bike_id: bike_stage.after.id,
            start_station: station_id,
            end_station: None,
            rental_time: now,
            return_time: None,
            duration: None,
            distance: None,
            status: RentalStatus::Rented,
        };
        self.next_id += 1;
        self.rentals.insert(rental.id, rental.clone());
        self.open_by_user.insert(user_id, rental.id);

        info!(
            "🚲 Rental {} opened: user {} took bike {} at station {}",
            rental.id, user_id, rental.bike_id, station_id
        );

        let changes = ChangeSet::default()
            .with_bike(bike_stage)
            .with_station(station_stage)
            .with_rental(Staged::created(rental.clone()));
        Ok(Transition::new(rental, changes))
    }

    /// Cerrar un alquiler devolviendo la bici en `end_station_id`.
    ///
    /// Las métricas enviadas por el cliente mandan; si faltan, la distancia es
    /// la Haversine entre estaciones y la duración son los minutos completos
    /// transcurridos desde `rental_time`.
    pub fn return_rental(
        &mut self,
        stations: &mut StationDirectory,
        bikes: &mut BikeRegistry,
        rental_id: i64,
        end_station_id: i64,
        metrics: ReturnMetrics,
        now: DateTime<Utc>,
    ) -> Result<Transition<Rental>, DomainError> {
        let rental = self.get(rental_id)?;
        if !rental.is_open() {
            return Err(DomainError::RentalAlreadyReturned(rental_id));
        }

        let end_station = stations.get(end_station_id)?;
        if !end_station.is_active() {
            return Err(DomainError::StationInactive(end_station_id));
        }
        if !end_station.has_free_dock() {
            return Err(DomainError::StationFull(end_station_id));
        }

        let distance = match metrics.distance_km {
            Some(d) if d.is_finite() && d >= 0.0 => d,
            Some(d) => return Err(DomainError::InvalidReturnMetrics(format!("distance {}", d))),
            None => {
                let start = stations.get(rental.start_station)?;
                haversine_km(start.coordinate(), end_station.coordinate())
            }
        };
        let duration = match metrics.duration_minutes {
            Some(m) if m >= 0 => m,
            Some(m) => return Err(DomainError::InvalidReturnMetrics(format!("duration {}", m))),
            None => elapsed_minutes(rental.rental_time, now),
        };
        let bike_id = rental.bike_id;

        let bike_stage = bikes.release_to_station(bike_id, end_station_id)?;
        let station_stage = match stations.adjust_bike_count(end_station_id, 1) {
            Ok(staged) => staged,
            Err(e) => {
                bikes.restore(&bike_stage);
                return Err(e);
            }
        };

        let rental = self
            .rentals
            .get_mut(&rental_id)
            .ok_or(DomainError::RentalNotFound(rental_id))?;
        let before = rental.clone();
        rental.end_station = Some(end_station_id);
        rental.return_time = Some(now);
        rental.distance = Some(distance);
        rental.duration = Some(duration);
        rental.status = RentalStatus::Returned;
        let after = rental.clone();
        self.open_by_user.remove(&after.user_id);

        info!(
            "🅿️ Rental {} closed: bike {} docked at station {} ({:.2} km, {} min)",
            rental_id, bike_id, end_station_id, distance, duration
        );

        let changes = ChangeSet::default()
            .with_bike(bike_stage)
            .with_station(station_stage)
            .with_rental(Staged::updated(before, after.clone()));
        Ok(Transition::new(after, changes))
    }

    pub(crate) fn restore(&mut self, staged: &Staged<Rental>) {
        let after = &staged.after;
        if self.open_by_user.get(&after.user_id) == Some(&after.id) {
            self.open_by_user.remove(&after.user_id);
        }
        match &staged.before {
            Some(before) => {
                if before.is_open() {
                    self.open_by_user.insert(before.user_id, before.id);
                }
                self.rentals.insert(before.id, before.clone());
            }
            None => {
                self.rentals.remove(&after.id);
                if after.id + 1 == self.next_id {
                    self.next_id = after.id;
                }
            }
        }
    }
}

fn elapsed_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    let minutes = (to - from).num_minutes().max(0);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BikeStatus, StationStatus};
    use crate::services::bike_registry::tests::bike;
    use crate::services::station_directory::tests::station;
    use chrono::Duration;

    struct Fixture {
        stations: StationDirectory,
        bikes: BikeRegistry,
        ledger: RentalLedger,
    }

    impl Fixture {
        /// S1: capacidad 10 con una bici; S2: capacidad 2 con dos bicis; S3: vacía
        fn new() -> Self {
            Self {
                stations: StationDirectory::from_records(vec![
                    station(1, 37.5665, 126.9780, 10, 1),
                    station(2, 37.5700, 126.9820, 2, 2),
                    station(3, 37.5512, 126.9882, 4, 0),
                ]),
                bikes: BikeRegistry::from_records(vec![
                    bike(100, Some(1), BikeStatus::Available),
                    bike(200, Some(2), BikeStatus::Available),
                    bike(201, Some(2), BikeStatus::Available),
                ]),
                ledger: RentalLedger::default(),
            }
        }

        fn rent(&mut self, user: i64, station: i64) -> Result<Rental, DomainError> {
            self.ledger
                .create_rental(&mut self.stations, &mut self.bikes, user, station, Utc::now())
                .map(|t| t.record)
        }

        fn give_back(&mut self, rental: i64, station: i64) -> Result<Rental, DomainError> {
            self.ledger
                .return_rental(
                    &mut self.stations,
                    &mut self.bikes,
                    rental,
                    station,
                    ReturnMetrics::default(),
                    Utc::now(),
                )
                .map(|t| t.record)
        }

        fn count(&self, station: i64) -> i32 {
            self.stations.get(station).unwrap().bike_count
        }

        fn assert_counts_match_docked_bikes(&self) {
            for s in self.stations.iter() {
                assert_eq!(
                    s.bike_count as usize,
                    self.bikes.docked_count(s.id),
                    "station {} count drifted",
                    s.id
                );
            }
        }
    }

    #[test]
    fn test_single_bike_station_scenario() {
        let mut fx = Fixture::new();

        let rental = fx.rent(1, 1).unwrap();
        assert_eq!(rental.bike_id, 100);
        assert_eq!(rental.status, RentalStatus::Rented);
        assert_eq!(fx.count(1), 0);

        assert_eq!(fx.rent(1, 2), Err(DomainError::AlreadyRenting(1)));
        assert_eq!(fx.rent(2, 1), Err(DomainError::StationUnavailable(1)));
        assert_eq!(fx.count(2), 2);
        fx.assert_counts_match_docked_bikes();
    }

    #[test]
    fn test_round_trip_leaves_count_unchanged() {
        let mut fx = Fixture::new();
        let rental = fx.rent(7, 2).unwrap();
        assert_eq!(fx.count(2), 1);

        let closed = fx.give_back(rental.id, 2).unwrap();
        assert_eq!(closed.status, RentalStatus::Returned);
        assert_eq!(closed.end_station, Some(2));
        assert_eq!(closed.distance, Some(0.0));
        assert_eq!(fx.count(2), 2);
        assert_eq!(fx.bikes.get(rental.bike_id).unwrap().status, BikeStatus::Available);
        assert!(fx.ledger.active_for_user(7).is_none());
        fx.assert_counts_match_docked_bikes();
    }

    #[test]
    fn test_double_return_is_rejected() {
        let mut fx = Fixture::new();
        let rental = fx.rent(7, 1).unwrap();
        fx.give_back(rental.id, 3).unwrap();
        assert_eq!(fx.count(3), 1);

        assert_eq!(
            fx.give_back(rental.id, 3),
            Err(DomainError::RentalAlreadyReturned(rental.id))
        );
        assert_eq!(fx.count(3), 1);
        fx.assert_counts_match_docked_bikes();
    }

    #[test]
    fn test_return_to_other_station_moves_bike() {
        let mut fx = Fixture::new();
        let rental = fx.rent(3, 1).unwrap();
        let closed = fx.give_back(rental.id, 3).unwrap();

        assert_eq!(fx.count(1), 0);
        assert_eq!(fx.count(3), 1);
        assert!(closed.distance.unwrap() > 0.0);
        assert_eq!(fx.bikes.get(100).unwrap().current_station, Some(3));
        fx.assert_counts_match_docked_bikes();
    }

    #[test]
    fn test_return_preconditions() {
        let mut fx = Fixture::new();
        let rental = fx.rent(3, 1).unwrap();

        assert_eq!(fx.give_back(999, 3), Err(DomainError::RentalNotFound(999)));
        assert_eq!(fx.give_back(rental.id, 2), Err(DomainError::StationFull(2)));

        fx.stations.set_status(3, StationStatus::Inactive).unwrap();
        assert_eq!(fx.give_back(rental.id, 3), Err(DomainError::StationInactive(3)));

        // Nada se aplicó a medias
        assert!(fx.ledger.get(rental.id).unwrap().is_open());
        assert_eq!(fx.bikes.get(100).unwrap().status, BikeStatus::Rented);
        fx.assert_counts_match_docked_bikes();
    }

    #[test]
    fn test_user_can_rent_again_after_return() {
        let mut fx = Fixture::new();
        let first = fx.rent(5, 2).unwrap();
        fx.give_back(first.id, 3).unwrap();
        let second = fx.rent(5, 3).unwrap();

        assert_eq!(second.bike_id, first.bike_id);
        let history = fx.ledger.user_rentals(5);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(fx.bikes.get(first.bike_id).unwrap().use_count, 2);
    }

    #[test]
    fn test_inactive_station_is_unavailable() {
        let mut fx = Fixture::new();
        fx.stations.set_status(2, StationStatus::Inactive).unwrap();
        assert_eq!(fx.rent(1, 2), Err(DomainError::StationUnavailable(2)));
        assert_eq!(fx.rent(1, 42), Err(DomainError::UnknownStation(42)));
    }

    #[test]
    fn test_only_broken_bikes_is_unavailable_not_integrity() {
        let mut fx = Fixture::new();
        fx.bikes.set_status(100, BikeStatus::Broken).unwrap();
        assert_eq!(fx.rent(1, 1), Err(DomainError::StationUnavailable(1)));
        assert_eq!(fx.count(1), 1);
    }

    #[test]
    fn test_count_mismatch_is_integrity_error_without_side_effects() {
        let mut fx = Fixture::new();
        // S3 dice tener una bici pero no hay ninguna anclada
        fx.stations = StationDirectory::from_records(vec![station(3, 37.55, 126.98, 4, 1)]);
        assert_eq!(fx.rent(1, 3), Err(DomainError::NoBikeAtStation(3)));
        assert_eq!(fx.count(3), 1);
        assert!(fx.ledger.active_for_user(1).is_none());
    }

    #[test]
    fn test_return_metrics_policy() {
        let mut fx = Fixture::new();
        let start = Utc::now() - Duration::minutes(42);
        let rental = fx
            .ledger
            .create_rental(&mut fx.stations, &mut fx.bikes, 9, 2, start)
            .unwrap()
            .record;

        let computed = fx
            .ledger
            .return_rental(
                &mut fx.stations,
                &mut fx.bikes,
                rental.id,
                1,
                ReturnMetrics::default(),
                start + Duration::minutes(42),
            )
            .unwrap()
            .record;
        assert_eq!(computed.duration, Some(42));

        let again = fx.rent(9, 2).unwrap();
        let supplied = fx
            .ledger
            .return_rental(
                &mut fx.stations,
                &mut fx.bikes,
                again.id,
                3,
                ReturnMetrics {
                    distance_km: Some(3.5),
                    duration_minutes: Some(17),
                },
                Utc::now(),
            )
            .unwrap()
            .record;
        assert_eq!(supplied.distance, Some(3.5));
        assert_eq!(supplied.duration, Some(17));

        let third = fx.rent(9, 1).unwrap();
        let rejected = fx.ledger.return_rental(
            &mut fx.stations,
            &mut fx.bikes,
            third.id,
            3,
            ReturnMetrics {
                distance_km: Some(-1.0),
                duration_minutes: None,
            },
            Utc::now(),
        );
        assert!(matches!(rejected, Err(DomainError::InvalidReturnMetrics(_))));
        assert!(fx.ledger.get(third.id).unwrap().is_open());
    }

    #[test]
    fn test_restore_undoes_create() {
        let mut fx = Fixture::new();
        let transition = fx
            .ledger
            .create_rental(&mut fx.stations, &mut fx.bikes, 1, 1, Utc::now())
            .unwrap();
        for staged in transition.changes.rentals.iter().rev() {
            fx.ledger.restore(staged);
        }
        for staged in transition.changes.stations.iter().rev() {
            fx.stations.restore(staged);
        }
        for staged in transition.changes.bikes.iter().rev() {
            fx.bikes.restore(staged);
        }

        assert!(fx.ledger.active_for_user(1).is_none());
        assert_eq!(fx.count(1), 1);
        // El id se reutiliza tras deshacer
        let rental = fx.rent(1, 1).unwrap();
        assert_eq!(rental.id, transition.record.id);
    }
}
