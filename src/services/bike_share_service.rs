//! Servicio de bicis compartidas
//!
//! Punto de entrada del motor para los controladores. Las escrituras toman el
//! cerrojo global de escritura, aplican la transición en memoria, la
//! confirman en el almacén y la deshacen si el commit falla. Las lecturas
//! comparten el cerrojo de lectura.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::models::*;
use crate::repositories::InventoryStore;
use crate::services::change_set::Transition;
use crate::services::geo_math::Coordinate;
use crate::services::inventory::{Inventory, InventoryDiscrepancy};
use crate::services::route_estimator::{RouteEstimator, TravelSpeeds};
use crate::utils::errors::{AppError, AppResult, DomainError, ErrorKind};

#[derive(Clone)]
pub struct BikeShareService {
    inventory: Arc<RwLock<Inventory>>,
    store: Arc<dyn InventoryStore>,
    estimator: RouteEstimator,
}

impl BikeShareService {
    /// Cargar el inventario desde el almacén
    pub async fn load(store: Arc<dyn InventoryStore>, speeds: TravelSpeeds) -> AppResult<Self> {
        let snapshot = store.load().await?;
        let inventory = Inventory::from_snapshot(snapshot);
        info!(
            "✅ Inventory ready ({} backend): {} stations, {} bikes, {} open rentals",
            store.backend_name(),
            inventory.stations().len(),
            inventory.bikes().iter().count(),
            inventory.rentals().open_count()
        );
        Ok(Self {
            inventory: Arc::new(RwLock::new(inventory)),
            store,
            estimator: RouteEstimator::new(speeds),
        })
    }

    /// Aplicar una transición y confirmarla; todo o nada.
    ///
    /// La sección crítica corre en su propia tarea con el cerrojo en
    /// propiedad: si el llamador abandona la petición, el commit o el
    /// rollback terminan igualmente.
    async fn apply<T, F>(&self, operation: &'static str, transition: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inventory) -> Result<Transition<T>, DomainError> + Send + 'static,
    {
        let mut inventory = self.inventory.clone().write_owned().await;
        let store = Arc::clone(&self.store);

        let task = tokio::spawn(async move {
            let Transition { record, changes } = transition(&mut *inventory).map_err(|e| {
                match e.kind() {
                    ErrorKind::Consistency => {
                        error!(target: "integrity", operation, "🚨 {} failed: {}", operation, e)
                    }
                    _ => warn!("⚠️ {} rejected: {}", operation, e),
                }
                e
            })?;

            if let Err(e) = store.commit(&changes).await {
                inventory.rollback(&changes);
                error!("❌ {} commit failed, in-memory change rolled back: {}", operation, e);
                return Err(e);
            }

            Ok::<T, AppError>(record)
        });

        task.await.map_err(|e| {
            error!(target: "integrity", operation, "🚨 {} aborted: {}", operation, e);
            AppError::Internal(format!("{} did not complete", operation))
        })?
    }

    // ---- Alquileres ----

    pub async fn create_rental(&self, user_id: i64, station_id: i64) -> AppResult<Rental> {
        self.apply("create_rental", move |inv| {
            inv.create_rental(user_id, station_id, Utc::now())
        })
        .await
    }

    pub async fn return_rental(
        &self,
        rental_id: i64,
        end_station_id: i64,
        metrics: ReturnMetrics,
    ) -> AppResult<Rental> {
        self.apply("return_rental", move |inv| {
            inv.return_rental(rental_id, end_station_id, metrics, Utc::now())
        })
        .await
    }

    pub async fn get_rental(&self, rental_id: i64) -> AppResult<Rental> {
        let inventory = self.inventory.read().await;
        Ok(inventory.rentals().get(rental_id)?.clone())
    }

    pub async fn user_rentals(&self, user_id: i64) -> Vec<Rental> {
        self.inventory.read().await.rentals().user_rentals(user_id)
    }

    pub async fn current_rental(&self, user_id: i64) -> Option<Rental> {
        self.inventory
            .read()
            .await
            .rentals()
            .active_for_user(user_id)
            .cloned()
    }

    // ---- Estaciones ----

    pub async fn list_stations(&self) -> Vec<Station> {
        self.inventory.read().await.stations().list()
    }

    pub async fn get_station(&self, station_id: i64) -> AppResult<Station> {
        let inventory = self.inventory.read().await;
        Ok(inventory.stations().get(station_id)?.clone())
    }

    pub async fn find_nearest_station(&self, coord: Coordinate, for_return: bool) -> AppResult<Station> {
        let inventory = self.inventory.read().await;
        Ok(inventory.find_nearest_station(coord, for_return)?.clone())
    }

    pub async fn status_summary(&self) -> StationStatusSummary {
        self.inventory.read().await.stations().status_summary()
    }

    pub async fn register_station(&self, new_station: NewStation) -> AppResult<Station> {
        self.apply("register_station", move |inv| inv.register_station(new_station))
            .await
    }

    pub async fn set_station_status(&self, station_id: i64, status: StationStatus) -> AppResult<Station> {
        self.apply("set_station_status", move |inv| {
            inv.set_station_status(station_id, status)
        })
        .await
    }

    // ---- Bicis ----

    pub async fn list_bikes(&self, station_id: Option<i64>) -> Vec<Bike> {
        let inventory = self.inventory.read().await;
        match station_id {
            Some(id) => inventory.bikes().list_at(id),
            None => inventory.bikes().list(),
        }
    }

    pub async fn get_bike(&self, bike_id: i64) -> AppResult<Bike> {
        let inventory = self.inventory.read().await;
        Ok(inventory.bikes().get(bike_id)?.clone())
    }

    pub async fn register_bike(&self, station_id: i64) -> AppResult<Bike> {
        self.apply("register_bike", move |inv| inv.register_bike(station_id))
            .await
    }

    pub async fn set_bike_status(&self, bike_id: i64, status: BikeStatus) -> AppResult<Bike> {
        self.apply("set_bike_status", move |inv| inv.set_bike_status(bike_id, status))
            .await
    }

    // ---- Rutas ----

    pub async fn plan_route(&self, origin: Coordinate, destination: Coordinate) -> AppResult<RouteResult> {
        let inventory = self.inventory.read().await;
        Ok(inventory.plan_route(&self.estimator, origin, destination)?)
    }

    // ---- Reparaciones ----

    pub async fn report_repair(&self, new_repair: NewRepair) -> AppResult<Repair> {
        self.apply("report_repair", move |inv| inv.report_repair(new_repair, Utc::now()))
            .await
    }

    pub async fn advance_repair(
        &self,
        repair_id: i64,
        action: RepairAction,
        note: Option<String>,
    ) -> AppResult<Repair> {
        self.apply("advance_repair", move |inv| {
            inv.advance_repair(repair_id, action, note, Utc::now())
        })
        .await
    }

    pub async fn get_repair(&self, repair_id: i64) -> AppResult<Repair> {
        let inventory = self.inventory.read().await;
        Ok(inventory.repairs().get(repair_id)?.clone())
    }

    pub async fn list_repairs(&self, status: Option<RepairStatus>) -> Vec<Repair> {
        self.inventory.read().await.repairs().list(status)
    }

    pub async fn list_user_repairs(&self, reporter_id: i64) -> Vec<Repair> {
        self.inventory.read().await.repairs().list_by_reporter(reporter_id)
    }

    // ---- Integridad ----

    pub async fn audit(&self) -> Vec<InventoryDiscrepancy> {
        let discrepancies = self.inventory.read().await.audit();
        if !discrepancies.is_empty() {
            error!(
                target: "integrity",
                "🚨 Audit found {} stations whose count does not match docked bikes",
                discrepancies.len()
            );
        }
        discrepancies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use crate::services::change_set::ChangeSet;
    use crate::services::inventory::InventorySnapshot;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Almacén que rechaza commits mientras `failing` esté activo
    struct FlakyStore {
        seed: InventorySnapshot,
        failing: AtomicBool,
    }

    #[async_trait]
    impl InventoryStore for FlakyStore {
        async fn load(&self) -> AppResult<InventorySnapshot> {
            Ok(self.seed.clone())
        }

        async fn commit(&self, _changes: &ChangeSet) -> AppResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(AppError::Internal("disk on fire".to_string()))
            } else {
                Ok(())
            }
        }

        fn backend_name(&self) -> &'static str {
            "flaky"
        }
    }

    /// Almacén cuyo commit tarda `delay` y puede terminar en error
    struct SlowStore {
        seed: InventorySnapshot,
        delay: Duration,
        fail: bool,
        commits: AtomicUsize,
    }

    impl SlowStore {
        fn new(delay: Duration, fail: bool) -> Self {
            Self {
                seed: seed(),
                delay,
                fail,
                commits: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InventoryStore for SlowStore {
        async fn load(&self) -> AppResult<InventorySnapshot> {
            Ok(self.seed.clone())
        }

        async fn commit(&self, _changes: &ChangeSet) -> AppResult<()> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(AppError::Internal("write timed out".to_string()));
            }
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "slow"
        }
    }

    fn seed() -> InventorySnapshot {
        InventorySnapshot {
            stations: vec![Station {
                id: 1,
                name: "City Hall".to_string(),
                address: "110 Sejong-daero".to_string(),
                latitude: 37.5665,
                longitude: 126.9780,
                capacity: 10,
                bike_count: 1,
                status: StationStatus::Active,
            }],
            bikes: vec![Bike {
                id: 1,
                current_station: Some(1),
                status: BikeStatus::Available,
                use_count: 0,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_partial_state() {
        let store = Arc::new(FlakyStore {
            seed: seed(),
            failing: AtomicBool::new(true),
        });
        let service = BikeShareService::load(store.clone(), TravelSpeeds::default())
            .await
            .unwrap();

        let err = service.create_rental(8, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(service.get_station(1).await.unwrap().bike_count, 1);
        assert_eq!(service.get_bike(1).await.unwrap().status, BikeStatus::Available);
        assert!(service.current_rental(8).await.is_none());
        assert!(service.audit().await.is_empty());

        store.failing.store(false, Ordering::SeqCst);
        let rental = service.create_rental(8, 1).await.unwrap();
        assert_eq!(rental.id, 1);
        assert_eq!(service.get_station(1).await.unwrap().bike_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_rentals_on_single_bike_station() {
        let store = Arc::new(MemoryStore::with_seed(seed()));
        let service = BikeShareService::load(store.clone(), TravelSpeeds::default())
            .await
            .unwrap();

        let handles: Vec<_> = (100..132)
            .map(|user| {
                let service = service.clone();
                tokio::spawn(async move { service.create_rental(user, 1).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::Domain(DomainError::StationUnavailable(1))) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(service.get_station(1).await.unwrap().bike_count, 0);
        assert_eq!(store.commit_count(), 1);
        assert!(service.audit().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_rentals_for_same_user() {
        let mut snapshot = seed();
        snapshot.stations[0].bike_count = 5;
        snapshot.bikes = (1..=5)
            .map(|id| Bike {
                id,
                current_station: Some(1),
                status: BikeStatus::Available,
                use_count: 0,
            })
            .collect();
        let service = BikeShareService::load(Arc::new(MemoryStore::with_seed(snapshot)), TravelSpeeds::default())
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.create_rental(42, 1).await })
            })
            .collect();
        let results: Vec<_> = futures::future::join_all(handles).await;
        let opened = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();

        assert_eq!(opened, 1);
        assert_eq!(service.user_rentals(42).await.len(), 1);
        assert_eq!(service.get_station(1).await.unwrap().bike_count, 4);
    }

    #[tokio::test]
    async fn test_abandoned_rental_still_commits() {
        let store = Arc::new(SlowStore::new(Duration::from_millis(200), false));
        let service = BikeShareService::load(store.clone(), TravelSpeeds::default())
            .await
            .unwrap();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), service.create_rental(8, 1)).await;
        assert!(abandoned.is_err());

        // Las lecturas esperan a que termine la sección crítica
        let rental = service.current_rental(8).await.unwrap();
        assert_eq!(rental.start_station, 1);
        assert_eq!(store.commits.load(Ordering::SeqCst), 1);
        assert_eq!(service.get_station(1).await.unwrap().bike_count, 0);
        assert_eq!(service.get_bike(1).await.unwrap().status, BikeStatus::Rented);
        assert!(service.audit().await.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_rental_rolls_back_on_failed_commit() {
        let store = Arc::new(SlowStore::new(Duration::from_millis(200), true));
        let service = BikeShareService::load(store.clone(), TravelSpeeds::default())
            .await
            .unwrap();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), service.create_rental(8, 1)).await;
        assert!(abandoned.is_err());

        assert!(service.current_rental(8).await.is_none());
        assert_eq!(store.commits.load(Ordering::SeqCst), 0);
        assert_eq!(service.get_station(1).await.unwrap().bike_count, 1);
        assert_eq!(service.get_bike(1).await.unwrap().status, BikeStatus::Available);
        assert!(service.audit().await.is_empty());
    }
}
