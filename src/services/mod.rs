//! Services module
//!
//! Este módulo contiene la lógica de negocio del sistema de bicis
//! compartidas. Los componentes del inventario son síncronos y puros;
//! `BikeShareService` los envuelve con el cerrojo global y el almacén.

pub mod bike_registry;
pub mod bike_share_service;
pub mod change_set;
pub mod geo_math;
pub mod geocoding_service;
pub mod inventory;
pub mod rental_ledger;
pub mod repair_workflow;
pub mod route_estimator;
pub mod station_directory;

pub use bike_share_service::BikeShareService;
pub use geo_math::Coordinate;
pub use geocoding_service::{GeocodedAddress, Geocoder, GeocodingService};
pub use inventory::{Inventory, InventoryDiscrepancy, InventorySnapshot};
pub use route_estimator::{RouteEstimator, TravelSpeeds};
