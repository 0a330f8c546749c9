//! Configuración del servicio de bicis
//!
//! Variables de entorno, backend de almacenamiento y pool de PostgreSQL.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::*;
