//! Conexión a PostgreSQL para el almacén persistente del inventario

pub mod connection;

pub use connection::DatabaseConnection;
