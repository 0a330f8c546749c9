//! Repositorios
//!
//! Almacenes de inventario: la interfaz `InventoryStore` y sus
//! implementaciones en PostgreSQL y en memoria.

pub mod inventory_store;
pub mod memory_store;
pub mod pg_inventory_store;

pub use inventory_store::InventoryStore;
pub use memory_store::MemoryStore;
pub use pg_inventory_store::PgInventoryStore;
