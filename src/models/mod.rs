//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL (ver `migrations/`).

pub mod bike;
pub mod rental;
pub mod repair;
pub mod route;
pub mod station;

pub use bike::*;
pub use rental::*;
pub use repair::*;
pub use route::*;
pub use station::*;
