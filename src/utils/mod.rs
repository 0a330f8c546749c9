//! Utilidades compartidas: errores de dominio y HTTP, validación de
//! peticiones y tokens JWT de ciclistas y administradores.

pub mod errors;
pub mod jwt;
pub mod validation;
