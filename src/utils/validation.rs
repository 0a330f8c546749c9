//! Utilidades de validación
//!
//! Validadores personalizados para los DTOs (`#[validate(custom = ...)]`)
//! y un helper que convierte los errores en `AppError`.

use validator::{Validate, ValidationError};

use crate::utils::errors::AppResult;

/// Validar que un string no esté vacío ni sea solo espacios
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar un request y devolverlo si es correcto
pub fn validated<T: Validate>(request: T) -> AppResult<T> {
    request.validate()?;
    Ok(request)
}
