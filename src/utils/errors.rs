//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Categoría de un error de dominio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Precondición no cumplida, el cliente puede corregirla
    Precondition,
    /// El invariante estación/bici se rompió en otro lugar
    Consistency,
    /// Recurso inexistente
    NotFound,
    /// Entrada mal formada
    Invalid,
}

/// Errores del motor de inventario y alquileres
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("No active station with available bikes")]
    NoAvailableStation,

    #[error("No active station with a free dock")]
    NoActiveStation,

    #[error("Station {station_id} would end with {attempted} bikes (capacity {capacity})")]
    CapacityViolation { station_id: i64, attempted: i64, capacity: i32 },

    #[error("Station capacity must be positive, got {0}")]
    InvalidCapacity(i32),

    #[error("Station {0} not found")]
    UnknownStation(i64),

    #[error("No rentable bike docked at station {0}")]
    NoBikeAtStation(i64),

    #[error("Bike {0} not found")]
    UnknownBike(i64),

    #[error("Bike {0} is not rented")]
    BikeNotRented(i64),

    #[error("Bike {0} has an open rental")]
    BikeCurrentlyRented(i64),

    #[error("Bike status '{0}' cannot be set manually")]
    InvalidBikeStatus(String),

    #[error("User {0} already has an active rental")]
    AlreadyRenting(i64),

    #[error("Station {0} is inactive or has no bikes")]
    StationUnavailable(i64),

    #[error("Station {0} is inactive")]
    StationInactive(i64),

    #[error("Station {0} is full")]
    StationFull(i64),

    #[error("Rental {0} not found")]
    RentalNotFound(i64),

    #[error("Rental {0} was already returned")]
    RentalAlreadyReturned(i64),

    #[error("Invalid return metrics: {0}")]
    InvalidReturnMetrics(String),

    #[error("Repair {0} not found")]
    RepairNotFound(i64),

    #[error("Repair {repair_id} cannot {action} while {status}")]
    InvalidTransition { repair_id: i64, action: String, status: String },

    #[error("An admin note is required to complete a repair")]
    MissingNote,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidCoordinate { .. }
            | DomainError::InvalidBikeStatus(_)
            | DomainError::InvalidCapacity(_)
            | DomainError::InvalidReturnMetrics(_)
            | DomainError::MissingNote => ErrorKind::Invalid,
            // Los llamadores ya comprobaron aforo y existencias
            DomainError::NoBikeAtStation(_) | DomainError::CapacityViolation { .. } => {
                ErrorKind::Consistency
            }
            DomainError::UnknownStation(_)
            | DomainError::UnknownBike(_)
            | DomainError::RentalNotFound(_)
            | DomainError::RepairNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Precondition,
        }
    }

    /// Código estable para clientes
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidCoordinate { .. } => "INVALID_COORDINATE",
            DomainError::NoAvailableStation => "NO_AVAILABLE_STATION",
            DomainError::NoActiveStation => "NO_ACTIVE_STATION",
            DomainError::CapacityViolation { .. } => "CAPACITY_VIOLATION",
            DomainError::InvalidCapacity(_) => "INVALID_CAPACITY",
            DomainError::UnknownStation(_) => "UNKNOWN_STATION",
            DomainError::NoBikeAtStation(_) => "NO_BIKE_AT_STATION",
            DomainError::UnknownBike(_) => "UNKNOWN_BIKE",
            DomainError::BikeNotRented(_) => "BIKE_NOT_RENTED",
            DomainError::BikeCurrentlyRented(_) => "BIKE_CURRENTLY_RENTED",
            DomainError::InvalidBikeStatus(_) => "INVALID_BIKE_STATUS",
            DomainError::AlreadyRenting(_) => "ALREADY_RENTING",
            DomainError::StationUnavailable(_) => "STATION_UNAVAILABLE",
            DomainError::StationInactive(_) => "STATION_INACTIVE",
            DomainError::StationFull(_) => "STATION_FULL",
            DomainError::RentalNotFound(_) => "RENTAL_NOT_FOUND",
            DomainError::RentalAlreadyReturned(_) => "RENTAL_ALREADY_RETURNED",
            DomainError::InvalidReturnMetrics(_) => "INVALID_RETURN_METRICS",
            DomainError::RepairNotFound(_) => "REPAIR_NOT_FOUND",
            DomainError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DomainError::MissingNote => "MISSING_NOTE",
        }
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("External API error: {0}")]
    ExternalApi(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn domain_response(e: DomainError) -> (StatusCode, ErrorResponse) {
    let code = e.code();
    match e.kind() {
        ErrorKind::Consistency => {
            // El cliente ve un 500 genérico; el detalle queda en el log de integridad
            error!(target: "integrity", code, "🚨 Integrity violation surfaced to client: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(
                    "Integrity Error",
                    "Station inventory is inconsistent; an operator has been alerted".to_string(),
                    code,
                ),
            )
        }
        ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Not Found", e.to_string(), code),
        ),
        ErrorKind::Invalid => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Bad Request", e.to_string(), code),
        ),
        ErrorKind::Precondition => (
            StatusCode::CONFLICT,
            ErrorResponse::new("Conflict", e.to_string(), code),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Domain(e) => domain_response(e),

            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Database Error",
                        "An error occurred while accessing the database".to_string(),
                        "DB_ERROR",
                    ),
                )
            }

            AppError::Migration(e) => {
                error!("❌ Migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Database Error",
                        "Database schema is not ready".to_string(),
                        "MIGRATION_ERROR",
                    ),
                )
            }

            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "Validation Error",
                        "The provided data is invalid".to_string(),
                        "VALIDATION_ERROR",
                    )
                    .with_details(json!(e)),
                )
            }

            AppError::Unauthorized(msg) => {
                warn!("🔒 Unauthorized access: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED"),
                )
            }

            AppError::Forbidden(msg) => {
                warn!("🔒 Forbidden access: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse::new("Forbidden", msg, "FORBIDDEN"),
                )
            }

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"),
            ),

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Internal Server Error",
                        "An unexpected error occurred".to_string(),
                        "INTERNAL_ERROR",
                    ),
                )
            }

            AppError::ServiceUnavailable(msg) => {
                warn!("⚠️ Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("Service Unavailable", msg, "SERVICE_UNAVAILABLE"),
                )
            }

            AppError::Jwt(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("JWT Error", msg, "JWT_ERROR"),
            ),

            AppError::ExternalApi(msg) => {
                error!("❌ External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new(
                        "External API Error",
                        "An error occurred while communicating with external service".to_string(),
                        "EXTERNAL_API_ERROR",
                    )
                    .with_details(json!({ "external_api_error": msg })),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}
