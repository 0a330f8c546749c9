//! Bike Share - inventario de estaciones y ciclo de vida de alquileres
//!
//! Motor de inventario en memoria (estaciones, bicis, alquileres y
//! reparaciones) con persistencia transaccional y API HTTP.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_middleware, cors_layer};
use crate::state::AppState;

/// Construir el router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/stations", routes::station_routes::create_station_router())
        .nest("/bikes", routes::bike_routes::create_bike_router())
        .nest("/rentals", routes::rental_routes::create_rental_router())
        .nest("/routes", routes::route_routes::create_route_router())
        .nest("/repairs", routes::repair_routes::create_repair_router())
        .nest("/admin", routes::admin_routes::create_admin_router())
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

/// Endpoint de salud
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "bike_share",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
