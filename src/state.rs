//! Estado compartido por los handlers
//!
//! Motor de inventario, configuración, JWT y geocodificador opcional.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::services::{BikeShareService, Geocoder};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub service: BikeShareService,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    /// `None` cuando no hay token de Mapbox configurado
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

impl AppState {
    pub fn new(
        service: BikeShareService,
        config: EnvironmentConfig,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        let jwt = JwtConfig::from(&config);
        Self {
            service,
            config,
            jwt,
            geocoder,
        }
    }
}
