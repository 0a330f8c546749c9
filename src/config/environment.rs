//! Configuración de variables de entorno
//!
//! Este módulo lee la configuración del servicio desde el entorno (y `.env`
//! vía `dotenvy` en `main`). Los valores ausentes u obligatorios mal
//! formados devuelven un error descriptivo.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use crate::services::route_estimator::TravelSpeeds;

/// Backend de persistencia del inventario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub storage_backend: StorageBackend,
    pub seed_file: Option<PathBuf>,
    pub mapbox_token: Option<String>,
    pub geocoding_country: String,
    pub travel_speeds: TravelSpeeds,
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = TravelSpeeds::default();

        let config = Self {
            environment: var_or("ENVIRONMENT", "development"),
            port: parse_or("PORT", 3000)?,
            host: var_or("HOST", "0.0.0.0"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86_400)?,
            cors_origins: var_or("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            log_level: var_or("LOG_LEVEL", "info"),
            storage_backend: var_or("STORAGE_BACKEND", "postgres").parse()?,
            seed_file: optional("SEED_FILE").map(PathBuf::from),
            mapbox_token: optional("MAPBOX_TOKEN"),
            geocoding_country: var_or("GEOCODING_COUNTRY", "kr"),
            travel_speeds: TravelSpeeds {
                walking_kmh: parse_or("WALKING_SPEED_KMH", defaults.walking_kmh)?,
                biking_kmh: parse_or("BIKING_SPEED_KMH", defaults.biking_kmh)?,
            },
        };

        for (name, speed) in [
            ("WALKING_SPEED_KMH", config.travel_speeds.walking_kmh),
            ("BIKING_SPEED_KMH", config.travel_speeds.biking_kmh),
        ] {
            if !speed.is_finite() || speed <= 0.0 {
                bail!("{} must be a positive number, got {}", name, speed);
            }
        }

        Ok(config)
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} must be a valid number, got '{}': {}", name, raw, e)),
        None => Ok(default),
    }
}
