//! Configuración de conexión a PostgreSQL
//!
//! Abre el pool y aplica las migraciones de `migrations/` al arrancar.

use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Conectar y ejecutar migraciones pendientes
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!("🔌 Connecting to database at {}", config.masked_url());
        let pool = config.create_pool().await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("✅ Database migrations applied");

        Ok(Self { pool })
    }

    pub fn into_pool(self) -> PgPool {
        self.pool
    }
}
