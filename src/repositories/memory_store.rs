//! Almacén volátil
//!
//! Útil para desarrollo y tests. Puede arrancar con un volcado JSON
//! (`SEED_FILE`); los commits solo se cuentan.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::repositories::inventory_store::InventoryStore;
use crate::services::change_set::ChangeSet;
use crate::services::inventory::InventorySnapshot;
use crate::utils::errors::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct MemoryStore {
    seed: InventorySnapshot,
    commits: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: InventorySnapshot) -> Self {
        Self {
            seed,
            commits: Arc::default(),
        }
    }

    /// Cargar la semilla desde un archivo JSON con el formato de `InventorySnapshot`
    pub async fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot read seed file {}: {}", path.display(), e)))?;
        let seed: InventorySnapshot = serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid seed file {}: {}", path.display(), e)))?;
        info!(
            "🌱 Seed loaded from {}: {} stations, {} bikes",
            path.display(),
            seed.stations.len(),
            seed.bikes.len()
        );
        Ok(Self::with_seed(seed))
    }

    /// Cantidad de commits aceptados
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn load(&self) -> AppResult<InventorySnapshot> {
        Ok(self.seed.clone())
    }

    async fn commit(&self, changes: &ChangeSet) -> AppResult<()> {
        if !changes.is_empty() {
            self.commits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
