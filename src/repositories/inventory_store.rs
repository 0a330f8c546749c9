use async_trait::async_trait;

use crate::services::change_set::ChangeSet;
use crate::services::inventory::InventorySnapshot;
use crate::utils::errors::AppResult;

/// Persistencia del inventario.
///
/// `commit` debe aplicar todo el `ChangeSet` o nada: el motor lo llama con el
/// cerrojo de escritura tomado y deshace el cambio en memoria si falla.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn load(&self) -> AppResult<InventorySnapshot>;

    async fn commit(&self, changes: &ChangeSet) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}
