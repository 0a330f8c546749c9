use serde::Deserialize;
use validator::Validate;

use crate::models::{RepairAction, RepairStatus, RepairTarget};

// Request para reportar una avería
#[derive(Debug, Deserialize, Validate)]
pub struct ReportRepairRequest {
    pub target_type: RepairTarget,
    #[validate(range(min = 1))]
    pub target_id: i64,
    #[validate(length(max = 50), custom = "crate::utils::validation::validate_not_blank")]
    pub category: String,
    #[validate(length(max = 2000), custom = "crate::utils::validation::validate_not_blank")]
    pub description: String,
}

// Request para avanzar una reparación
#[derive(Debug, Deserialize, Validate)]
pub struct AdvanceRepairRequest {
    pub action: RepairAction,
    #[validate(length(max = 2000))]
    pub admin_note: Option<String>,
}

// Filtro opcional del listado de administración
#[derive(Debug, Default, Deserialize)]
pub struct ListRepairsQuery {
    pub status: Option<RepairStatus>,
}
