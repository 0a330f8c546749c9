use axum::{extract::State, middleware, routing::get, Json, Router};

use crate::controllers::station_controller::StationController;
use crate::dto::common_dto::ApiResponse;
use crate::middleware::admin_only_middleware;
use crate::services::inventory::InventoryDiscrepancy;
use crate::state::AppState;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/audit", get(audit_inventory))
        .route_layer(middleware::from_fn(admin_only_middleware))
}

async fn audit_inventory(State(state): State<AppState>) -> Json<ApiResponse<Vec<InventoryDiscrepancy>>> {
    let controller = StationController::new(state.service.clone());
    let discrepancies = controller.audit().await;
    let message = if discrepancies.is_empty() {
        "Inventory is consistent".to_string()
    } else {
        format!("{} stations out of sync", discrepancies.len())
    };
    Json(ApiResponse::success_with_message(discrepancies, message))
}
