use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::repair_controller::RepairController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::repair_dto::{AdvanceRepairRequest, ListRepairsQuery, ReportRepairRequest};
use crate::middleware::{admin_only_middleware, AuthenticatedUser};
use crate::models::Repair;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_repair_router() -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(list_repairs))
        .route("/:id/advance", post(advance_repair))
        .route_layer(middleware::from_fn(admin_only_middleware));

    Router::new()
        .route("/", post(report_repair))
        .route("/mine", get(my_repairs))
        .route("/:id", get(get_repair))
        .merge(admin)
}

async fn report_repair(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ReportRepairRequest>,
) -> Result<Json<ApiResponse<Repair>>, AppError> {
    let controller = RepairController::new(state.service.clone());
    let response = controller.report(user, request).await?;
    Ok(Json(response))
}

async fn my_repairs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<Vec<Repair>>> {
    let controller = RepairController::new(state.service.clone());
    Json(ApiResponse::success(controller.mine(user).await))
}

async fn list_repairs(
    State(state): State<AppState>,
    Query(query): Query<ListRepairsQuery>,
) -> Json<ApiResponse<Vec<Repair>>> {
    let controller = RepairController::new(state.service.clone());
    Json(ApiResponse::success(controller.list(query).await))
}

async fn get_repair(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Repair>>, AppError> {
    let controller = RepairController::new(state.service.clone());
    let repair = controller.get_by_id(user, id).await?;
    Ok(Json(ApiResponse::success(repair)))
}

async fn advance_repair(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AdvanceRepairRequest>,
) -> Result<Json<ApiResponse<Repair>>, AppError> {
    let controller = RepairController::new(state.service.clone());
    let response = controller.advance(id, request).await?;
    Ok(Json(response))
}
