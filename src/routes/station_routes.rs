use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, patch, post},
    Json, Router,
};

use crate::controllers::station_controller::StationController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::station_dto::{CreateStationRequest, NearestStationQuery, UpdateStationStatusRequest};
use crate::middleware::admin_only_middleware;
use crate::models::{Station, StationStatusSummary};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_station_router() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_station))
        .route("/:id/status", patch(update_station_status))
        .route_layer(middleware::from_fn(admin_only_middleware));

    Router::new()
        .route("/", get(list_stations))
        .route("/nearest", get(nearest_station))
        .route("/summary", get(station_summary))
        .route("/:id", get(get_station))
        .merge(admin)
}

async fn list_stations(State(state): State<AppState>) -> Json<ApiResponse<Vec<Station>>> {
    let controller = StationController::new(state.service.clone());
    Json(ApiResponse::success(controller.list().await))
}

async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Station>>, AppError> {
    let controller = StationController::new(state.service.clone());
    let station = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(station)))
}

async fn create_station(
    State(state): State<AppState>,
    Json(request): Json<CreateStationRequest>,
) -> Result<Json<ApiResponse<Station>>, AppError> {
    let controller = StationController::new(state.service.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn update_station_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStationStatusRequest>,
) -> Result<Json<ApiResponse<Station>>, AppError> {
    let controller = StationController::new(state.service.clone());
    let response = controller.update_status(id, request).await?;
    Ok(Json(response))
}

async fn nearest_station(
    State(state): State<AppState>,
    Query(query): Query<NearestStationQuery>,
) -> Result<Json<ApiResponse<Station>>, AppError> {
    let controller = StationController::new(state.service.clone());
    let station = controller.nearest(query).await?;
    Ok(Json(ApiResponse::success(station)))
}

async fn station_summary(State(state): State<AppState>) -> Json<ApiResponse<StationStatusSummary>> {
    let controller = StationController::new(state.service.clone());
    Json(ApiResponse::success(controller.summary().await))
}
