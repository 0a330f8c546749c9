use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, patch, post},
    Json, Router,
};

use crate::controllers::bike_controller::BikeController;
use crate::dto::bike_dto::{ListBikesQuery, RegisterBikeRequest, UpdateBikeStatusRequest};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::admin_only_middleware;
use crate::models::Bike;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_bike_router() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(register_bike))
        .route("/:id/status", patch(update_bike_status))
        .route_layer(middleware::from_fn(admin_only_middleware));

    Router::new()
        .route("/", get(list_bikes))
        .route("/:id", get(get_bike))
        .merge(admin)
}

async fn list_bikes(
    State(state): State<AppState>,
    Query(query): Query<ListBikesQuery>,
) -> Json<ApiResponse<Vec<Bike>>> {
    let controller = BikeController::new(state.service.clone());
    Json(ApiResponse::success(controller.list(query).await))
}

async fn get_bike(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Bike>>, AppError> {
    let controller = BikeController::new(state.service.clone());
    let bike = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(bike)))
}

async fn register_bike(
    State(state): State<AppState>,
    Json(request): Json<RegisterBikeRequest>,
) -> Result<Json<ApiResponse<Bike>>, AppError> {
    let controller = BikeController::new(state.service.clone());
    let response = controller.register(request).await?;
    Ok(Json(response))
}

async fn update_bike_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBikeStatusRequest>,
) -> Result<Json<ApiResponse<Bike>>, AppError> {
    let controller = BikeController::new(state.service.clone());
    let response = controller.update_status(id, request).await?;
    Ok(Json(response))
}
