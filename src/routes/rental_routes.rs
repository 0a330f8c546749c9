use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::rental_controller::RentalController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::rental_dto::{CreateRentalRequest, ReturnRentalRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::Rental;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_rental_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_rental))
        .route("/", get(rental_history))
        .route("/current", get(current_rental))
        .route("/:id/return", post(return_rental))
}

async fn create_rental(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateRentalRequest>,
) -> Result<Json<ApiResponse<Rental>>, AppError> {
    let controller = RentalController::new(state.service.clone());
    let response = controller.create(user, request).await?;
    Ok(Json(response))
}

async fn return_rental(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<ReturnRentalRequest>,
) -> Result<Json<ApiResponse<Rental>>, AppError> {
    let controller = RentalController::new(state.service.clone());
    let response = controller.return_bike(user, id, request).await?;
    Ok(Json(response))
}

async fn rental_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<Vec<Rental>>> {
    let controller = RentalController::new(state.service.clone());
    Json(ApiResponse::success(controller.history(user).await))
}

async fn current_rental(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<Option<Rental>>> {
    let controller = RentalController::new(state.service.clone());
    Json(controller.current(user).await)
}
