use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::route_controller::RouteController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::route_dto::PlanRouteRequest;
use crate::models::RouteResult;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_router() -> Router<AppState> {
    Router::new().route("/plan", post(plan_route))
}

async fn plan_route(
    State(state): State<AppState>,
    Json(request): Json<PlanRouteRequest>,
) -> Result<Json<ApiResponse<RouteResult>>, AppError> {
    let controller = RouteController::new(state.service.clone(), state.geocoder.clone());
    let route = controller.plan(request).await?;
    Ok(Json(ApiResponse::success(route)))
}
