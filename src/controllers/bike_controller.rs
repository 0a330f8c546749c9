use crate::dto::bike_dto::{ListBikesQuery, RegisterBikeRequest, UpdateBikeStatusRequest};
use crate::dto::common_dto::ApiResponse;
use crate::models::Bike;
use crate::services::BikeShareService;
use crate::utils::errors::AppError;
use crate::utils::validation::validated;

pub struct BikeController {
    service: BikeShareService,
}

impl BikeController {
    pub fn new(service: BikeShareService) -> Self {
        Self { service }
    }

    pub async fn list(&self, query: ListBikesQuery) -> Vec<Bike> {
        self.service.list_bikes(query.station_id).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Bike, AppError> {
        self.service.get_bike(id).await
    }

    pub async fn register(&self, request: RegisterBikeRequest) -> Result<ApiResponse<Bike>, AppError> {
        let request = validated(request)?;
        let bike = self.service.register_bike(request.station_id).await?;

        Ok(ApiResponse::success_with_message(
            bike,
            format!("Bike docked at station {}", request.station_id),
        ))
    }

    pub async fn update_status(
        &self,
        id: i64,
        request: UpdateBikeStatusRequest,
    ) -> Result<ApiResponse<Bike>, AppError> {
        let bike = self.service.set_bike_status(id, request.status).await?;
        Ok(ApiResponse::success_with_message(
            bike,
            format!("Bike is now {}", request.status.as_str()),
        ))
    }
}
