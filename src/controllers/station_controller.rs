use crate::dto::common_dto::ApiResponse;
use crate::dto::station_dto::{
    CreateStationRequest, NearestPurpose, NearestStationQuery, UpdateStationStatusRequest,
};
use crate::models::{Station, StationStatusSummary};
use crate::services::geo_math::Coordinate;
use crate::services::inventory::InventoryDiscrepancy;
use crate::services::BikeShareService;
use crate::utils::errors::AppError;
use crate::utils::validation::validated;

pub struct StationController {
    service: BikeShareService,
}

impl StationController {
    pub fn new(service: BikeShareService) -> Self {
        Self { service }
    }

    pub async fn list(&self) -> Vec<Station> {
        self.service.list_stations().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Station, AppError> {
        self.service.get_station(id).await
    }

    pub async fn create(&self, request: CreateStationRequest) -> Result<ApiResponse<Station>, AppError> {
        let request = validated(request)?;
        let station = self.service.register_station(request.into()).await?;

        Ok(ApiResponse::success_with_message(
            station,
            "Station registered".to_string(),
        ))
    }

    pub async fn update_status(
        &self,
        id: i64,
        request: UpdateStationStatusRequest,
    ) -> Result<ApiResponse<Station>, AppError> {
        let station = self.service.set_station_status(id, request.status).await?;
        let message = format!("Station is now {}", station.status.as_str());
        Ok(ApiResponse::success_with_message(station, message))
    }

    pub async fn nearest(&self, query: NearestStationQuery) -> Result<Station, AppError> {
        let query = validated(query)?;
        let coordinate = Coordinate::checked(query.lat, query.lng)?;
        self.service
            .find_nearest_station(coordinate, query.purpose == NearestPurpose::Return)
            .await
    }

    pub async fn summary(&self) -> StationStatusSummary {
        self.service.status_summary().await
    }

    pub async fn audit(&self) -> Vec<InventoryDiscrepancy> {
        self.service.audit().await
    }
}
