use crate::dto::common_dto::ApiResponse;
use crate::dto::rental_dto::{CreateRentalRequest, ReturnRentalRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::Rental;
use crate::services::BikeShareService;
use crate::utils::errors::{forbidden_error, AppError};
use crate::utils::validation::validated;

pub struct RentalController {
    service: BikeShareService,
}

impl RentalController {
    pub fn new(service: BikeShareService) -> Self {
        Self { service }
    }

    pub async fn create(
        &self,
        user: AuthenticatedUser,
        request: CreateRentalRequest,
    ) -> Result<ApiResponse<Rental>, AppError> {
        let request = validated(request)?;
        let rental = self
            .service
            .create_rental(user.user_id, request.station_id)
            .await?;

        Ok(ApiResponse::success_with_message(
            rental,
            format!("Bike rented from station {}", request.station_id),
        ))
    }

    /// Solo el titular del alquiler o un administrador pueden devolverlo
    pub async fn return_bike(
        &self,
        user: AuthenticatedUser,
        rental_id: i64,
        request: ReturnRentalRequest,
    ) -> Result<ApiResponse<Rental>, AppError> {
        let request = validated(request)?;

        let rental = self.service.get_rental(rental_id).await?;
        if rental.user_id != user.user_id && !user.is_admin() {
            return Err(forbidden_error("return rental", "rental belongs to another user"));
        }

        let rental = self
            .service
            .return_rental(rental_id, request.end_station_id, request.metrics())
            .await?;

        Ok(ApiResponse::success_with_message(
            rental,
            format!("Bike returned to station {}", request.end_station_id),
        ))
    }

    pub async fn history(&self, user: AuthenticatedUser) -> Vec<Rental> {
        self.service.user_rentals(user.user_id).await
    }

    pub async fn current(&self, user: AuthenticatedUser) -> ApiResponse<Option<Rental>> {
        match self.service.current_rental(user.user_id).await {
            Some(rental) => ApiResponse::success(Some(rental)),
            None => ApiResponse::success_with_message(None, "No active rental".to_string()),
        }
    }
}
