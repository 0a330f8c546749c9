use std::sync::Arc;

use futures::future;
use tracing::debug;

use crate::dto::common_dto::LocationInput;
use crate::dto::route_dto::PlanRouteRequest;
use crate::models::RouteResult;
use crate::services::geo_math::Coordinate;
use crate::services::{BikeShareService, Geocoder};
use crate::utils::errors::{bad_request_error, AppError};

pub struct RouteController {
    service: BikeShareService,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl RouteController {
    pub fn new(service: BikeShareService, geocoder: Option<Arc<dyn Geocoder>>) -> Self {
        Self { service, geocoder }
    }

    pub async fn plan(&self, request: PlanRouteRequest) -> Result<RouteResult, AppError> {
        // Ambos extremos se resuelven a la vez
        let (origin, destination) = future::try_join(
            self.resolve(&request.origin),
            self.resolve(&request.destination),
        )
        .await?;

        self.service.plan_route(origin, destination).await
    }

    async fn resolve(&self, input: &LocationInput) -> Result<Coordinate, AppError> {
        match input {
            LocationInput::Coordinate { latitude, longitude } => {
                Ok(Coordinate::checked(*latitude, *longitude)?)
            }
            LocationInput::Address { address } => {
                if address.trim().is_empty() {
                    return Err(bad_request_error("Address must not be empty"));
                }
                let geocoder = self.geocoder.as_ref().ok_or_else(|| {
                    AppError::ServiceUnavailable(
                        "Address lookup is not configured; send coordinates instead".to_string(),
                    )
                })?;
                let resolved = geocoder.geocode(address.trim()).await?;
                debug!(
                    "📍 '{}' resolved to {} ({:.5}, {:.5})",
                    address.trim(),
                    resolved.formatted_address.as_deref().unwrap_or("unnamed place"),
                    resolved.coordinate.lat,
                    resolved.coordinate.lng
                );
                Ok(resolved.coordinate)
            }
        }
    }
}
