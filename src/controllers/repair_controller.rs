use crate::dto::common_dto::ApiResponse;
use crate::dto::repair_dto::{AdvanceRepairRequest, ListRepairsQuery, ReportRepairRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::{NewRepair, Repair};
use crate::services::BikeShareService;
use crate::utils::errors::{forbidden_error, AppError};
use crate::utils::validation::validated;

pub struct RepairController {
    service: BikeShareService,
}

impl RepairController {
    pub fn new(service: BikeShareService) -> Self {
        Self { service }
    }

    pub async fn report(
        &self,
        user: AuthenticatedUser,
        request: ReportRepairRequest,
    ) -> Result<ApiResponse<Repair>, AppError> {
        let request = validated(request)?;
        let repair = self
            .service
            .report_repair(NewRepair {
                reporter_id: user.user_id,
                target_type: request.target_type,
                target_id: request.target_id,
                category: request.category.trim().to_string(),
                description: request.description.trim().to_string(),
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            repair,
            "Repair reported".to_string(),
        ))
    }

    pub async fn mine(&self, user: AuthenticatedUser) -> Vec<Repair> {
        self.service.list_user_repairs(user.user_id).await
    }

    pub async fn list(&self, query: ListRepairsQuery) -> Vec<Repair> {
        self.service.list_repairs(query.status).await
    }

    /// El reportante o un administrador
    pub async fn get_by_id(&self, user: AuthenticatedUser, id: i64) -> Result<Repair, AppError> {
        let repair = self.service.get_repair(id).await?;
        if repair.reporter_id != user.user_id && !user.is_admin() {
            return Err(forbidden_error("view repair", "report belongs to another user"));
        }
        Ok(repair)
    }

    pub async fn advance(
        &self,
        id: i64,
        request: AdvanceRepairRequest,
    ) -> Result<ApiResponse<Repair>, AppError> {
        let request = validated(request)?;
        let repair = self
            .service
            .advance_repair(id, request.action, request.admin_note)
            .await?;

        let message = format!("Repair {} is now {}", repair.id, repair.status.as_str());
        Ok(ApiResponse::success_with_message(repair, message))
    }
}
