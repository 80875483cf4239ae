use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_monthly_tour_plan::aggregate::MonthlyTourPlan;
use serde::Deserialize;

use crate::domain::a003_monthly_tour_plan;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub mr_id: Option<String>,
}

/// GET /api/a003/monthly-tour-plan?mr_id=
pub async fn list(
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MonthlyTourPlan>>, StatusCode> {
    let mr_id = match params.mr_id.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match uuid::Uuid::parse_str(raw) {
            Ok(uuid) => Some(uuid),
            Err(_) => return Err(StatusCode::BAD_REQUEST),
        },
        None => None,
    };
    match a003_monthly_tour_plan::service::list(mr_id).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list tour plans: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a003/monthly-tour-plan/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<MonthlyTourPlan>, StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match a003_monthly_tour_plan::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/a003/monthly-tour-plan/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match a003_monthly_tour_plan::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
