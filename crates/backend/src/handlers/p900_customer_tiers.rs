use axum::{extract::Query, http::StatusCode, Json};
use contracts::domain::a002_customer::aggregate::CustomerTier;
use contracts::projections::p900_customer_tiers::dto::{CustomerTierListRequest, CustomerTierRow};

use crate::projections::p900_customer_tiers::service;

/// GET /api/p900/customer-tiers?mr_id=&area_name=&tier=
pub async fn list(
    Query(request): Query<CustomerTierListRequest>,
) -> Result<Json<Vec<CustomerTierRow>>, StatusCode> {
    if uuid::Uuid::parse_str(&request.mr_id).is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if let Some(tier) = request.tier.as_deref() {
        if CustomerTier::from_str(tier).is_err() {
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    match service::list(request).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            tracing::error!("Failed to list customer tiers: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
