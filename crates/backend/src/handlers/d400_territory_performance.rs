use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d400_territory_performance::dto::{
    TerritoryPerformanceRequest, TerritoryPerformanceResponse,
};

use crate::dashboards::d400_territory_performance::service;

/// GET /api/d400/territory-performance?mr_id=&year=&month=
pub async fn get_territory_performance(
    Query(request): Query<TerritoryPerformanceRequest>,
) -> Result<Json<TerritoryPerformanceResponse>, StatusCode> {
    if !is_valid_request(&request) {
        tracing::error!(
            "Invalid territory performance request: mr_id={} period={}-{}",
            request.mr_id,
            request.year,
            request.month
        );
        return Err(StatusCode::BAD_REQUEST);
    }

    match service::get_territory_performance(request).await {
        Ok(Some(response)) => Ok(Json(response)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to build territory performance: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Те же границы периода, что и у тур-планов
fn is_valid_request(request: &TerritoryPerformanceRequest) -> bool {
    (1..=12).contains(&request.month)
        && (2000..=2100).contains(&request.year)
        && uuid::Uuid::parse_str(&request.mr_id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(year: i32, month: u32) -> TerritoryPerformanceRequest {
        TerritoryPerformanceRequest {
            mr_id: "7f1c1f1e-0000-4000-8000-000000000001".into(),
            year,
            month,
        }
    }

    #[test]
    fn test_period_bounds() {
        assert!(is_valid_request(&request(2025, 3)));
        assert!(is_valid_request(&request(2000, 1)));
        assert!(is_valid_request(&request(2100, 12)));
        assert!(!is_valid_request(&request(1999, 3)));
        assert!(!is_valid_request(&request(2101, 3)));
        assert!(!is_valid_request(&request(2025, 0)));
        assert!(!is_valid_request(&request(2025, 13)));

        let mut bad_id = request(2025, 3);
        bad_id.mr_id = "MR-DEMO".into();
        assert!(!is_valid_request(&bad_id));
    }

    #[tokio::test]
    async fn test_out_of_range_year_is_bad_request() {
        let result = get_territory_performance(Query(request(1900, 3))).await;
        assert_eq!(result.err(), Some(StatusCode::BAD_REQUEST));
    }
}
