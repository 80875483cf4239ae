use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Medical representative handlers
        .route(
            "/api/a001/medical-representative",
            get(handlers::a001_medical_representative::list_all)
                .post(handlers::a001_medical_representative::upsert),
        )
        .route(
            "/api/a001/medical-representative/:id",
            get(handlers::a001_medical_representative::get_by_id)
                .delete(handlers::a001_medical_representative::delete),
        )
        // A002 Customer handlers
        .route(
            "/api/a002/customer",
            get(handlers::a002_customer::list).post(handlers::a002_customer::upsert),
        )
        .route(
            "/api/a002/customer/testdata",
            post(handlers::a002_customer::insert_test_data),
        )
        .route(
            "/api/a002/customer/:id",
            get(handlers::a002_customer::get_by_id).delete(handlers::a002_customer::delete),
        )
        // A003 Monthly tour plan handlers
        .route(
            "/api/a003/monthly-tour-plan",
            get(handlers::a003_monthly_tour_plan::list),
        )
        .route(
            "/api/a003/monthly-tour-plan/:id",
            get(handlers::a003_monthly_tour_plan::get_by_id)
                .delete(handlers::a003_monthly_tour_plan::delete),
        )
        // P900 Customer tiers
        .route(
            "/api/p900/customer-tiers",
            get(handlers::p900_customer_tiers::list),
        )
        // D400 Territory performance
        .route(
            "/api/d400/territory-performance",
            get(handlers::d400_territory_performance::get_territory_performance),
        )
        // ========================================
        // USECASES
        // ========================================
        .route("/api/u501/tour-plan", post(handlers::u501_tour_plan::tour_plan))
        .route(
            "/api/u501/assistant/test",
            get(handlers::u501_tour_plan::test_assistant),
        )
}
