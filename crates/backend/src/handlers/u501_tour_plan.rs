use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::u501_generate_tour_plan::request::TourPlanRequest;
use contracts::usecases::u501_generate_tour_plan::response::TourPlanResponse;
use once_cell::sync::OnceCell;
use serde_json::json;

use crate::shared::config::get_config;
use crate::shared::data::db::get_connection;
use crate::usecases::u501_generate_tour_plan::{TourPlanError, TourPlanExecutor};

// ============================================================================
// UseCase u501: Generate tour plan
// ============================================================================

static TOUR_PLAN_EXECUTOR: OnceCell<TourPlanExecutor> = OnceCell::new();

fn executor() -> Result<&'static TourPlanExecutor, TourPlanError> {
    TOUR_PLAN_EXECUTOR
        .get_or_try_init(|| {
            let config = get_config()?;
            Ok::<_, anyhow::Error>(TourPlanExecutor::from_config(
                get_connection().clone(),
                config,
            ))
        })
        .map_err(TourPlanError::Database)
}

/// POST /api/u501/tour-plan
///
/// Некорректное тело запроса (неизвестный action, пропущенные поля,
/// битый JSON) отдаётся тем же конвертом с 400.
pub async fn tour_plan(payload: Result<Json<TourPlanRequest>, JsonRejection>) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let e = TourPlanError::Validation(rejection.body_text());
            tracing::error!("Tour plan request rejected: {}", e);
            return e.into_response();
        }
    };
    let action = request.action_name();
    let result = match executor() {
        Ok(executor) => executor.execute(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => Json(TourPlanResponse::ok(outcome)).into_response(),
        Err(e) => {
            tracing::error!("Tour plan action {} failed: {}", action, e);
            e.into_response()
        }
    }
}

/// GET /api/u501/assistant/test
pub async fn test_assistant() -> Response {
    let result = match executor() {
        Ok(executor) => executor.test_connection().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(provider) => Json(TourPlanResponse::ok(json!({ "provider": provider }))).into_response(),
        Err(e) => {
            tracing::error!("Assistant connection test failed: {}", e);
            e.into_response()
        }
    }
}
