use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::u501_generate_tour_plan::response::TourPlanResponse;
use thiserror::Error;

use crate::shared::llm::LlmError;

/// Ошибки сценария тур-планов
#[derive(Debug, Error)]
pub enum TourPlanError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("AI assistant error: {0}")]
    Llm(#[from] LlmError),

    #[error("Invalid AI response: {0}")]
    Parse(String),

    #[error("AI response is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl TourPlanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TourPlanError::Validation(_) => StatusCode::BAD_REQUEST,
            TourPlanError::NotFound(_) => StatusCode::NOT_FOUND,
            TourPlanError::Llm(_)
            | TourPlanError::Parse(_)
            | TourPlanError::MissingKeys(_)
            | TourPlanError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TourPlanError {
    fn into_response(self) -> Response {
        let body = TourPlanResponse::<()>::failure(self.to_string());
        (self.status_code(), Json(body)).into_response()
    }
}
