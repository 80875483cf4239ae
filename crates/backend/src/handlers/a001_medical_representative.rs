use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_medical_representative::aggregate::{
    MedicalRepresentative, MedicalRepresentativeDto,
};
use serde_json::json;

use crate::domain::a001_medical_representative;

/// GET /api/a001/medical-representative
pub async fn list_all() -> Result<Json<Vec<MedicalRepresentative>>, StatusCode> {
    match a001_medical_representative::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list medical representatives: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a001/medical-representative/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<MedicalRepresentative>, StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match a001_medical_representative::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get medical representative {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a001/medical-representative
pub async fn upsert(
    Json(dto): Json<MedicalRepresentativeDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a001_medical_representative::service::update(dto)
            .await
            .map(|_| id),
        None => a001_medical_representative::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save medical representative: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/a001/medical-representative/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match a001_medical_representative::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
