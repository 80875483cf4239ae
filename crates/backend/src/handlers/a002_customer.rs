use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a002_customer::aggregate::{Customer, CustomerDto};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a002_customer;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub mr_id: Option<String>,
}

/// GET /api/a002/customer?mr_id=
pub async fn list(Query(params): Query<ListParams>) -> Result<Json<Vec<Customer>>, StatusCode> {
    let mr_id = match params.mr_id.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match uuid::Uuid::parse_str(raw) {
            Ok(uuid) => Some(uuid),
            Err(_) => return Err(StatusCode::BAD_REQUEST),
        },
        None => None,
    };
    match a002_customer::service::list(mr_id).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list customers: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a002/customer/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Customer>, StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match a002_customer::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/a002/customer
pub async fn upsert(Json(dto): Json<CustomerDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a002_customer::service::update(dto).await.map(|_| id),
        None => a002_customer::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save customer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/a002/customer/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match a002_customer::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/a002/customer/testdata
pub async fn insert_test_data() -> Result<Json<serde_json::Value>, StatusCode> {
    match a002_customer::service::insert_test_data().await {
        Ok(mr_id) => Ok(Json(json!({"mr_id": mr_id.to_string()}))),
        Err(e) => {
            tracing::error!("Failed to insert demo territory: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
