use super::repository;
use crate::shared::data::db::get_connection;
use contracts::domain::a003_monthly_tour_plan::aggregate::MonthlyTourPlan;
use uuid::Uuid;

/// Получение списка планов (опционально по представителю)
pub async fn list(mr_id: Option<Uuid>) -> anyhow::Result<Vec<MonthlyTourPlan>> {
    repository::list(get_connection(), mr_id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<MonthlyTourPlan>> {
    repository::get_by_id(get_connection(), id).await
}

/// Мягкое удаление плана
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(get_connection(), id).await
}
