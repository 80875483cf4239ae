use chrono::Utc;
use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentativeId;
use contracts::domain::a003_monthly_tour_plan::aggregate::{
    MonthlyTourPlan, MonthlyTourPlanId, PlanStatus,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_monthly_tour_plan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub mr_id: String,
    pub year: i32,
    pub month: i32,
    pub status: String,
    /// Документ плана (JSON)
    pub plan_json: String,
    pub thread_id: Option<String>,
    pub revision: i32,
    pub provider: String,
    pub model_name: String,
    pub tokens_used: Option<i32>,
    pub augmented_customers: i32,
    pub augmented_areas: i32,
    pub generated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MonthlyTourPlan {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let mr_uuid = Uuid::parse_str(&m.mr_id).unwrap_or_else(|_| Uuid::nil());
        let plan = serde_json::from_str(&m.plan_json).unwrap_or_else(|e| {
            tracing::warn!("Broken plan_json in {}: {}", m.id, e);
            Default::default()
        });

        MonthlyTourPlan {
            base: BaseAggregate::with_metadata(
                MonthlyTourPlanId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            mr_id: MedicalRepresentativeId(mr_uuid),
            year: m.year,
            month: m.month.max(0) as u32,
            status: PlanStatus::from_str(&m.status).unwrap_or(PlanStatus::Draft),
            plan,
            thread_id: m.thread_id,
            revision: m.revision,
            provider: m.provider,
            model_name: m.model_name,
            tokens_used: m.tokens_used,
            augmented_customers: m.augmented_customers,
            augmented_areas: m.augmented_areas,
            generated_at: m.generated_at.unwrap_or_else(Utc::now),
        }
    }
}

fn to_active(aggregate: &MonthlyTourPlan) -> anyhow::Result<ActiveModel> {
    let plan_json = serde_json::to_string(&aggregate.plan)?;
    Ok(ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        mr_id: Set(aggregate.mr_id.value().to_string()),
        year: Set(aggregate.year),
        month: Set(aggregate.month as i32),
        status: Set(aggregate.status.as_str().to_string()),
        plan_json: Set(plan_json),
        thread_id: Set(aggregate.thread_id.clone()),
        revision: Set(aggregate.revision),
        provider: Set(aggregate.provider.clone()),
        model_name: Set(aggregate.model_name.clone()),
        tokens_used: Set(aggregate.tokens_used),
        augmented_customers: Set(aggregate.augmented_customers),
        augmented_areas: Set(aggregate.augmented_areas),
        generated_at: Set(Some(aggregate.generated_at)),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    })
}

/// Список планов, новые периоды первыми
pub async fn list(
    db: &DatabaseConnection,
    mr_id: Option<Uuid>,
) -> anyhow::Result<Vec<MonthlyTourPlan>> {
    let mut query = Entity::find().filter(Column::IsDeleted.eq(false));
    if let Some(mr_id) = mr_id {
        query = query.filter(Column::MrId.eq(mr_id.to_string()));
    }
    let items = query
        .order_by_desc(Column::Year)
        .order_by_desc(Column::Month)
        .order_by_asc(Column::Code)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> anyhow::Result<Option<MonthlyTourPlan>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

/// План представителя за период. Удалённые планы тоже возвращаются,
/// чтобы повторная генерация переиспользовала строку (уникальный индекс)
pub async fn find_by_period(
    db: &DatabaseConnection,
    mr_id: Uuid,
    year: i32,
    month: u32,
) -> anyhow::Result<Option<MonthlyTourPlan>> {
    let result = Entity::find()
        .filter(Column::MrId.eq(mr_id.to_string()))
        .filter(Column::Year.eq(year))
        .filter(Column::Month.eq(month as i32))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(db: &DatabaseConnection, aggregate: &MonthlyTourPlan) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate)?.insert(db).await?;
    Ok(uuid)
}

pub async fn update(db: &DatabaseConnection, aggregate: &MonthlyTourPlan) -> anyhow::Result<()> {
    let mut active = to_active(aggregate)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

/// Вставить или обновить план (по id)
pub async fn upsert(db: &DatabaseConnection, aggregate: &MonthlyTourPlan) -> anyhow::Result<Uuid> {
    let exists = Entity::find_by_id(aggregate.base.id.value().to_string())
        .one(db)
        .await?
        .is_some();
    if exists {
        update(db, aggregate).await?;
        Ok(aggregate.base.id.value())
    } else {
        insert(db, aggregate).await
    }
}

pub async fn soft_delete(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_medical_representative::repository as mr_repository;
    use crate::shared::data::db::test_support::temp_database;
    use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentative;
    use contracts::domain::a003_monthly_tour_plan::plan_document::{
        CustomerVisit, TourPlanDocument,
    };

    #[tokio::test]
    async fn test_upsert_and_find_by_period() {
        let (_dir, db) = temp_database().await;
        let mr = MedicalRepresentative::new_for_insert(
            "MR-1".into(),
            "Amit Patel".into(),
            "Pune".into(),
            None,
            None,
            None,
        );
        mr_repository::insert(&db, &mr).await.unwrap();

        let mut doc = TourPlanDocument::default();
        doc.customer_visit_plan.push(CustomerVisit {
            customer_code: "C1".into(),
            visit_dates: vec!["2025-03-03".into()],
            ..Default::default()
        });
        let mut plan = MonthlyTourPlan::new_for_insert(
            mr.base.id,
            "MR-1",
            "Amit Patel",
            2025,
            3,
            doc,
            Some("thread_1".into()),
            "OpenAI Assistant".into(),
            "gpt-4o-mini".into(),
            Some(900),
        );
        plan.before_write();
        upsert(&db, &plan).await.unwrap();

        plan.approve();
        plan.before_write();
        upsert(&db, &plan).await.unwrap();

        let loaded = find_by_period(&db, mr.base.id.value(), 2025, 3)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.status, PlanStatus::Approved);
        assert_eq!(loaded.plan.total_visits(), 1);
        assert_eq!(loaded.thread_id.as_deref(), Some("thread_1"));
        assert_eq!(loaded.base.metadata.version, 2);

        assert!(find_by_period(&db, mr.base.id.value(), 2025, 4)
            .await
            .unwrap()
            .is_none());

        assert!(soft_delete(&db, plan.base.id.value()).await.unwrap());
        assert!(list(&db, Some(mr.base.id.value())).await.unwrap().is_empty());
        // удалённый план остаётся доступен для переиспользования строки
        let deleted = find_by_period(&db, mr.base.id.value(), 2025, 3)
            .await
            .unwrap()
            .unwrap();
        assert!(deleted.base.metadata.is_deleted);
    }
}
