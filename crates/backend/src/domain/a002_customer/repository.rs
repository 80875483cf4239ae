use chrono::Utc;
use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentativeId;
use contracts::domain::a002_customer::aggregate::{Customer, CustomerId, CustomerTier};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub mr_id: String,
    pub area_name: String,
    pub customer_type: String,
    pub specialty: Option<String>,
    pub tier: String,
    pub sales_last_3m: f64,
    pub last_visit_date: Option<String>,
    pub visit_frequency: Option<i32>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let mr_uuid = Uuid::parse_str(&m.mr_id).unwrap_or_else(|_| Uuid::nil());

        Customer {
            base: BaseAggregate::with_metadata(
                CustomerId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            mr_id: MedicalRepresentativeId(mr_uuid),
            area_name: m.area_name,
            customer_type: m.customer_type,
            specialty: m.specialty,
            tier: CustomerTier::from_str(&m.tier).unwrap_or(CustomerTier::Unclassified),
            sales_last_3m: m.sales_last_3m,
            last_visit_date: m.last_visit_date,
            visit_frequency: m.visit_frequency,
        }
    }
}

fn to_active(aggregate: &Customer) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        mr_id: Set(aggregate.mr_id.value().to_string()),
        area_name: Set(aggregate.area_name.clone()),
        customer_type: Set(aggregate.customer_type.clone()),
        specialty: Set(aggregate.specialty.clone()),
        tier: Set(aggregate.tier.as_str().to_string()),
        sales_last_3m: Set(aggregate.sales_last_3m),
        last_visit_date: Set(aggregate.last_visit_date.clone()),
        visit_frequency: Set(aggregate.visit_frequency),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<Customer>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::AreaName)
        .order_by_asc(Column::Code)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Клиенты одного представителя
pub async fn list_by_mr(db: &DatabaseConnection, mr_id: Uuid) -> anyhow::Result<Vec<Customer>> {
    let items = Entity::find()
        .filter(Column::MrId.eq(mr_id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::AreaName)
        .order_by_asc(Column::Code)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<Customer>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(db: &DatabaseConnection, aggregate: &Customer) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate).insert(db).await?;
    Ok(uuid)
}

pub async fn update(db: &DatabaseConnection, aggregate: &Customer) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn soft_delete(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
