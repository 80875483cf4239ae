use chrono::Utc;
use contracts::domain::a001_medical_representative::aggregate::{
    MedicalRepresentative, MedicalRepresentativeId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_medical_representative")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub headquarter: String,
    pub region: Option<String>,
    pub manager_name: Option<String>,
    pub email: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MedicalRepresentative {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        MedicalRepresentative {
            base: BaseAggregate::with_metadata(
                MedicalRepresentativeId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            headquarter: m.headquarter,
            region: m.region,
            manager_name: m.manager_name,
            email: m.email,
        }
    }
}

fn to_active(aggregate: &MedicalRepresentative) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        headquarter: Set(aggregate.headquarter.clone()),
        region: Set(aggregate.region.clone()),
        manager_name: Set(aggregate.manager_name.clone()),
        email: Set(aggregate.email.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<MedicalRepresentative>> {
    let mut items: Vec<MedicalRepresentative> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    items.sort_by(|a, b| {
        a.base
            .description
            .to_lowercase()
            .cmp(&b.base.description.to_lowercase())
    });
    Ok(items)
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> anyhow::Result<Option<MedicalRepresentative>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn get_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> anyhow::Result<Option<MedicalRepresentative>> {
    let result = Entity::find()
        .filter(Column::Code.eq(code))
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(db: &DatabaseConnection, aggregate: &MedicalRepresentative) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate).insert(db).await?;
    Ok(uuid)
}

pub async fn update(db: &DatabaseConnection, aggregate: &MedicalRepresentative) -> anyhow::Result<()> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_support::temp_database;

    fn sample(code: &str, name: &str) -> MedicalRepresentative {
        MedicalRepresentative::new_for_insert(
            code.into(),
            name.into(),
            "Pune".into(),
            Some("West".into()),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_insert_list_and_soft_delete() {
        let (_dir, db) = temp_database().await;

        let b = sample("MR-2", "Zoya Khan");
        let a = sample("MR-1", "Amit Patel");
        insert(&db, &b).await.unwrap();
        let id_a = insert(&db, &a).await.unwrap();

        let all = list_all(&db).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].base.description, "Amit Patel");

        let by_code = get_by_code(&db, "MR-2").await.unwrap().unwrap();
        assert_eq!(by_code.headquarter, "Pune");

        assert!(soft_delete(&db, id_a).await.unwrap());
        assert!(get_by_id(&db, id_a).await.unwrap().is_none());
        assert_eq!(list_all(&db).await.unwrap().len(), 1);
    }
}
