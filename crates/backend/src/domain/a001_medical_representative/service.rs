use super::repository;
use crate::shared::data::db::get_connection;
use contracts::domain::a001_medical_representative::aggregate::{
    MedicalRepresentative, MedicalRepresentativeDto,
};
use uuid::Uuid;

/// Создание нового представителя
pub async fn create(dto: MedicalRepresentativeDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("MR-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = MedicalRepresentative::new_for_insert(
        code,
        dto.description,
        dto.headquarter,
        dto.region,
        dto.manager_name,
        dto.email,
    );
    aggregate.base.comment = dto.comment;

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Before write
    aggregate.before_write();

    repository::insert(get_connection(), &aggregate).await
}

/// Обновление существующего представителя
pub async fn update(dto: MedicalRepresentativeDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let db = get_connection();
    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.update(&dto);

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::update(db, &aggregate).await
}

/// Мягкое удаление
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(get_connection(), id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<MedicalRepresentative>> {
    repository::get_by_id(get_connection(), id).await
}

pub async fn list_all() -> anyhow::Result<Vec<MedicalRepresentative>> {
    repository::list_all(get_connection()).await
}
