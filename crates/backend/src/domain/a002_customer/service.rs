use super::repository;
use crate::domain::a001_medical_representative::repository as mr_repository;
use crate::shared::data::db::get_connection;
use contracts::domain::a001_medical_representative::aggregate::{
    MedicalRepresentative, MedicalRepresentativeId,
};
use contracts::domain::a002_customer::aggregate::{Customer, CustomerDto, CustomerTier};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

fn parse_mr_id(value: &str) -> anyhow::Result<MedicalRepresentativeId> {
    Uuid::parse_str(value)
        .map(MedicalRepresentativeId::new)
        .map_err(|e| anyhow::anyhow!("Invalid mr_id: {}", e))
}

/// Создание нового клиента
pub async fn create(dto: CustomerDto) -> anyhow::Result<Uuid> {
    insert_customer(get_connection(), dto).await
}

/// Обновление существующего клиента
pub async fn update(dto: CustomerDto) -> anyhow::Result<()> {
    update_customer(get_connection(), dto).await
}

pub async fn insert_customer(db: &DatabaseConnection, dto: CustomerDto) -> anyhow::Result<Uuid> {
    let mr_id = parse_mr_id(&dto.mr_id)?;
    mr_repository::get_by_id(db, mr_id.value())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Medical representative not found: {}", dto.mr_id))?;

    let tier = CustomerTier::from_str(&dto.tier).map_err(|e| anyhow::anyhow!(e))?;
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("CUST-{}", &Uuid::new_v4().simple().to_string()[..8]));

    let mut aggregate = Customer::new_for_insert(
        code,
        dto.description.clone(),
        mr_id,
        dto.area_name.clone(),
        dto.customer_type.clone(),
        dto.specialty.clone(),
        tier,
        dto.sales_last_3m,
    );
    aggregate.base.comment = dto.comment;
    aggregate.last_visit_date = dto.last_visit_date;
    aggregate.visit_frequency = dto.visit_frequency;

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::insert(db, &aggregate).await
}

pub async fn update_customer(db: &DatabaseConnection, dto: CustomerDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    let mr_id = parse_mr_id(&dto.mr_id)?;
    mr_repository::get_by_id(db, mr_id.value())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Medical representative not found: {}", dto.mr_id))?;
    let tier = CustomerTier::from_str(&dto.tier).map_err(|e| anyhow::anyhow!(e))?;
    aggregate.update(&dto, mr_id, tier);

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::update(db, &aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(get_connection(), id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Customer>> {
    repository::get_by_id(get_connection(), id).await
}

/// Список клиентов, опционально по одному представителю
pub async fn list(mr_id: Option<Uuid>) -> anyhow::Result<Vec<Customer>> {
    let db = get_connection();
    match mr_id {
        Some(mr_id) => repository::list_by_mr(db, mr_id).await,
        None => repository::list_all(db).await,
    }
}

/// Вставка тестовых данных: демо-представитель и его территория
pub async fn insert_test_data() -> anyhow::Result<Uuid> {
    seed_demo_territory(get_connection()).await
}

const DEMO_MR_CODE: &str = "MR-DEMO";

/// (code, name, area, type, specialty, tier, sales)
const DEMO_CUSTOMERS: &[(&str, &str, &str, &str, &str, &str, f64)] = &[
    ("C001", "Dr. Anil Mehta", "Andheri", "Doctor", "Cardiology", "Performer", 185_000.0),
    ("C002", "Dr. Priya Nair", "Andheri", "Doctor", "Diabetology", "Performer", 142_500.0),
    ("C003", "Lifeline Chemists", "Andheri", "Chemist", "", "Developer", 64_000.0),
    ("C004", "Dr. Sanjay Rao", "Andheri", "Doctor", "General Physician", "Prospect", 12_000.0),
    ("C005", "Dr. Kavita Desai", "Bandra", "Doctor", "Cardiology", "Performer", 210_000.0),
    ("C006", "Dr. Farhan Ali", "Bandra", "Doctor", "Endocrinology", "Developer", 78_250.0),
    ("C007", "Sea View Pharmacy", "Bandra", "Chemist", "", "Developer", 55_400.0),
    ("C008", "Dr. Neha Kapoor", "Bandra", "Doctor", "Pediatrics", "Prospect", 9_800.0),
    ("C009", "Dr. Ramesh Iyer", "Dadar", "Doctor", "Cardiology", "Performer", 167_300.0),
    ("C010", "Dr. Sunita Joshi", "Dadar", "Doctor", "Gynecology", "Developer", 48_900.0),
    ("C011", "Shivaji Medicals", "Dadar", "Chemist", "", "Prospect", 15_600.0),
    ("C012", "Dr. Vikram Shah", "Powai", "Doctor", "Orthopedics", "Developer", 71_000.0),
    ("C013", "Hiranandani Clinic", "Powai", "Hospital", "Multispecialty", "Performer", 250_000.0),
    ("C014", "Dr. Meera Pillai", "Powai", "Doctor", "Dermatology", "", 0.0),
];

/// Создать демо-территорию, если её ещё нет; возвращает id представителя
pub async fn seed_demo_territory(db: &DatabaseConnection) -> anyhow::Result<Uuid> {
    if let Some(existing) = mr_repository::get_by_code(db, DEMO_MR_CODE).await? {
        tracing::info!("Demo territory already present: {}", existing.to_string_id());
        return Ok(existing.base.id.value());
    }

    let mut mr = MedicalRepresentative::new_for_insert(
        DEMO_MR_CODE.into(),
        "Rahul Sharma".into(),
        "Mumbai".into(),
        Some("West".into()),
        Some("Anita Kulkarni".into()),
        Some("rahul.sharma@example.com".into()),
    );
    mr.before_write();
    let mr_uuid = mr_repository::insert(db, &mr).await?;

    for (code, name, area, kind, specialty, tier, sales) in DEMO_CUSTOMERS {
        let tier = CustomerTier::from_str(tier).map_err(|e| anyhow::anyhow!(e))?;
        let specialty = if specialty.is_empty() {
            None
        } else {
            Some(specialty.to_string())
        };
        let mut customer = Customer::new_for_insert(
            code.to_string(),
            name.to_string(),
            mr.base.id,
            area.to_string(),
            kind.to_string(),
            specialty,
            tier,
            *sales,
        );
        if *code == "C013" {
            // крупный стационар: еженедельно плюс дополнительный визит
            customer.visit_frequency = Some(5);
        }
        customer
            .validate()
            .map_err(|e| anyhow::anyhow!("Validation failed for {}: {}", code, e))?;
        customer.before_write();
        repository::insert(db, &customer).await?;
    }

    tracing::info!(
        "Demo territory created: {} with {} customers",
        DEMO_MR_CODE,
        DEMO_CUSTOMERS.len()
    );
    Ok(mr_uuid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_support::temp_database;

    #[tokio::test]
    async fn test_seed_demo_territory_is_idempotent() {
        let (_dir, db) = temp_database().await;

        let first = seed_demo_territory(&db).await.unwrap();
        let second = seed_demo_territory(&db).await.unwrap();
        assert_eq!(first, second);

        let customers = repository::list_by_mr(&db, first).await.unwrap();
        assert_eq!(customers.len(), DEMO_CUSTOMERS.len());
        assert!(customers
            .iter()
            .any(|c| c.tier == CustomerTier::Unclassified));
    }

    fn dto(mr_id: &str) -> CustomerDto {
        CustomerDto {
            id: None,
            code: Some("C900".into()),
            description: "Dr. Rohan Gupta".into(),
            comment: None,
            mr_id: mr_id.to_string(),
            area_name: "Kothrud".into(),
            customer_type: "Doctor".into(),
            specialty: Some("ENT".into()),
            tier: "Prospect".into(),
            sales_last_3m: 5_000.0,
            last_visit_date: None,
            visit_frequency: None,
        }
    }

    #[tokio::test]
    async fn test_update_customer_round_trip() {
        let (_dir, db) = temp_database().await;
        let mr_id = seed_demo_territory(&db).await.unwrap().to_string();

        let id = insert_customer(&db, dto(&mr_id)).await.unwrap();

        let mut changed = dto(&mr_id);
        changed.id = Some(id.to_string());
        changed.code = None;
        changed.area_name = "Aundh".into();
        changed.tier = "performer".into();
        changed.sales_last_3m = 95_000.0;
        changed.last_visit_date = Some("2025-02-14".into());
        changed.visit_frequency = Some(6);
        update_customer(&db, changed).await.unwrap();

        let stored = repository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.base.code, "C900");
        assert_eq!(stored.area_name, "Aundh");
        assert_eq!(stored.tier, CustomerTier::Performer);
        assert_eq!(stored.sales_last_3m, 95_000.0);
        assert_eq!(stored.last_visit_date.as_deref(), Some("2025-02-14"));
        assert_eq!(stored.visit_frequency, Some(6));
    }

    #[tokio::test]
    async fn test_update_customer_rejects_invalid_data() {
        let (_dir, db) = temp_database().await;
        let mr_id = seed_demo_territory(&db).await.unwrap().to_string();
        let id = insert_customer(&db, dto(&mr_id)).await.unwrap();

        let mut bad_frequency = dto(&mr_id);
        bad_frequency.id = Some(id.to_string());
        bad_frequency.visit_frequency = Some(40);
        assert!(update_customer(&db, bad_frequency).await.is_err());

        let mut unknown_mr = dto(&Uuid::new_v4().to_string());
        unknown_mr.id = Some(id.to_string());
        assert!(update_customer(&db, unknown_mr).await.is_err());

        let stored = repository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.visit_frequency, None);
        assert_eq!(stored.area_name, "Kothrud");
    }
}
