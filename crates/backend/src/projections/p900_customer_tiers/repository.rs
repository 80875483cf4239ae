use anyhow::Result;
use contracts::domain::a002_customer::aggregate::CustomerTier;
use contracts::projections::p900_customer_tiers::dto::CustomerTierRow;
use sea_orm::{DatabaseConnection, FromQueryResult, Statement, Value};

/// Raw row of the `v_customer_tiers` view
#[derive(Debug, Clone, FromQueryResult)]
struct TierRowRaw {
    customer_id: String,
    customer_code: String,
    customer_name: String,
    mr_id: String,
    mr_code: String,
    mr_name: String,
    area_name: String,
    customer_type: String,
    specialty: Option<String>,
    tier: String,
    sales_last_3m: f64,
    last_visit_date: Option<String>,
    recommended_visits: i64,
}

impl From<TierRowRaw> for CustomerTierRow {
    fn from(r: TierRowRaw) -> Self {
        CustomerTierRow {
            customer_id: r.customer_id,
            customer_code: r.customer_code,
            customer_name: r.customer_name,
            mr_id: r.mr_id,
            mr_code: r.mr_code,
            mr_name: r.mr_name,
            area_name: r.area_name,
            customer_type: r.customer_type,
            specialty: r.specialty,
            tier: CustomerTier::from_str(&r.tier).unwrap_or(CustomerTier::Unclassified),
            sales_last_3m: r.sales_last_3m,
            last_visit_date: r.last_visit_date,
            recommended_visits: r.recommended_visits.max(0) as u32,
        }
    }
}

/// Customer tier rows of one medical representative, optionally narrowed
/// to an area and/or tier
pub async fn list_by_mr(
    db: &DatabaseConnection,
    mr_id: &str,
    area_name: Option<&str>,
    tier: Option<CustomerTier>,
) -> Result<Vec<CustomerTierRow>> {
    let mut sql = String::from(
        r#"
        SELECT
            customer_id, customer_code, customer_name,
            mr_id, mr_code, mr_name,
            area_name, customer_type, specialty, tier,
            sales_last_3m, last_visit_date, recommended_visits
        FROM v_customer_tiers
        WHERE mr_id = ?
        "#,
    );
    let mut values: Vec<Value> = vec![mr_id.into()];

    if let Some(area) = area_name {
        sql.push_str(" AND area_name = ?");
        values.push(area.into());
    }
    if let Some(tier) = tier {
        sql.push_str(" AND tier = ?");
        values.push(tier.as_str().into());
    }
    sql.push_str(" ORDER BY area_name, customer_code");

    let stmt = Statement::from_sql_and_values(sea_orm::DatabaseBackend::Sqlite, &sql, values);
    let rows = TierRowRaw::find_by_statement(stmt).all(db).await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_customer::service::seed_demo_territory;
    use crate::shared::data::db::test_support::temp_database;

    #[tokio::test]
    async fn test_view_applies_tier_defaults_and_overrides() {
        let (_dir, db) = temp_database().await;
        let mr_id = seed_demo_territory(&db).await.unwrap().to_string();

        let rows = list_by_mr(&db, &mr_id, None, None).await.unwrap();
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[0].area_name, "Andheri");
        assert_eq!(rows[0].mr_code, "MR-DEMO");

        let c001 = rows.iter().find(|r| r.customer_code == "C001").unwrap();
        assert_eq!(c001.recommended_visits, 4);
        let c003 = rows.iter().find(|r| r.customer_code == "C003").unwrap();
        assert_eq!(c003.recommended_visits, 2);
        let c013 = rows.iter().find(|r| r.customer_code == "C013").unwrap();
        assert_eq!(c013.recommended_visits, 5);
        let c014 = rows.iter().find(|r| r.customer_code == "C014").unwrap();
        assert_eq!(c014.tier, CustomerTier::Unclassified);
        assert_eq!(c014.recommended_visits, 1);
    }

    #[tokio::test]
    async fn test_filters_by_area_and_tier() {
        let (_dir, db) = temp_database().await;
        let mr_id = seed_demo_territory(&db).await.unwrap().to_string();

        let bandra = list_by_mr(&db, &mr_id, Some("Bandra"), None).await.unwrap();
        assert_eq!(bandra.len(), 4);

        let performers = list_by_mr(&db, &mr_id, None, Some(CustomerTier::Performer))
            .await
            .unwrap();
        assert_eq!(performers.len(), 5);
        assert!(performers.iter().all(|r| r.tier == CustomerTier::Performer));

        let unknown = list_by_mr(&db, "missing", None, None).await.unwrap();
        assert!(unknown.is_empty());
    }
}
