use anyhow::Result;
use sea_orm::{DatabaseConnection, FromQueryResult, Statement};
use serde::{Deserialize, Serialize};

/// Dimension the customers of a territory are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Tier,
    Area,
}

impl GroupBy {
    fn column(&self) -> &'static str {
        match self {
            GroupBy::Tier => "tier",
            GroupBy::Area => "area_name",
        }
    }
}

/// Raw aggregation result from SQL query
#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct GroupAggregation {
    pub group_name: String,
    pub customers: i64,
    pub sales_last_3m: f64,
    pub recommended_visits: i64,
}

/// Customer code with the groups it belongs to
#[derive(Debug, Clone, FromQueryResult)]
pub struct CustomerGroupKey {
    pub customer_code: String,
    pub tier: String,
    pub area_name: String,
}

/// Customers, sales and recommended visits of one MR grouped by tier or area
pub async fn aggregate_by(
    db: &DatabaseConnection,
    mr_id: &str,
    group_by: GroupBy,
) -> Result<Vec<GroupAggregation>> {
    let column = group_by.column();
    let sql = format!(
        r#"
        SELECT
            {column} AS group_name,
            COUNT(*) AS customers,
            CAST(COALESCE(SUM(sales_last_3m), 0) AS REAL) AS sales_last_3m,
            CAST(COALESCE(SUM(recommended_visits), 0) AS INTEGER) AS recommended_visits
        FROM v_customer_tiers
        WHERE mr_id = ?
        GROUP BY {column}
        ORDER BY sales_last_3m DESC, {column}
        "#
    );

    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        &sql,
        [mr_id.into()],
    );

    let results = GroupAggregation::find_by_statement(stmt).all(db).await?;
    Ok(results)
}

/// Tier and area of every customer, to attribute planned visits to groups
pub async fn customer_group_keys(
    db: &DatabaseConnection,
    mr_id: &str,
) -> Result<Vec<CustomerGroupKey>> {
    let sql = r#"
        SELECT customer_code, tier, area_name
        FROM v_customer_tiers
        WHERE mr_id = ?
        ORDER BY customer_code
    "#;

    let stmt =
        Statement::from_sql_and_values(sea_orm::DatabaseBackend::Sqlite, sql, [mr_id.into()]);
    let results = CustomerGroupKey::find_by_statement(stmt).all(db).await?;
    Ok(results)
}
