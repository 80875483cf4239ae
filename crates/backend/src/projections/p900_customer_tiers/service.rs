use super::repository;
use crate::shared::data::db::get_connection;
use contracts::domain::a002_customer::aggregate::CustomerTier;
use contracts::projections::p900_customer_tiers::dto::{CustomerTierListRequest, CustomerTierRow};

/// Строки представления тиров по запросу из API
pub async fn list(request: CustomerTierListRequest) -> anyhow::Result<Vec<CustomerTierRow>> {
    let tier = match request.tier.as_deref() {
        Some(t) if !t.trim().is_empty() => {
            Some(CustomerTier::from_str(t).map_err(|e| anyhow::anyhow!(e))?)
        }
        _ => None,
    };
    let area = request
        .area_name
        .as_deref()
        .filter(|a| !a.trim().is_empty());

    repository::list_by_mr(get_connection(), &request.mr_id, area, tier).await
}
