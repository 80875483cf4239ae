use crate::domain::a002_customer::aggregate::CustomerTier;
use serde::{Deserialize, Serialize};

/// Строка представления `v_customer_tiers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerTierRow {
    pub customer_id: String,
    pub customer_code: String,
    pub customer_name: String,
    pub mr_id: String,
    pub mr_code: String,
    pub mr_name: String,
    pub area_name: String,
    pub customer_type: String,
    pub specialty: Option<String>,
    pub tier: CustomerTier,
    pub sales_last_3m: f64,
    pub last_visit_date: Option<String>,
    /// Частота визитов: переопределение клиента или норма по tier
    pub recommended_visits: u32,
}

/// Query parameters for GET /api/p900/customer-tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerTierListRequest {
    pub mr_id: String,
    pub area_name: Option<String>,
    pub tier: Option<String>,
}
