//! Компактное JSON-представление территории для промпта.
//!
//! Короткие ключи и коды тиров экономят токены; легенда колонок
//! передаётся вместе с данными.

use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentative;
use contracts::projections::p900_customer_tiers::dto::CustomerTierRow;
use serde::Serialize;
use std::collections::BTreeMap;

const MAX_NAME_CHARS: usize = 40;

#[derive(Debug, Clone, Serialize)]
pub struct CompressedTerritory {
    pub mr: CompressedMr,
    pub period: String,
    pub legend: BTreeMap<&'static str, &'static str>,
    pub areas: Vec<CompressedArea>,
    pub totals: CompressedTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressedMr {
    pub code: String,
    pub name: String,
    pub hq: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressedArea {
    #[serde(rename = "a")]
    pub area: String,
    #[serde(rename = "cust")]
    pub customers: Vec<CompressedCustomer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressedCustomer {
    #[serde(rename = "c")]
    pub code: String,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "t")]
    pub tier: &'static str,
    #[serde(rename = "ty")]
    pub customer_type: String,
    #[serde(rename = "sp", skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(rename = "s")]
    pub sales: i64,
    #[serde(rename = "v")]
    pub visits: u32,
    #[serde(rename = "lv", skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressedTotals {
    pub customers: usize,
    pub areas: usize,
    pub recommended_visits: u32,
}

impl CompressedTerritory {
    /// Однострочный JSON для вставки в промпт
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn truncate_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.chars().count() <= MAX_NAME_CHARS {
        trimmed.to_string()
    } else {
        trimmed.chars().take(MAX_NAME_CHARS).collect()
    }
}

fn legend() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("a", "area name"),
        ("c", "customer code"),
        ("n", "customer name"),
        ("t", "tier: T1 Performer, T2 Developer, T3 Prospect, T0 Unclassified"),
        ("ty", "customer type"),
        ("sp", "specialty"),
        ("s", "sales of the last 3 months, rounded"),
        ("v", "recommended visits this month"),
        ("lv", "last visit date"),
    ])
}

/// Сжать строки тиров одного представителя
pub fn compress_customers(
    mr: &MedicalRepresentative,
    rows: &[CustomerTierRow],
    year: i32,
    month: u32,
) -> CompressedTerritory {
    let mut by_area: BTreeMap<&str, Vec<&CustomerTierRow>> = BTreeMap::new();
    for row in rows {
        by_area.entry(row.area_name.as_str()).or_default().push(row);
    }

    let areas: Vec<CompressedArea> = by_area
        .into_iter()
        .map(|(area, mut customers)| {
            customers.sort_by(|a, b| {
                a.tier
                    .priority()
                    .cmp(&b.tier.priority())
                    .then_with(|| a.customer_code.cmp(&b.customer_code))
            });
            CompressedArea {
                area: area.to_string(),
                customers: customers
                    .into_iter()
                    .map(|r| CompressedCustomer {
                        code: r.customer_code.clone(),
                        name: truncate_name(&r.customer_name),
                        tier: r.tier.short_code(),
                        customer_type: r.customer_type.clone(),
                        specialty: r.specialty.clone().filter(|s| !s.trim().is_empty()),
                        sales: r.sales_last_3m.round() as i64,
                        visits: r.recommended_visits,
                        last_visit: r.last_visit_date.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    let totals = CompressedTotals {
        customers: rows.len(),
        areas: areas.len(),
        recommended_visits: rows.iter().map(|r| r.recommended_visits).sum(),
    };

    CompressedTerritory {
        mr: CompressedMr {
            code: mr.base.code.clone(),
            name: mr.base.description.clone(),
            hq: mr.headquarter.clone(),
        },
        period: format!("{:04}-{:02}", year, month),
        legend: legend(),
        areas,
        totals,
    }
}
