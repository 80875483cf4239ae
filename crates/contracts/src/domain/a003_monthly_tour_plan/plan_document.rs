//! Структура месячного тур-плана, которую возвращает AI-ассистент
//! и которая хранится в `a003_monthly_tour_plan.plan_json`.

use serde::{Deserialize, Serialize};

/// Ключи, без которых ответ ассистента отклоняется
pub const REQUIRED_PLAN_KEYS: [&str; 3] = ["weekly_targets", "area_strategy", "customer_visit_plan"];

/// Документ тур-плана
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourPlanDocument {
    #[serde(default)]
    pub executive_summary: String,

    #[serde(default)]
    pub weekly_targets: Vec<WeeklyTarget>,

    #[serde(default)]
    pub area_strategy: Vec<AreaStrategy>,

    #[serde(default)]
    pub customer_visit_plan: Vec<CustomerVisit>,

    /// Предупреждения планировщика (перегруженные дни и т.п.)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub planning_warnings: Vec<String>,

    /// Прочие ключи ответа ассистента сохраняются как есть
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Цель на неделю месяца (неделя 1..=5)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTarget {
    pub week: u32,
    #[serde(default)]
    pub target_visits: u32,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Стратегия по району: дни работы в районе
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaStrategy {
    pub area_name: String,
    /// Даты `YYYY-MM-DD`
    #[serde(default)]
    pub visit_days: Vec<String>,
    #[serde(default)]
    pub customer_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Дни распределены планировщиком, а не ассистентом
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub augmented: bool,
}

/// План визитов к одному клиенту
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerVisit {
    pub customer_code: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub area_name: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub planned_visits: u32,
    /// Даты `YYYY-MM-DD`
    #[serde(default)]
    pub visit_dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub augmented: bool,
}

impl TourPlanDocument {
    /// Общее количество запланированных визитов
    pub fn total_visits(&self) -> usize {
        self.customer_visit_plan
            .iter()
            .map(|c| c.visit_dates.len())
            .sum()
    }

    pub fn find_customer(&self, customer_code: &str) -> Option<&CustomerVisit> {
        self.customer_visit_plan
            .iter()
            .find(|c| c.customer_code == customer_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_keys_are_preserved() {
        let raw = r#"{
            "executive_summary": "Focus on Andheri",
            "weekly_targets": [],
            "area_strategy": [],
            "customer_visit_plan": [
                {"customer_code": "C1", "visit_dates": ["2025-03-03", "2025-03-17"]}
            ],
            "kpi_notes": {"coverage": 0.9}
        }"#;
        let doc: TourPlanDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.total_visits(), 2);
        assert!(doc.extra.contains_key("kpi_notes"));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["kpi_notes"]["coverage"], 0.9);
        // пустые предупреждения не сериализуются
        assert!(back.get("planning_warnings").is_none());
    }
}
