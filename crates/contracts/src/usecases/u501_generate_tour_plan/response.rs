use crate::domain::a003_monthly_tour_plan::aggregate::MonthlyTourPlan;
use serde::{Deserialize, Serialize};

/// Конверт ответа endpoint тур-планов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourPlanResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> TourPlanResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Результат действия над тур-планом
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TourPlanOutcome {
    MonthlyPlan(MonthlyPlanResult),
    WeeklyPlan(WeeklyPlan),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyPlanResult {
    pub plan: MonthlyTourPlan,
    /// Сводка дополнения ответа ассистента, только для generate/revise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub augmentation: Option<AugmentationSummary>,
}

/// Что планировщик достроил за ассистента
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AugmentationSummary {
    pub filled_customers: u32,
    pub filled_areas: u32,
    pub dropped_invalid_dates: u32,
    pub derived_weekly_targets: bool,
    pub warnings: Vec<String>,
}

/// Недельный срез месячного плана
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub plan_code: String,
    pub week: u32,
    pub date_from: String,
    pub date_to: String,
    pub days: Vec<WeeklyPlanDay>,
    pub total_visits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPlanDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub weekday: String,
    pub areas: Vec<String>,
    pub visits: Vec<WeeklyVisit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyVisit {
    pub customer_code: String,
    pub customer_name: String,
    pub area_name: String,
    pub tier: String,
}
