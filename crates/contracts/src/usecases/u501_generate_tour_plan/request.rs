use serde::{Deserialize, Serialize};

/// Запрос к единому endpoint тур-планов
///
/// Тело запроса размечено полем `action`:
/// ```json
/// {"action": "generate_monthly_plan", "mr_id": "…", "year": 2025, "month": 3}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TourPlanRequest {
    /// Сгенерировать месячный план через AI-ассистента
    GenerateMonthlyPlan {
        mr_id: String,
        year: i32,
        month: u32,
        /// Дополнительные указания для ассистента
        #[serde(default)]
        instructions: Option<String>,
    },
    /// Доработать существующий план по замечаниям (тот же тред)
    ReviseMonthlyPlan {
        mr_id: String,
        year: i32,
        month: u32,
        feedback: String,
    },
    /// Получить сохранённый план
    GetMonthlyPlan { mr_id: String, year: i32, month: u32 },
    /// Утвердить план
    ApproveMonthlyPlan { mr_id: String, year: i32, month: u32 },
    /// Недельный срез сохранённого плана
    GetWeeklyPlan {
        mr_id: String,
        year: i32,
        month: u32,
        week: u32,
    },
}

/// MR и месяц, к которым относится план
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPeriod {
    pub mr_id: String,
    pub year: i32,
    pub month: u32,
}

impl TourPlanRequest {
    pub fn period(&self) -> PlanPeriod {
        let (mr_id, year, month) = match self {
            TourPlanRequest::GenerateMonthlyPlan { mr_id, year, month, .. }
            | TourPlanRequest::ReviseMonthlyPlan { mr_id, year, month, .. }
            | TourPlanRequest::GetMonthlyPlan { mr_id, year, month }
            | TourPlanRequest::ApproveMonthlyPlan { mr_id, year, month }
            | TourPlanRequest::GetWeeklyPlan { mr_id, year, month, .. } => (mr_id, year, month),
        };
        PlanPeriod {
            mr_id: mr_id.clone(),
            year: *year,
            month: *month,
        }
    }

    /// Имя действия для логов
    pub fn action_name(&self) -> &'static str {
        match self {
            TourPlanRequest::GenerateMonthlyPlan { .. } => "generate_monthly_plan",
            TourPlanRequest::ReviseMonthlyPlan { .. } => "revise_monthly_plan",
            TourPlanRequest::GetMonthlyPlan { .. } => "get_monthly_plan",
            TourPlanRequest::ApproveMonthlyPlan { .. } => "approve_monthly_plan",
            TourPlanRequest::GetWeeklyPlan { .. } => "get_weekly_plan",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tag_deserialization() {
        let raw = r#"{"action":"revise_monthly_plan","mr_id":"m1","year":2025,"month":3,"feedback":"more Andheri"}"#;
        let req: TourPlanRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.action_name(), "revise_monthly_plan");
        assert_eq!(req.period().month, 3);
        match req {
            TourPlanRequest::ReviseMonthlyPlan { feedback, .. } => assert_eq!(feedback, "more Andheri"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_instructions_are_optional() {
        let raw = r#"{"action":"generate_monthly_plan","mr_id":"m1","year":2025,"month":3}"#;
        let req: TourPlanRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(
            req,
            TourPlanRequest::GenerateMonthlyPlan {
                mr_id: "m1".into(),
                year: 2025,
                month: 3,
                instructions: None,
            }
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let raw = r#"{"action":"delete_everything","mr_id":"m1","year":2025,"month":3}"#;
        assert!(serde_json::from_str::<TourPlanRequest>(raw).is_err());
    }
}
