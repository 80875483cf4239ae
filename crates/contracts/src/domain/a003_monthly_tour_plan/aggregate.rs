use super::plan_document::TourPlanDocument;
use crate::domain::a001_medical_representative::aggregate::MedicalRepresentativeId;
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для агрегата Monthly Tour Plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthlyTourPlanId(pub Uuid);

impl MonthlyTourPlanId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for MonthlyTourPlanId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(MonthlyTourPlanId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Статус тур-плана
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Draft,
    Approved,
}

impl PlanStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "Draft" => Ok(PlanStatus::Draft),
            "Approved" => Ok(PlanStatus::Approved),
            _ => Err(format!("Unknown plan status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "Draft",
            PlanStatus::Approved => "Approved",
        }
    }
}

/// Агрегат месячного тур-плана MR
///
/// Один план на (MR, год, месяц). Каждая генерация или доработка
/// увеличивает `revision` и возвращает статус в `Draft`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTourPlan {
    #[serde(flatten)]
    pub base: BaseAggregate<MonthlyTourPlanId>,

    pub mr_id: MedicalRepresentativeId,
    pub year: i32,
    pub month: u32,
    pub status: PlanStatus,

    /// Провалидированный и дополненный документ плана
    pub plan: TourPlanDocument,

    /// Тред ассистента для последующих доработок
    pub thread_id: Option<String>,

    pub revision: i32,

    /// Провайдер LLM, сгенерировавший план
    pub provider: String,
    pub model_name: String,
    pub tokens_used: Option<i32>,

    /// Сколько клиентов/районов дополнил планировщик
    pub augmented_customers: i32,
    pub augmented_areas: i32,

    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl MonthlyTourPlan {
    /// Бизнес-код плана: `TP-<код MR>-<YYYY>-<MM>`
    pub fn plan_code(mr_code: &str, year: i32, month: u32) -> String {
        format!("TP-{}-{:04}-{:02}", mr_code, year, month)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        mr_id: MedicalRepresentativeId,
        mr_code: &str,
        mr_name: &str,
        year: i32,
        month: u32,
        plan: TourPlanDocument,
        thread_id: Option<String>,
        provider: String,
        model_name: String,
        tokens_used: Option<i32>,
    ) -> Self {
        let code = Self::plan_code(mr_code, year, month);
        let description = format!("Tour plan {} {:04}-{:02}", mr_name, year, month);
        let base = BaseAggregate::new(MonthlyTourPlanId::new_v4(), code, description);
        Self {
            base,
            mr_id,
            year,
            month,
            status: PlanStatus::Draft,
            plan,
            thread_id,
            revision: 1,
            provider,
            model_name,
            tokens_used,
            augmented_customers: 0,
            augmented_areas: 0,
            generated_at: chrono::Utc::now(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Период в формате "YYYY-MM"
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Заменить содержимое плана новой ревизией
    pub fn apply_revision(
        &mut self,
        plan: TourPlanDocument,
        thread_id: Option<String>,
        provider: String,
        model_name: String,
        tokens_used: Option<i32>,
    ) {
        self.plan = plan;
        if thread_id.is_some() {
            self.thread_id = thread_id;
        }
        self.provider = provider;
        self.model_name = model_name;
        self.tokens_used = tokens_used;
        self.revision += 1;
        self.status = PlanStatus::Draft;
        self.generated_at = chrono::Utc::now();
    }

    pub fn approve(&mut self) {
        self.status = PlanStatus::Approved;
    }

    pub fn validate(&self) -> Result<(), String> {
        self.base.validate_base()?;
        if !(1..=12).contains(&self.month) {
            return Err(format!("Месяц должен быть в диапазоне 1-12, получено {}", self.month));
        }
        if !(2000..=2100).contains(&self.year) {
            return Err(format!("Год вне допустимого диапазона: {}", self.year));
        }
        if self.revision < 1 {
            return Err("Ревизия должна начинаться с 1".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for MonthlyTourPlan {
    type Id = MonthlyTourPlanId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "monthly_tour_plan"
    }

    fn element_name() -> &'static str {
        "Monthly Tour Plan"
    }

    fn list_name() -> &'static str {
        "Monthly Tour Plans"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MonthlyTourPlan {
        MonthlyTourPlan::new_for_insert(
            MedicalRepresentativeId::new_v4(),
            "MR-0001",
            "Rahul Sharma",
            2025,
            3,
            TourPlanDocument::default(),
            Some("thread_abc".into()),
            "OpenAI Assistant".into(),
            "gpt-4o-mini".into(),
            Some(1200),
        )
    }

    #[test]
    fn test_plan_code_format() {
        assert_eq!(MonthlyTourPlan::plan_code("MR-0001", 2025, 3), "TP-MR-0001-2025-03");
        assert_eq!(sample().period(), "2025-03");
    }

    #[test]
    fn test_revision_resets_status_and_keeps_thread() {
        let mut plan = sample();
        plan.approve();
        plan.apply_revision(
            TourPlanDocument::default(),
            None,
            "OpenAI".into(),
            "gpt-4o".into(),
            None,
        );
        assert_eq!(plan.revision, 2);
        assert_eq!(plan.status, PlanStatus::Draft);
        assert_eq!(plan.thread_id.as_deref(), Some("thread_abc"));
    }

    #[test]
    fn test_validate_month_range() {
        let mut plan = sample();
        plan.month = 13;
        assert!(plan.validate().is_err());
    }
}
