use super::compressor::compress_customers;
use super::error::TourPlanError;
use super::prompt_builder::{build_generation_messages, build_revision_messages};
use super::response_parser::{into_document, parse_plan_response, validate_required_keys};
use super::visit_scheduler::{augment_plan, build_weekly_plan, PlanningContext};
use crate::domain::a001_medical_representative::repository as mr_repository;
use crate::domain::a003_monthly_tour_plan::repository as plan_repository;
use crate::projections::p900_customer_tiers::repository as tiers_repository;
use crate::shared::config::{Config, PlanningConfig};
use crate::shared::llm::{build_provider, ChatMessage, LlmError, LlmProvider, LlmResponse};
use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentative;
use contracts::domain::a003_monthly_tour_plan::aggregate::MonthlyTourPlan;
use contracts::domain::a003_monthly_tour_plan::plan_document::TourPlanDocument;
use contracts::projections::p900_customer_tiers::dto::CustomerTierRow;
use contracts::usecases::u501_generate_tour_plan::request::TourPlanRequest;
use contracts::usecases::u501_generate_tour_plan::response::{
    AugmentationSummary, MonthlyPlanResult, TourPlanOutcome,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

/// Executor для UseCase генерации тур-планов
pub struct TourPlanExecutor {
    db: DatabaseConnection,
    provider: Option<Arc<dyn LlmProvider>>,
    planning: PlanningConfig,
}

/// Проверенный ответ ассистента вместе с дополнением
struct GeneratedPlan {
    document: TourPlanDocument,
    summary: AugmentationSummary,
    response: LlmResponse,
}

impl TourPlanExecutor {
    pub fn new(
        db: DatabaseConnection,
        provider: Option<Arc<dyn LlmProvider>>,
        planning: PlanningConfig,
    ) -> Self {
        Self {
            db,
            provider,
            planning,
        }
    }

    /// Без API-ключа работают только чтение, утверждение и недельный срез
    pub fn from_config(db: DatabaseConnection, config: &Config) -> Self {
        let provider = match build_provider(&config.llm) {
            Ok(provider) => {
                tracing::info!("Tour plan assistant: {}", provider.provider_name());
                Some(provider)
            }
            Err(e) => {
                tracing::warn!("AI assistant is not configured: {}", e);
                None
            }
        };
        Self::new(db, provider, config.planning.clone())
    }

    pub async fn execute(&self, request: TourPlanRequest) -> Result<TourPlanOutcome, TourPlanError> {
        let period = request.period();
        tracing::info!(
            "Tour plan action {} for MR {} {:04}-{:02}",
            request.action_name(),
            period.mr_id,
            period.year,
            period.month
        );

        match request {
            TourPlanRequest::GenerateMonthlyPlan {
                mr_id,
                year,
                month,
                instructions,
            } => {
                self.generate(&mr_id, year, month, instructions.as_deref())
                    .await
            }
            TourPlanRequest::ReviseMonthlyPlan {
                mr_id,
                year,
                month,
                feedback,
            } => self.revise(&mr_id, year, month, &feedback).await,
            TourPlanRequest::GetMonthlyPlan { mr_id, year, month } => {
                let plan = self.stored_plan(&mr_id, year, month).await?;
                Ok(TourPlanOutcome::MonthlyPlan(MonthlyPlanResult {
                    plan,
                    augmentation: None,
                }))
            }
            TourPlanRequest::ApproveMonthlyPlan { mr_id, year, month } => {
                self.approve(&mr_id, year, month).await
            }
            TourPlanRequest::GetWeeklyPlan {
                mr_id,
                year,
                month,
                week,
            } => {
                let plan = self.stored_plan(&mr_id, year, month).await?;
                let weekly = build_weekly_plan(&plan, week, self.weekly_off()?)?;
                Ok(TourPlanOutcome::WeeklyPlan(weekly))
            }
        }
    }

    /// Проверка подключения к ассистенту; возвращает имя провайдера
    pub async fn test_connection(&self) -> Result<String, TourPlanError> {
        let provider = self.provider()?;
        provider.test_connection().await?;
        Ok(provider.provider_name().to_string())
    }

    async fn generate(
        &self,
        mr_id: &str,
        year: i32,
        month: u32,
        instructions: Option<&str>,
    ) -> Result<TourPlanOutcome, TourPlanError> {
        validate_period(year, month)?;
        let provider = self.provider()?;
        let mr = self.load_mr(mr_id).await?;
        let rows = self.load_customers(&mr).await?;
        let ctx = self.planning_context(year, month)?;

        let compressed = compress_customers(&mr, &rows, year, month);
        let messages = build_generation_messages(&compressed, &ctx, instructions);
        let generated = self
            .ask_assistant(provider.as_ref(), messages, None, &rows, &ctx)
            .await?;

        let plan = match plan_repository::find_by_period(&self.db, mr.base.id.value(), year, month)
            .await?
        {
            Some(mut existing) => {
                // повторная генерация начинает новый тред
                existing.base.metadata.restore();
                existing.apply_revision(
                    generated.document,
                    generated.response.thread_id.clone(),
                    provider.provider_name().to_string(),
                    generated.response.model.clone(),
                    generated.response.tokens_used,
                );
                existing.thread_id = generated.response.thread_id.clone();
                existing
            }
            None => MonthlyTourPlan::new_for_insert(
                mr.base.id,
                &mr.base.code,
                mr.name(),
                year,
                month,
                generated.document,
                generated.response.thread_id.clone(),
                provider.provider_name().to_string(),
                generated.response.model.clone(),
                generated.response.tokens_used,
            ),
        };

        let plan = self.save(plan, &generated.summary).await?;
        tracing::info!(
            "Generated tour plan {} revision {} ({} visits, {} customers filled)",
            plan.base.code,
            plan.revision,
            plan.plan.total_visits(),
            generated.summary.filled_customers
        );
        Ok(TourPlanOutcome::MonthlyPlan(MonthlyPlanResult {
            plan,
            augmentation: Some(generated.summary),
        }))
    }

    async fn revise(
        &self,
        mr_id: &str,
        year: i32,
        month: u32,
        feedback: &str,
    ) -> Result<TourPlanOutcome, TourPlanError> {
        validate_period(year, month)?;
        if feedback.trim().is_empty() {
            return Err(TourPlanError::Validation("Feedback must not be empty".into()));
        }
        let provider = self.provider()?;
        let mr = self.load_mr(mr_id).await?;
        let mut plan = self.find_plan(&mr, year, month).await?;
        let rows = self.load_customers(&mr).await?;
        let ctx = self.planning_context(year, month)?;

        let thread_id = if provider.keeps_thread_context() {
            plan.thread_id.clone()
        } else {
            None
        };
        let messages = build_revision_messages(feedback, &plan.plan, thread_id.is_none(), &ctx);
        let generated = self
            .ask_assistant(provider.as_ref(), messages, thread_id.as_deref(), &rows, &ctx)
            .await?;

        plan.apply_revision(
            generated.document,
            generated.response.thread_id.clone(),
            provider.provider_name().to_string(),
            generated.response.model.clone(),
            generated.response.tokens_used,
        );
        let plan = self.save(plan, &generated.summary).await?;
        tracing::info!(
            "Revised tour plan {} to revision {}",
            plan.base.code,
            plan.revision
        );
        Ok(TourPlanOutcome::MonthlyPlan(MonthlyPlanResult {
            plan,
            augmentation: Some(generated.summary),
        }))
    }

    async fn approve(
        &self,
        mr_id: &str,
        year: i32,
        month: u32,
    ) -> Result<TourPlanOutcome, TourPlanError> {
        let mut plan = self.stored_plan(mr_id, year, month).await?;
        plan.approve();
        plan.before_write();
        plan_repository::upsert(&self.db, &plan).await?;
        tracing::info!("Approved tour plan {}", plan.base.code);
        Ok(TourPlanOutcome::MonthlyPlan(MonthlyPlanResult {
            plan,
            augmentation: None,
        }))
    }

    /// Запрос к ассистенту, разбор ответа и дополнение плана
    async fn ask_assistant(
        &self,
        provider: &dyn LlmProvider,
        messages: Vec<ChatMessage>,
        thread_id: Option<&str>,
        rows: &[CustomerTierRow],
        ctx: &PlanningContext,
    ) -> Result<GeneratedPlan, TourPlanError> {
        let response = provider.chat_completion(messages, thread_id).await?;
        tracing::debug!(
            "Assistant replied with {} chars, tokens: {:?}",
            response.content.len(),
            response.tokens_used
        );

        let value = parse_plan_response(&response.content)?;
        let missing = validate_required_keys(&value);
        if !missing.is_empty() {
            tracing::warn!("Assistant response is missing keys: {:?}", missing);
            return Err(TourPlanError::MissingKeys(missing));
        }

        let mut document = into_document(value);
        let summary = augment_plan(&mut document, rows, ctx);
        for warning in &summary.warnings {
            tracing::warn!("Tour plan warning: {}", warning);
        }

        Ok(GeneratedPlan {
            document,
            summary,
            response,
        })
    }

    async fn save(
        &self,
        mut plan: MonthlyTourPlan,
        summary: &AugmentationSummary,
    ) -> Result<MonthlyTourPlan, TourPlanError> {
        plan.augmented_customers = summary.filled_customers as i32;
        plan.augmented_areas = summary.filled_areas as i32;
        plan.validate().map_err(TourPlanError::Validation)?;
        plan.before_write();
        plan_repository::upsert(&self.db, &plan).await?;
        Ok(plan)
    }

    fn provider(&self) -> Result<Arc<dyn LlmProvider>, TourPlanError> {
        self.provider.clone().ok_or_else(|| {
            TourPlanError::Llm(LlmError::AuthError(
                "OpenAI API key is not configured".to_string(),
            ))
        })
    }

    fn weekly_off(&self) -> Result<chrono::Weekday, TourPlanError> {
        self.planning
            .weekly_off_day()
            .map_err(|e| TourPlanError::Validation(e.to_string()))
    }

    fn planning_context(&self, year: i32, month: u32) -> Result<PlanningContext, TourPlanError> {
        PlanningContext::new(
            year,
            month,
            self.weekly_off()?,
            self.planning.daily_call_capacity,
        )
    }

    async fn load_mr(&self, mr_id: &str) -> Result<MedicalRepresentative, TourPlanError> {
        let id = parse_mr_id(mr_id)?;
        mr_repository::get_by_id(&self.db, id)
            .await?
            .ok_or_else(|| TourPlanError::NotFound(format!("Medical representative not found: {}", mr_id)))
    }

    async fn load_customers(
        &self,
        mr: &MedicalRepresentative,
    ) -> Result<Vec<CustomerTierRow>, TourPlanError> {
        let rows = tiers_repository::list_by_mr(&self.db, &mr.to_string_id(), None, None).await?;
        if rows.is_empty() {
            return Err(TourPlanError::Validation(format!(
                "Medical representative {} has no active customers",
                mr.base.code
            )));
        }
        Ok(rows)
    }

    async fn find_plan(
        &self,
        mr: &MedicalRepresentative,
        year: i32,
        month: u32,
    ) -> Result<MonthlyTourPlan, TourPlanError> {
        plan_repository::find_by_period(&self.db, mr.base.id.value(), year, month)
            .await?
            .filter(|plan| !plan.base.metadata.is_deleted)
            .ok_or_else(|| {
                TourPlanError::NotFound(format!(
                    "No tour plan for {} {:04}-{:02}; generate it first",
                    mr.base.code, year, month
                ))
            })
    }

    async fn stored_plan(
        &self,
        mr_id: &str,
        year: i32,
        month: u32,
    ) -> Result<MonthlyTourPlan, TourPlanError> {
        validate_period(year, month)?;
        let mr = self.load_mr(mr_id).await?;
        self.find_plan(&mr, year, month).await
    }
}

fn validate_period(year: i32, month: u32) -> Result<(), TourPlanError> {
    if !(1..=12).contains(&month) {
        return Err(TourPlanError::Validation(format!(
            "Month must be in 1..=12, got {}",
            month
        )));
    }
    if !(2000..=2100).contains(&year) {
        return Err(TourPlanError::Validation(format!(
            "Year must be in 2000..=2100, got {}",
            year
        )));
    }
    Ok(())
}

fn parse_mr_id(mr_id: &str) -> Result<Uuid, TourPlanError> {
    Uuid::parse_str(mr_id.trim())
        .map_err(|_| TourPlanError::Validation(format!("Invalid mr_id: {}", mr_id)))
}
