use contracts::domain::a002_customer::aggregate::CustomerTier;
use contracts::domain::a003_monthly_tour_plan::plan_document::TourPlanDocument;

use super::compressor::CompressedTerritory;
use super::visit_scheduler::PlanningContext;
use crate::shared::format::month_name;
use crate::shared::llm::ChatMessage;

const SYSTEM_PROMPT: &str = "You are an experienced field-force planner for a pharmaceutical company. \
You build monthly tour plans for medical representatives: which areas to work on which days \
and on which dates to call on each customer. Prioritise high-value customers (Performers), \
keep the daily call load realistic and group visits by area to reduce travel. \
Answer with a single JSON object only, without Markdown or commentary.";

const OUTPUT_SCHEMA: &str = r#"{
  "executive_summary": "string",
  "weekly_targets": [
    {"week": 1, "target_visits": 0, "focus_areas": ["area"], "notes": "string"}
  ],
  "area_strategy": [
    {"area_name": "area", "visit_days": ["YYYY-MM-DD"], "customer_count": 0, "strategy": "string"}
  ],
  "customer_visit_plan": [
    {"customer_code": "code", "customer_name": "name", "area_name": "area",
     "tier": "Performer|Developer|Prospect|Unclassified", "planned_visits": 0,
     "visit_dates": ["YYYY-MM-DD"], "notes": "string"}
  ]
}"#;

fn tier_norms() -> String {
    CustomerTier::ALL
        .iter()
        .map(|t| {
            format!(
                "- {} ({}): {} visit(s) per month",
                t.as_str(),
                t.short_code(),
                t.default_monthly_visits()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Сообщения для генерации месячного плана
pub fn build_generation_messages(
    compressed: &CompressedTerritory,
    ctx: &PlanningContext,
    instructions: Option<&str>,
) -> Vec<ChatMessage> {
    let mut prompt = format!(
        "Create the tour plan for {month} {year} for medical representative {name} ({code}), \
headquarter {hq}.\n\n\
Working days: {days} (weekly off: {off}).\n\
Daily call capacity: {capacity} calls per day.\n\
Territory: {customers} customers in {areas} areas, {visits} recommended visits in total.\n\n\
Visit norms by tier (column \"v\" already applies customer overrides):\n{norms}\n\n\
Territory data (compact JSON, see \"legend\" for column names):\n{data}\n\n\
Rules:\n\
- Use only dates of {month} {year} in YYYY-MM-DD format and never schedule on the weekly off day.\n\
- Every customer from the data must appear in customer_visit_plan with its customer_code.\n\
- Weeks are numbered by day of month: days 1-7 are week 1, days 8-14 week 2 and so on.\n\n\
Return JSON with exactly this structure:\n{schema}",
        month = month_name(ctx.month),
        year = ctx.year,
        name = compressed.mr.name,
        code = compressed.mr.code,
        hq = compressed.mr.hq,
        days = ctx.working_days.len(),
        off = ctx.weekly_off,
        capacity = ctx.daily_call_capacity,
        customers = compressed.totals.customers,
        areas = compressed.totals.areas,
        visits = compressed.totals.recommended_visits,
        norms = tier_norms(),
        data = compressed.to_prompt_json(),
        schema = OUTPUT_SCHEMA,
    );

    if let Some(extra) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str("\n\nAdditional instructions from the manager:\n");
        prompt.push_str(extra);
    }

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

/// Сообщения для доработки плана.
///
/// Предыдущий план вкладывается, только если провайдер не хранит контекст треда.
pub fn build_revision_messages(
    feedback: &str,
    previous_plan: &TourPlanDocument,
    include_previous: bool,
    ctx: &PlanningContext,
) -> Vec<ChatMessage> {
    let mut prompt = format!(
        "Revise the tour plan for {} {} according to this feedback:\n{}\n\n",
        month_name(ctx.month),
        ctx.year,
        feedback.trim()
    );

    if include_previous {
        let previous = serde_json::to_string(previous_plan).unwrap_or_else(|_| "{}".to_string());
        prompt.push_str("Current plan:\n");
        prompt.push_str(&previous);
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!(
        "Keep the daily call capacity of {} and the weekly off day ({}). \
Return the complete revised plan as a single JSON object with the same structure \
(executive_summary, weekly_targets, area_strategy, customer_visit_plan).",
        ctx.daily_call_capacity, ctx.weekly_off
    ));

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::llm::ChatRole;
    use crate::usecases::u501_generate_tour_plan::compressor::compress_customers;
    use chrono::Weekday;
    use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentative;
    use contracts::domain::a003_monthly_tour_plan::plan_document::CustomerVisit;

    fn ctx() -> PlanningContext {
        PlanningContext::new(2025, 3, Weekday::Sun, 14).unwrap()
    }

    fn compressed() -> CompressedTerritory {
        let mr = MedicalRepresentative::new_for_insert(
            "MR-1".into(),
            "Amit Patel".into(),
            "Pune".into(),
            None,
            None,
            None,
        );
        compress_customers(&mr, &[], 2025, 3)
    }

    #[test]
    fn test_generation_prompt_contains_schedule_context() {
        let messages = build_generation_messages(&compressed(), &ctx(), Some("Focus on Aundh"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("single JSON object"));

        let user = &messages[1].content;
        assert!(user.contains("March 2025"));
        assert!(user.contains("Working days: 26 (weekly off: Sun)"));
        assert!(user.contains("14 calls per day"));
        assert!(user.contains("Performer (T1): 4 visit(s)"));
        assert!(user.contains("customer_visit_plan"));
        assert!(user.ends_with("Focus on Aundh"));
    }

    #[test]
    fn test_blank_instructions_are_ignored() {
        let messages = build_generation_messages(&compressed(), &ctx(), Some("   "));
        assert!(!messages[1].content.contains("Additional instructions"));
    }

    #[test]
    fn test_revision_embeds_previous_plan_only_when_asked() {
        let mut plan = TourPlanDocument::default();
        plan.customer_visit_plan.push(CustomerVisit {
            customer_code: "C777".into(),
            ..Default::default()
        });

        let with_plan = build_revision_messages("More Bandra visits", &plan, true, &ctx());
        assert!(with_plan[1].content.contains("C777"));
        assert!(with_plan[1].content.contains("More Bandra visits"));

        let without = build_revision_messages("More Bandra visits", &plan, false, &ctx());
        assert!(!without[1].content.contains("C777"));
    }
}
