use contracts::domain::a003_monthly_tour_plan::plan_document::{
    AreaStrategy, CustomerVisit, TourPlanDocument, WeeklyTarget, REQUIRED_PLAN_KEYS,
};
use serde_json::{Map, Value};

use super::error::TourPlanError;

/// Убрать обёртку ```json ... ``` вокруг ответа
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // первая строка ограждения может содержать язык
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Разобрать текст ассистента в JSON-объект
pub fn parse_plan_response(text: &str) -> Result<Value, TourPlanError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(TourPlanError::Parse("empty response".to_string()));
    }

    let value = match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => value,
        Err(first_error) => {
            // текст вокруг JSON: берём самый внешний {...}
            let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
                return Err(TourPlanError::Parse(format!(
                    "response is not JSON: {}",
                    first_error
                )));
            };
            if end <= start {
                return Err(TourPlanError::Parse("response is not JSON".to_string()));
            }
            serde_json::from_str::<Value>(&cleaned[start..=end])
                .map_err(|e| TourPlanError::Parse(format!("response is not JSON: {}", e)))?
        }
    };

    if !value.is_object() {
        return Err(TourPlanError::Parse(
            "top-level JSON value must be an object".to_string(),
        ));
    }
    Ok(value)
}

/// Обязательные ключи, которых нет в ответе (null считается отсутствием)
pub fn validate_required_keys(value: &Value) -> Vec<String> {
    REQUIRED_PLAN_KEYS
        .iter()
        .filter(|key| value.get(**key).map_or(true, Value::is_null))
        .map(|key| key.to_string())
        .collect()
}

fn as_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn as_opt_string(value: Option<&Value>) -> Option<String> {
    let s = as_string(value);
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Число из числа или строки ("4"); дробные округляются
fn as_u32(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u32))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn as_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| as_string(Some(v)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect()
        }
        _ => Vec::new(),
    }
}

fn objects<'a>(value: Option<&'a Value>) -> impl Iterator<Item = &'a Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn weekly_target(obj: &Map<String, Value>) -> WeeklyTarget {
    WeeklyTarget {
        week: as_u32(obj.get("week")),
        target_visits: as_u32(obj.get("target_visits")),
        focus_areas: as_string_list(obj.get("focus_areas")),
        notes: as_opt_string(obj.get("notes")),
    }
}

fn area_strategy(obj: &Map<String, Value>) -> Option<AreaStrategy> {
    let area_name = as_string(obj.get("area_name"));
    if area_name.is_empty() {
        return None;
    }
    Some(AreaStrategy {
        area_name,
        visit_days: as_string_list(obj.get("visit_days")),
        customer_count: as_u32(obj.get("customer_count")),
        strategy: as_opt_string(obj.get("strategy")),
        augmented: false,
    })
}

fn customer_visit(obj: &Map<String, Value>) -> Option<CustomerVisit> {
    let customer_code = as_string(obj.get("customer_code"));
    if customer_code.is_empty() {
        return None;
    }
    Some(CustomerVisit {
        customer_code,
        customer_name: as_string(obj.get("customer_name")),
        area_name: as_string(obj.get("area_name")),
        tier: as_string(obj.get("tier")),
        planned_visits: as_u32(obj.get("planned_visits")),
        visit_dates: as_string_list(obj.get("visit_dates")),
        notes: as_opt_string(obj.get("notes")),
        augmented: false,
    })
}

const KNOWN_KEYS: [&str; 5] = [
    "executive_summary",
    "weekly_targets",
    "area_strategy",
    "customer_visit_plan",
    "planning_warnings",
];

/// Собрать документ плана; некорректные поля внутри записей получают
/// значения по умолчанию, записи без ключа (района/кода клиента) пропускаются
pub fn into_document(value: Value) -> TourPlanDocument {
    let Value::Object(map) = value else {
        return TourPlanDocument::default();
    };

    let executive_summary = match map.get("executive_summary") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let weekly_targets = objects(map.get("weekly_targets"))
        .map(weekly_target)
        .filter(|t| (1..=5).contains(&t.week))
        .collect();
    let area_strategy = objects(map.get("area_strategy"))
        .filter_map(area_strategy)
        .collect();
    let customer_visit_plan = objects(map.get("customer_visit_plan"))
        .filter_map(customer_visit)
        .collect();

    let extra = map
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    TourPlanDocument {
        executive_summary,
        weekly_targets,
        area_strategy,
        customer_visit_plan,
        planning_warnings: Vec::new(),
        extra,
    }
}
