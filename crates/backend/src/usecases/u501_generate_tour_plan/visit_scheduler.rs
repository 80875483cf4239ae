//! Round-robin распределение дат визитов.
//!
//! Используется, когда ответ ассистента неполон: недостающие районы,
//! клиенты и недельные цели достраиваются детерминированно.

use chrono::{Datelike, NaiveDate, Weekday};
use contracts::domain::a002_customer::aggregate::CustomerTier;
use contracts::domain::a003_monthly_tour_plan::aggregate::MonthlyTourPlan;
use contracts::domain::a003_monthly_tour_plan::plan_document::{
    AreaStrategy, CustomerVisit, TourPlanDocument, WeeklyTarget,
};
use contracts::projections::p900_customer_tiers::dto::CustomerTierRow;
use contracts::usecases::u501_generate_tour_plan::response::{
    AugmentationSummary, WeeklyPlan, WeeklyPlanDay, WeeklyVisit,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::error::TourPlanError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Параметры планируемого месяца
#[derive(Debug, Clone)]
pub struct PlanningContext {
    pub year: i32,
    pub month: u32,
    pub weekly_off: Weekday,
    pub daily_call_capacity: u32,
    pub working_days: Vec<NaiveDate>,
}

impl PlanningContext {
    pub fn new(
        year: i32,
        month: u32,
        weekly_off: Weekday,
        daily_call_capacity: u32,
    ) -> Result<Self, TourPlanError> {
        let working_days = working_days(year, month, weekly_off)?;
        Ok(Self {
            year,
            month,
            weekly_off,
            daily_call_capacity,
            working_days,
        })
    }

    fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Клиент, которому нужно распределить визиты
#[derive(Debug, Clone)]
pub struct SchedulableCustomer {
    pub code: String,
    pub area_name: String,
    pub tier: CustomerTier,
    pub visits: u32,
}

fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, TourPlanError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        TourPlanError::Validation(format!("Invalid month {:04}-{:02}", year, month))
    })?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}

/// Все даты месяца, кроме выходного дня недели
pub fn working_days(
    year: i32,
    month: u32,
    weekly_off: Weekday,
) -> Result<Vec<NaiveDate>, TourPlanError> {
    Ok(month_days(year, month)?
        .into_iter()
        .filter(|d| d.weekday() != weekly_off)
        .collect())
}

/// Неделя месяца: дни 1-7 → 1, 8-14 → 2, ... 29-31 → 5
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// Распределить рабочие дни между районами по кругу.
///
/// Районы упорядочены по числу клиентов (убыв.), затем по имени.
/// Если районов больше, чем дней, дни повторяются, и каждый район
/// получает хотя бы один день.
pub fn assign_area_days(
    areas: &[(String, usize)],
    days: &[NaiveDate],
) -> Vec<(String, Vec<NaiveDate>)> {
    let mut ordered: Vec<&(String, usize)> = areas.iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut result: Vec<(String, Vec<NaiveDate>)> = ordered
        .iter()
        .map(|(name, _)| (name.clone(), Vec::new()))
        .collect();
    if result.is_empty() || days.is_empty() {
        return result;
    }

    let n = result.len();
    for i in 0..n.max(days.len()) {
        result[i % n].1.push(days[i % days.len()]);
    }
    for (_, area_days) in result.iter_mut() {
        area_days.sort();
        area_days.dedup();
    }
    result
}

/// Распределить даты визитов клиентам внутри их районов.
///
/// Клиент k (порядок: приоритет тира, затем код) с v визитами на m днях района:
/// v >= m → все дни; иначе шаг s = m / v, смещение k mod s,
/// даты D[offset + j*s] для j < v.
pub fn assign_customer_dates(
    customers: &[SchedulableCustomer],
    area_days: &HashMap<String, Vec<NaiveDate>>,
) -> HashMap<String, Vec<NaiveDate>> {
    let mut by_area: BTreeMap<&str, Vec<&SchedulableCustomer>> = BTreeMap::new();
    for customer in customers {
        by_area
            .entry(customer.area_name.as_str())
            .or_default()
            .push(customer);
    }

    let mut result = HashMap::new();
    for (area, mut area_customers) in by_area {
        area_customers.sort_by(|a, b| {
            a.tier
                .priority()
                .cmp(&b.tier.priority())
                .then_with(|| a.code.cmp(&b.code))
        });
        let days: &[NaiveDate] = area_days.get(area).map(Vec::as_slice).unwrap_or(&[]);
        let m = days.len();

        for (k, customer) in area_customers.into_iter().enumerate() {
            let v = customer.visits as usize;
            let dates = if m == 0 || v == 0 {
                Vec::new()
            } else if v >= m {
                days.to_vec()
            } else {
                let s = m / v;
                let offset = k % s;
                (0..v).map(|j| days[offset + j * s]).collect()
            };
            result.insert(customer.code.clone(), dates);
        }
    }
    result
}

/// Недельные цели из плана визитов клиентов
pub fn derive_weekly_targets(customer_plan: &[CustomerVisit]) -> Vec<WeeklyTarget> {
    let mut visits: BTreeMap<u32, u32> = BTreeMap::new();
    let mut areas: BTreeMap<u32, HashMap<String, u32>> = BTreeMap::new();

    for customer in customer_plan {
        for raw in &customer.visit_dates {
            let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) else {
                continue;
            };
            let week = week_of_month(date);
            *visits.entry(week).or_insert(0) += 1;
            if !customer.area_name.is_empty() {
                *areas
                    .entry(week)
                    .or_default()
                    .entry(customer.area_name.clone())
                    .or_insert(0) += 1;
            }
        }
    }

    visits
        .into_iter()
        .map(|(week, target_visits)| {
            let mut focus: Vec<(String, u32)> = areas
                .remove(&week)
                .unwrap_or_default()
                .into_iter()
                .collect();
            focus.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            WeeklyTarget {
                week,
                target_visits,
                focus_areas: focus.into_iter().map(|(area, _)| area).collect(),
                notes: None,
            }
        })
        .collect()
}

/// Оставить только корректные даты месяца; вернуть число отброшенных
fn clean_dates(dates: &mut Vec<String>, ctx: &PlanningContext) -> u32 {
    let before = dates.len();
    let mut seen = BTreeSet::new();
    for raw in dates.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
            if ctx.contains(date) {
                seen.insert(date);
            }
        }
    }
    *dates = seen.iter().map(|d| d.format(DATE_FORMAT).to_string()).collect();
    (before - dates.len()) as u32
}

fn parse_dates(dates: &[String]) -> Vec<NaiveDate> {
    dates
        .iter()
        .filter_map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
        .collect()
}

fn format_dates(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| d.format(DATE_FORMAT).to_string()).collect()
}

/// Достроить план ассистента по данным территории.
///
/// Отбрасывает некорректные даты, заполняет районы и клиентов без дат,
/// выводит недельные цели и предупреждает о перегрузке дней.
pub fn augment_plan(
    doc: &mut TourPlanDocument,
    customers: &[CustomerTierRow],
    ctx: &PlanningContext,
) -> AugmentationSummary {
    let mut summary = AugmentationSummary::default();

    // 1. Чистка дат
    for visit in doc.customer_visit_plan.iter_mut() {
        summary.dropped_invalid_dates += clean_dates(&mut visit.visit_dates, ctx);
    }
    for area in doc.area_strategy.iter_mut() {
        summary.dropped_invalid_dates += clean_dates(&mut area.visit_days, ctx);
    }

    // 2. Районы
    let mut area_counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in customers {
        *area_counts.entry(row.area_name.clone()).or_insert(0) += 1;
    }
    let area_list: Vec<(String, usize)> = area_counts
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    let round_robin: HashMap<String, Vec<NaiveDate>> =
        assign_area_days(&area_list, &ctx.working_days)
            .into_iter()
            .collect();

    for (area_name, count) in &area_counts {
        let fallback = round_robin.get(area_name).cloned().unwrap_or_default();
        match doc
            .area_strategy
            .iter_mut()
            .find(|a| a.area_name == *area_name)
        {
            Some(existing) => {
                if existing.customer_count == 0 {
                    existing.customer_count = *count as u32;
                }
                if existing.visit_days.is_empty() {
                    existing.visit_days = format_dates(&fallback);
                    existing.augmented = true;
                    summary.filled_areas += 1;
                }
            }
            None => {
                doc.area_strategy.push(AreaStrategy {
                    area_name: area_name.clone(),
                    visit_days: format_dates(&fallback),
                    customer_count: *count as u32,
                    strategy: None,
                    augmented: true,
                });
                summary.filled_areas += 1;
            }
        }
    }

    let area_days: HashMap<String, Vec<NaiveDate>> = doc
        .area_strategy
        .iter()
        .map(|a| (a.area_name.clone(), parse_dates(&a.visit_days)))
        .collect();

    // 3. Клиенты
    let planned: HashMap<&str, u32> = doc
        .customer_visit_plan
        .iter()
        .filter(|c| c.planned_visits > 0)
        .map(|c| (c.customer_code.as_str(), c.planned_visits))
        .collect();
    let schedulable: Vec<SchedulableCustomer> = customers
        .iter()
        .map(|row| SchedulableCustomer {
            code: row.customer_code.clone(),
            area_name: row.area_name.clone(),
            tier: row.tier,
            visits: planned
                .get(row.customer_code.as_str())
                .copied()
                .unwrap_or(row.recommended_visits),
        })
        .collect();
    let mut assigned = assign_customer_dates(&schedulable, &area_days);

    let known: HashSet<&str> = customers.iter().map(|r| r.customer_code.as_str()).collect();
    for visit in &doc.customer_visit_plan {
        if !known.contains(visit.customer_code.as_str()) {
            summary.warnings.push(format!(
                "Customer {} is not assigned to this representative",
                visit.customer_code
            ));
        }
    }

    for row in customers {
        let dates = assigned.remove(&row.customer_code).unwrap_or_default();
        match doc
            .customer_visit_plan
            .iter_mut()
            .find(|c| c.customer_code == row.customer_code)
        {
            Some(existing) => {
                if existing.customer_name.is_empty() {
                    existing.customer_name = row.customer_name.clone();
                }
                if existing.area_name.is_empty() {
                    existing.area_name = row.area_name.clone();
                }
                if existing.tier.is_empty() {
                    existing.tier = row.tier.as_str().to_string();
                }
                if existing.planned_visits == 0 {
                    existing.planned_visits = row.recommended_visits;
                }
                if existing.visit_dates.is_empty() {
                    existing.visit_dates = format_dates(&dates);
                    existing.augmented = true;
                    summary.filled_customers += 1;
                }
            }
            None => {
                doc.customer_visit_plan.push(CustomerVisit {
                    customer_code: row.customer_code.clone(),
                    customer_name: row.customer_name.clone(),
                    area_name: row.area_name.clone(),
                    tier: row.tier.as_str().to_string(),
                    planned_visits: row.recommended_visits,
                    visit_dates: format_dates(&dates),
                    notes: None,
                    augmented: true,
                });
                summary.filled_customers += 1;
            }
        }
    }

    // 4. Недельные цели
    if doc.weekly_targets.is_empty() {
        doc.weekly_targets = derive_weekly_targets(&doc.customer_visit_plan);
        summary.derived_weekly_targets = true;
    }

    // 5. Нагрузка по дням
    let mut calls_per_day: BTreeMap<&str, u32> = BTreeMap::new();
    for visit in &doc.customer_visit_plan {
        for date in &visit.visit_dates {
            *calls_per_day.entry(date.as_str()).or_insert(0) += 1;
        }
    }
    for (date, calls) in calls_per_day {
        if calls > ctx.daily_call_capacity {
            summary.warnings.push(format!(
                "{}: {} calls exceed daily capacity of {}",
                date, calls, ctx.daily_call_capacity
            ));
        }
    }

    doc.planning_warnings = summary.warnings.clone();
    summary
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Недельный срез сохранённого плана (без обращения к ассистенту)
pub fn build_weekly_plan(
    plan: &MonthlyTourPlan,
    week: u32,
    weekly_off: Weekday,
) -> Result<WeeklyPlan, TourPlanError> {
    if !(1..=5).contains(&week) {
        return Err(TourPlanError::Validation(format!(
            "Week must be in 1..=5, got {}",
            week
        )));
    }

    let days: Vec<NaiveDate> = month_days(plan.year, plan.month)?
        .into_iter()
        .filter(|d| week_of_month(*d) == week)
        .collect();
    let (Some(first), Some(last)) = (days.first().copied(), days.last().copied()) else {
        return Err(TourPlanError::Validation(format!(
            "Week {} is outside {}",
            week,
            plan.period()
        )));
    };

    let mut visits_by_date: BTreeMap<NaiveDate, Vec<WeeklyVisit>> = BTreeMap::new();
    for customer in &plan.plan.customer_visit_plan {
        for date in parse_dates(&customer.visit_dates) {
            if date >= first && date <= last {
                visits_by_date.entry(date).or_default().push(WeeklyVisit {
                    customer_code: customer.customer_code.clone(),
                    customer_name: customer.customer_name.clone(),
                    area_name: customer.area_name.clone(),
                    tier: customer.tier.clone(),
                });
            }
        }
    }

    let mut areas_by_date: BTreeMap<NaiveDate, BTreeSet<String>> = BTreeMap::new();
    for area in &plan.plan.area_strategy {
        for date in parse_dates(&area.visit_days) {
            if date >= first && date <= last {
                areas_by_date
                    .entry(date)
                    .or_default()
                    .insert(area.area_name.clone());
            }
        }
    }

    let mut total_visits = 0;
    let mut plan_days = Vec::new();
    for date in days {
        let mut visits = visits_by_date.remove(&date).unwrap_or_default();
        if date.weekday() == weekly_off && visits.is_empty() {
            continue;
        }
        visits.sort_by(|a, b| {
            a.area_name
                .cmp(&b.area_name)
                .then_with(|| a.customer_code.cmp(&b.customer_code))
        });
        let mut areas = areas_by_date.remove(&date).unwrap_or_default();
        areas.extend(
            visits
                .iter()
                .filter(|v| !v.area_name.is_empty())
                .map(|v| v.area_name.clone()),
        );
        total_visits += visits.len() as u32;
        plan_days.push(WeeklyPlanDay {
            date: date.format(DATE_FORMAT).to_string(),
            weekday: weekday_name(date.weekday()).to_string(),
            areas: areas.into_iter().collect(),
            visits,
        });
    }

    Ok(WeeklyPlan {
        plan_code: plan.base.code.clone(),
        week,
        date_from: first.format(DATE_FORMAT).to_string(),
        date_to: last.format(DATE_FORMAT).to_string(),
        days: plan_days,
        total_visits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn ctx() -> PlanningContext {
        PlanningContext::new(2025, 3, Weekday::Sun, 3).unwrap()
    }

    fn row(code: &str, area: &str, tier: CustomerTier) -> CustomerTierRow {
        CustomerTierRow {
            customer_id: format!("id-{}", code),
            customer_code: code.into(),
            customer_name: format!("Dr. {}", code),
            mr_id: "mr".into(),
            mr_code: "MR-1".into(),
            mr_name: "Amit Patel".into(),
            area_name: area.into(),
            customer_type: "Doctor".into(),
            specialty: None,
            tier,
            sales_last_3m: 1000.0,
            last_visit_date: None,
            recommended_visits: tier.default_monthly_visits(),
        }
    }

    #[test]
    fn test_working_days_skip_weekly_off() {
        // март 2025: 31 день, 5 воскресений
        let days = working_days(2025, 3, Weekday::Sun).unwrap();
        assert_eq!(days.len(), 26);
        assert!(days.iter().all(|d| d.weekday() != Weekday::Sun));
        assert_eq!(days[0], d("2025-03-01"));

        assert_eq!(working_days(2024, 2, Weekday::Sun).unwrap().len(), 25);
        assert!(matches!(
            working_days(2025, 13, Weekday::Sun),
            Err(TourPlanError::Validation(_))
        ));
    }

    #[test]
    fn test_area_days_round_robin_by_size() {
        let days = vec![d("2025-03-03"), d("2025-03-04"), d("2025-03-05"), d("2025-03-06"), d("2025-03-07")];
        let areas = vec![("Bandra".to_string(), 2), ("Andheri".to_string(), 5), ("Dadar".to_string(), 2)];

        let assigned = assign_area_days(&areas, &days);
        assert_eq!(assigned[0].0, "Andheri");
        assert_eq!(assigned[0].1, vec![d("2025-03-03"), d("2025-03-06")]);
        assert_eq!(assigned[1].0, "Bandra");
        assert_eq!(assigned[1].1, vec![d("2025-03-04"), d("2025-03-07")]);
        assert_eq!(assigned[2].0, "Dadar");
        assert_eq!(assigned[2].1, vec![d("2025-03-05")]);
    }

    #[test]
    fn test_area_days_wrap_when_areas_exceed_days() {
        let days = vec![d("2025-03-03"), d("2025-03-04")];
        let areas: Vec<(String, usize)> = ["A", "B", "C"].iter().map(|a| (a.to_string(), 1)).collect();

        let assigned = assign_area_days(&areas, &days);
        assert_eq!(assigned.len(), 3);
        assert!(assigned.iter().all(|(_, days)| days.len() == 1));
        assert_eq!(assigned[2].1, vec![d("2025-03-03")]);
    }

    #[test]
    fn test_customer_dates_stride_and_offset() {
        let days: Vec<NaiveDate> = (3..=10)
            .map(|day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap())
            .collect();
        let area_days = HashMap::from([("Andheri".to_string(), days.clone())]);
        let customers = vec![
            SchedulableCustomer { code: "C2".into(), area_name: "Andheri".into(), tier: CustomerTier::Developer, visits: 2 },
            SchedulableCustomer { code: "C1".into(), area_name: "Andheri".into(), tier: CustomerTier::Performer, visits: 4 },
            SchedulableCustomer { code: "C3".into(), area_name: "Andheri".into(), tier: CustomerTier::Performer, visits: 10 },
        ];

        let assigned = assign_customer_dates(&customers, &area_days);
        // C1: k=0, s=8/4=2, offset 0 → D0 D2 D4 D6
        assert_eq!(assigned["C1"], vec![days[0], days[2], days[4], days[6]]);
        // C3: v >= m → все дни
        assert_eq!(assigned["C3"], days);
        // C2: k=2, s=4, offset 2 → D2 D6
        assert_eq!(assigned["C2"], vec![days[2], days[6]]);
    }

    #[test]
    fn test_weekly_targets_by_week_of_month() {
        let plan = vec![
            CustomerVisit {
                customer_code: "C1".into(),
                area_name: "Andheri".into(),
                visit_dates: vec!["2025-03-03".into(), "2025-03-07".into(), "2025-03-08".into()],
                ..Default::default()
            },
            CustomerVisit {
                customer_code: "C2".into(),
                area_name: "Bandra".into(),
                visit_dates: vec!["2025-03-04".into(), "2025-03-31".into(), "bad".into()],
                ..Default::default()
            },
        ];

        let targets = derive_weekly_targets(&plan);
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].week, 1);
        assert_eq!(targets[0].target_visits, 3);
        assert_eq!(targets[0].focus_areas, vec!["Andheri".to_string(), "Bandra".to_string()]);
        assert_eq!(targets[1].week, 2);
        assert_eq!(targets[2].week, 5);
    }

    #[test]
    fn test_augment_fills_missing_parts() {
        let customers = vec![
            row("C1", "Andheri", CustomerTier::Performer),
            row("C2", "Andheri", CustomerTier::Developer),
            row("C3", "Bandra", CustomerTier::Prospect),
        ];
        let mut doc = TourPlanDocument {
            area_strategy: vec![AreaStrategy {
                area_name: "Andheri".into(),
                visit_days: vec!["2025-03-03".into(), "2025-03-10".into(), "2025-04-01".into()],
                ..Default::default()
            }],
            customer_visit_plan: vec![
                CustomerVisit {
                    customer_code: "C1".into(),
                    planned_visits: 2,
                    visit_dates: vec!["2025-03-03".into(), "2025-02-30".into()],
                    ..Default::default()
                },
                CustomerVisit {
                    customer_code: "C2".into(),
                    visit_dates: vec!["not a date".into()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let summary = augment_plan(&mut doc, &customers, &ctx());

        assert_eq!(summary.dropped_invalid_dates, 3);
        assert_eq!(summary.filled_areas, 1);
        assert_eq!(summary.filled_customers, 2);
        assert!(summary.derived_weekly_targets);

        let c1 = doc.find_customer("C1").unwrap();
        assert_eq!(c1.visit_dates, vec!["2025-03-03".to_string()]);
        assert_eq!(c1.area_name, "Andheri");
        assert!(!c1.augmented);

        // C2: k=1 в Андхери (2 дня), 2 визита → оба дня района
        let c2 = doc.find_customer("C2").unwrap();
        assert_eq!(c2.planned_visits, 2);
        assert_eq!(c2.visit_dates, vec!["2025-03-03".to_string(), "2025-03-10".to_string()]);
        assert!(c2.augmented);

        let bandra = doc.area_strategy.iter().find(|a| a.area_name == "Bandra").unwrap();
        assert!(bandra.augmented);
        assert_eq!(bandra.customer_count, 1);
        let c3 = doc.find_customer("C3").unwrap();
        assert_eq!(c3.visit_dates.len(), 1);
        assert_eq!(c3.visit_dates, vec![bandra.visit_days[0].clone()]);

        assert!(!doc.weekly_targets.is_empty());
    }

    #[test]
    fn test_augment_warns_on_capacity_overload() {
        let customers: Vec<CustomerTierRow> = (1..=4)
            .map(|i| row(&format!("C{}", i), "Andheri", CustomerTier::Prospect))
            .collect();
        let mut doc = TourPlanDocument {
            customer_visit_plan: customers
                .iter()
                .map(|r| CustomerVisit {
                    customer_code: r.customer_code.clone(),
                    visit_dates: vec!["2025-03-05".into()],
                    ..Default::default()
                })
                .collect(),
            weekly_targets: vec![WeeklyTarget { week: 1, target_visits: 4, ..Default::default() }],
            ..Default::default()
        };

        let summary = augment_plan(&mut doc, &customers, &ctx());
        assert_eq!(summary.filled_customers, 0);
        assert!(!summary.derived_weekly_targets);
        assert_eq!(summary.warnings, vec!["2025-03-05: 4 calls exceed daily capacity of 3".to_string()]);
        assert_eq!(doc.planning_warnings, summary.warnings);
    }

    #[test]
    fn test_weekly_plan_slices_week() {
        use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentativeId;

        let doc = TourPlanDocument {
            area_strategy: vec![AreaStrategy {
                area_name: "Andheri".into(),
                visit_days: vec!["2025-03-10".into(), "2025-03-03".into()],
                ..Default::default()
            }],
            customer_visit_plan: vec![CustomerVisit {
                customer_code: "C1".into(),
                customer_name: "Dr. C1".into(),
                area_name: "Andheri".into(),
                tier: "Performer".into(),
                visit_dates: vec!["2025-03-10".into(), "2025-03-24".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let plan = MonthlyTourPlan::new_for_insert(
            MedicalRepresentativeId::new_v4(),
            "MR-1",
            "Amit Patel",
            2025,
            3,
            doc,
            None,
            "OpenAI".into(),
            "gpt-4o-mini".into(),
            None,
        );

        let weekly = build_weekly_plan(&plan, 2, Weekday::Sun).unwrap();
        assert_eq!(weekly.date_from, "2025-03-08");
        assert_eq!(weekly.date_to, "2025-03-14");
        // 8-14 марта, воскресенье 9-го пропущено
        assert_eq!(weekly.days.len(), 6);
        assert_eq!(weekly.total_visits, 1);
        let monday = weekly.days.iter().find(|d| d.date == "2025-03-10").unwrap();
        assert_eq!(monday.weekday, "Mon");
        assert_eq!(monday.areas, vec!["Andheri".to_string()]);
        assert_eq!(monday.visits[0].customer_code, "C1");

        let last = build_weekly_plan(&plan, 5, Weekday::Sun).unwrap();
        assert_eq!(last.date_from, "2025-03-29");
        assert_eq!(last.date_to, "2025-03-31");

        assert!(build_weekly_plan(&plan, 6, Weekday::Sun).is_err());
    }

    #[test]
    fn test_weekly_plan_week_five_of_short_february() {
        use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentativeId;

        let plan = MonthlyTourPlan::new_for_insert(
            MedicalRepresentativeId::new_v4(),
            "MR-1",
            "Amit Patel",
            2025,
            2,
            TourPlanDocument::default(),
            None,
            "OpenAI".into(),
            "gpt-4o-mini".into(),
            None,
        );
        assert!(matches!(
            build_weekly_plan(&plan, 5, Weekday::Sun),
            Err(TourPlanError::Validation(_))
        ));
    }
}
