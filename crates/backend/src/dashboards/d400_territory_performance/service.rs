use anyhow::Result;
use contracts::dashboards::d400_territory_performance::dto::{
    PerformanceRow, TerritoryPerformanceRequest, TerritoryPerformanceResponse,
};
use contracts::domain::a002_customer::aggregate::CustomerTier;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use uuid::Uuid;

use super::repository::{self, GroupAggregation, GroupBy};
use crate::domain::a001_medical_representative::repository as mr_repository;
use crate::domain::a003_monthly_tour_plan::repository as plan_repository;
use crate::shared::data::db::get_connection;

/// Get territory performance for one MR and month; `None` if the MR does not exist
pub async fn get_territory_performance(
    request: TerritoryPerformanceRequest,
) -> Result<Option<TerritoryPerformanceResponse>> {
    build_territory_performance(get_connection(), request).await
}

pub async fn build_territory_performance(
    db: &DatabaseConnection,
    request: TerritoryPerformanceRequest,
) -> Result<Option<TerritoryPerformanceResponse>> {
    if !(1..=12).contains(&request.month) {
        anyhow::bail!("Month must be in 1..=12, got {}", request.month);
    }
    let mr_uuid = Uuid::parse_str(&request.mr_id)
        .map_err(|e| anyhow::anyhow!("Invalid mr_id: {}", e))?;
    let Some(mr) = mr_repository::get_by_id(db, mr_uuid).await? else {
        return Ok(None);
    };

    let plan = plan_repository::find_by_period(db, mr_uuid, request.year, request.month)
        .await?
        .filter(|p| !p.base.metadata.is_deleted);

    // Planned visits per customer code, taken from the stored plan
    let planned_by_customer: HashMap<String, u32> = plan
        .as_ref()
        .map(|p| {
            p.plan
                .customer_visit_plan
                .iter()
                .map(|c| (c.customer_code.clone(), c.visit_dates.len() as u32))
                .collect()
        })
        .unwrap_or_default();

    let mut planned_by_tier: HashMap<String, u32> = HashMap::new();
    let mut planned_by_area: HashMap<String, u32> = HashMap::new();
    for key in repository::customer_group_keys(db, &request.mr_id).await? {
        if let Some(planned) = planned_by_customer.get(&key.customer_code) {
            *planned_by_tier.entry(key.tier).or_insert(0) += planned;
            *planned_by_area.entry(key.area_name).or_insert(0) += planned;
        }
    }

    let mut by_tier = build_rows(
        repository::aggregate_by(db, &request.mr_id, GroupBy::Tier).await?,
        &planned_by_tier,
    );
    // Performer → Developer → Prospect → Unclassified
    by_tier.sort_by_key(|row| {
        CustomerTier::from_str(&row.group_name)
            .map(|t| t.priority())
            .unwrap_or(u8::MAX)
    });

    let by_area = build_rows(
        repository::aggregate_by(db, &request.mr_id, GroupBy::Area).await?,
        &planned_by_area,
    );

    let total = by_tier
        .iter()
        .fold(
            PerformanceRow {
                group_name: "Total".to_string(),
                level: 0,
                ..Default::default()
            },
            |mut acc, row| {
                acc.customers += row.customers;
                acc.sales_last_3m += row.sales_last_3m;
                acc.recommended_visits += row.recommended_visits;
                acc.planned_visits += row.planned_visits;
                acc
            },
        )
        .with_coverage();

    Ok(Some(TerritoryPerformanceResponse {
        period: format!("{:04}-{:02}", request.year, request.month),
        mr_id: request.mr_id,
        mr_name: mr.base.description,
        plan_status: plan.as_ref().map(|p| p.status.as_str().to_string()),
        plan_revision: plan.as_ref().map(|p| p.revision),
        by_tier,
        by_area,
        total,
    }))
}

fn build_rows(data: Vec<GroupAggregation>, planned: &HashMap<String, u32>) -> Vec<PerformanceRow> {
    data.into_iter()
        .map(|g| {
            PerformanceRow {
                planned_visits: planned.get(&g.group_name).copied().unwrap_or(0),
                group_name: g.group_name,
                level: 1,
                customers: g.customers.max(0) as u32,
                sales_last_3m: g.sales_last_3m,
                recommended_visits: g.recommended_visits.max(0) as u32,
                coverage_percent: 0.0,
            }
            .with_coverage()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_customer::service::seed_demo_territory;
    use crate::shared::data::db::test_support::temp_database;
    use contracts::domain::a001_medical_representative::aggregate::MedicalRepresentativeId;
    use contracts::domain::a003_monthly_tour_plan::aggregate::MonthlyTourPlan;
    use contracts::domain::a003_monthly_tour_plan::plan_document::{
        CustomerVisit, TourPlanDocument,
    };

    fn request(mr_id: &Uuid) -> TerritoryPerformanceRequest {
        TerritoryPerformanceRequest {
            mr_id: mr_id.to_string(),
            year: 2025,
            month: 3,
        }
    }

    #[tokio::test]
    async fn test_without_plan_has_zero_coverage() {
        let (_dir, db) = temp_database().await;
        let mr_id = seed_demo_territory(&db).await.unwrap();

        let resp = build_territory_performance(&db, request(&mr_id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resp.period, "2025-03");
        assert!(resp.plan_status.is_none());
        assert_eq!(resp.total.customers, 14);
        assert_eq!(resp.total.planned_visits, 0);
        assert_eq!(resp.by_tier[0].group_name, "Performer");
        assert_eq!(resp.by_tier.last().unwrap().group_name, "Unclassified");
        assert_eq!(resp.by_area.len(), 4);
        assert_eq!(resp.by_area[0].group_name, "Andheri");
        assert_eq!(resp.by_area[0].sales_last_3m, 403_500.0);
    }

    #[tokio::test]
    async fn test_planned_visits_are_attributed_to_groups() {
        let (_dir, db) = temp_database().await;
        let mr_id = seed_demo_territory(&db).await.unwrap();

        let mut doc = TourPlanDocument::default();
        doc.customer_visit_plan.push(CustomerVisit {
            customer_code: "C001".into(),
            visit_dates: vec![
                "2025-03-03".into(),
                "2025-03-10".into(),
                "2025-03-17".into(),
                "2025-03-24".into(),
            ],
            ..Default::default()
        });
        doc.customer_visit_plan.push(CustomerVisit {
            customer_code: "C006".into(),
            visit_dates: vec!["2025-03-04".into()],
            ..Default::default()
        });
        let mut plan = MonthlyTourPlan::new_for_insert(
            MedicalRepresentativeId(mr_id),
            "MR-DEMO",
            "Rahul Sharma",
            2025,
            3,
            doc,
            None,
            "OpenAI".into(),
            "gpt-4o-mini".into(),
            None,
        );
        plan.before_write();
        plan_repository::upsert(&db, &plan).await.unwrap();

        let resp = build_territory_performance(&db, request(&mr_id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resp.plan_status.as_deref(), Some("Draft"));
        assert_eq!(resp.plan_revision, Some(1));
        assert_eq!(resp.total.planned_visits, 5);

        let performer = resp.by_tier.iter().find(|r| r.group_name == "Performer").unwrap();
        assert_eq!(performer.planned_visits, 4);
        let andheri = resp.by_area.iter().find(|r| r.group_name == "Andheri").unwrap();
        assert_eq!(andheri.planned_visits, 4);
        // Andheri: 4 + 4 + 2 + 1 recommended visits
        assert_eq!(andheri.recommended_visits, 11);
        assert_eq!(andheri.coverage_percent, 36.4);
    }

    #[tokio::test]
    async fn test_unknown_mr_returns_none() {
        let (_dir, db) = temp_database().await;
        let resp = build_territory_performance(&db, request(&Uuid::new_v4()))
            .await
            .unwrap();
        assert!(resp.is_none());
    }
}
