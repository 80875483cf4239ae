use serde::{Deserialize, Serialize};

/// Request for territory performance dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryPerformanceRequest {
    pub mr_id: String,
    pub year: i32,
    pub month: u32,
}

/// Response for territory performance dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryPerformanceResponse {
    /// Period in format "YYYY-MM"
    pub period: String,
    pub mr_id: String,
    pub mr_name: String,
    /// Status of the tour plan for the period, None if no plan exists
    pub plan_status: Option<String>,
    pub plan_revision: Option<i32>,
    /// Breakdown by customer tier, ordered Performer → Unclassified
    pub by_tier: Vec<PerformanceRow>,
    /// Breakdown by area, ordered by sales descending
    pub by_area: Vec<PerformanceRow>,
    pub total: PerformanceRow,
}

/// Single row of the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    /// Tier name, area name or "Total"
    pub group_name: String,
    /// Hierarchy level (0 = total, 1 = detail)
    pub level: u32,
    pub customers: u32,
    pub sales_last_3m: f64,
    pub recommended_visits: u32,
    pub planned_visits: u32,
    /// planned / recommended * 100, 0 when nothing is recommended
    pub coverage_percent: f64,
}

impl PerformanceRow {
    /// Recalculate coverage from visit counters
    pub fn with_coverage(mut self) -> Self {
        self.coverage_percent = if self.recommended_visits == 0 {
            0.0
        } else {
            let raw = self.planned_visits as f64 / self.recommended_visits as f64 * 100.0;
            (raw * 10.0).round() / 10.0
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_rounding() {
        let row = PerformanceRow {
            recommended_visits: 3,
            planned_visits: 2,
            ..Default::default()
        }
        .with_coverage();
        assert_eq!(row.coverage_percent, 66.7);

        let empty = PerformanceRow::default().with_coverage();
        assert_eq!(empty.coverage_percent, 0.0);
    }
}
