/// A named query returning a single integer fail count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityCheck {
    pub name: &'static str,
    pub query: &'static str,
    /// Largest fail count that still passes.
    pub max_fail_count: i64,
}

impl QualityCheck {
    pub const fn new(name: &'static str, query: &'static str) -> Self {
        Self {
            name,
            query,
            max_fail_count: 0,
        }
    }

    pub const fn with_threshold(mut self, max_fail_count: i64) -> Self {
        self.max_fail_count = max_fail_count;
        self
    }
}

/// Checks run after the marts are built, in report order.
pub const QUALITY_CHECKS: [QualityCheck; 5] = [
    QualityCheck::new(
        "duplicate_user_ids",
        "select count(*) from (\
           select user_id from staging_users group by user_id having count(*) > 1\
         )",
    ),
    QualityCheck::new(
        "null_event_timestamp",
        "select count(*) from staging_events where event_ts is null",
    ),
    QualityCheck::new(
        "negative_payment_amount",
        "select count(*) from staging_payments where amount_usd < 0",
    ),
    QualityCheck::new(
        "daily_kpi_not_empty",
        "select case when count(*) > 0 then 0 else 1 end from marts_daily_kpis",
    ),
    QualityCheck::new(
        "kpi_rate_range",
        "select count(*) from marts_daily_kpis \
         where conversion_rate < 0 or conversion_rate > 1 \
            or refund_rate < 0 or refund_rate > 1",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_names_are_unique() {
        let mut names: Vec<&str> = QUALITY_CHECKS.iter().map(|check| check.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), QUALITY_CHECKS.len());
    }

    #[test]
    fn default_threshold_is_zero() {
        assert!(QUALITY_CHECKS.iter().all(|check| check.max_fail_count == 0));
        let relaxed = QualityCheck::new("late_rows", "select 0").with_threshold(3);
        assert_eq!(relaxed.max_fail_count, 3);
    }
}
