use chrono::{NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Parameters of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base seed; each entity stream derives its own seed from it.
    pub seed: u64,
    /// Length of the signup window ending at `anchor`.
    pub days_back: i64,
    pub n_users: i64,
    /// Poisson mean of events per user before the plan-tier uplift.
    pub avg_events_per_user: i64,
    pub avg_tickets_per_user: f64,
    /// End of the sampling window ("now" for the run).
    pub anchor: NaiveDateTime,
}

impl GeneratorConfig {
    /// Current UTC time truncated to the minute.
    pub fn default_anchor() -> NaiveDateTime {
        let now = Utc::now().naive_utc();
        now.with_second(0)
            .and_then(|value| value.with_nanosecond(0))
            .unwrap_or(now)
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.n_users < 0 {
            return Err(GenerationError::InvalidConfig(
                "n_users must be >= 0".to_string(),
            ));
        }
        if self.days_back < 0 {
            return Err(GenerationError::InvalidConfig(
                "days_back must be >= 0".to_string(),
            ));
        }
        if self.avg_events_per_user < 0 {
            return Err(GenerationError::InvalidConfig(
                "avg_events_per_user must be >= 0".to_string(),
            ));
        }
        if !self.avg_tickets_per_user.is_finite() || self.avg_tickets_per_user < 0.0 {
            return Err(GenerationError::InvalidConfig(
                "avg_tickets_per_user must be a finite value >= 0".to_string(),
            ));
        }
        self.window().map(|_| ())
    }

    /// Global sampling window `[anchor - days_back, anchor)`.
    pub fn window(&self) -> Result<(NaiveDateTime, NaiveDateTime), GenerationError> {
        let start = TimeDelta::try_days(self.days_back)
            .and_then(|span| self.anchor.checked_sub_signed(span))
            .ok_or_else(|| {
                GenerationError::InvalidConfig(format!(
                    "days_back {} reaches outside the calendar",
                    self.days_back
                ))
            })?;
        Ok((start, self.anchor))
    }

    /// Number of support tickets for the run.
    pub fn ticket_count(&self) -> usize {
        if self.n_users <= 0 {
            return 0;
        }
        (self.n_users as f64 * self.avg_tickets_per_user).round() as usize
    }
}

/// Summary of a generated raw table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub file: String,
    pub rows: u64,
    pub bytes_written: u64,
}

/// Report for a generation run, written next to the raw files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub anchor: String,
    pub tables: Vec<TableReport>,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, config: &GeneratorConfig) -> Self {
        Self {
            run_id,
            seed: config.seed,
            anchor: config.anchor.format(lakehouse_core::TIMESTAMP_FORMAT).to_string(),
            tables: Vec::new(),
            bytes_written: 0,
            duration_ms: 0,
        }
    }

    pub fn rows(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|report| report.table == table)
            .map(|report| report.rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            seed: 1,
            days_back: 10,
            n_users: 50,
            avg_events_per_user: 5,
            avg_tickets_per_user: 0.2,
            anchor: NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|date| date.and_hms_opt(12, 0, 0))
                .expect("valid anchor"),
        }
    }

    #[test]
    fn ticket_count_rounds() {
        assert_eq!(config().ticket_count(), 10);
        let mut cfg = config();
        cfg.avg_tickets_per_user = 0.196;
        assert_eq!(cfg.ticket_count(), 10);
        cfg.n_users = 0;
        assert_eq!(cfg.ticket_count(), 0);
    }

    #[test]
    fn rejects_negative_counts() {
        let mut cfg = config();
        cfg.n_users = -1;
        assert!(matches!(cfg.validate(), Err(GenerationError::InvalidConfig(_))));

        let mut cfg = config();
        cfg.avg_tickets_per_user = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn window_ends_at_anchor() {
        let cfg = config();
        let (start, end) = cfg.window().expect("window");
        assert_eq!(end, cfg.anchor);
        assert_eq!((end - start).num_days(), 10);
    }

    #[test]
    fn default_anchor_has_minute_precision() {
        let anchor = GeneratorConfig::default_anchor();
        assert_eq!(anchor.second(), 0);
        assert_eq!(anchor.nanosecond(), 0);
    }
}
