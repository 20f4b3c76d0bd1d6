use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use lakehouse_core::{Event, Payment, RawTableSpec, TIMESTAMP_FORMAT, Ticket, User};

/// A row that renders into the column order of its raw table.
pub trait CsvRow {
    fn record(&self) -> Vec<String>;
}

fn timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

impl CsvRow for User {
    fn record(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            timestamp(&self.signup_ts),
            self.acquisition_channel.to_string(),
            self.country.to_string(),
            self.plan_tier.to_string(),
            self.company_size.to_string(),
        ]
    }
}

impl CsvRow for Event {
    fn record(&self) -> Vec<String> {
        let (experiment_name, experiment_variant) = match &self.experiment {
            Some(exposure) => (exposure.name.clone(), exposure.variant.to_string()),
            None => (String::new(), String::new()),
        };
        vec![
            self.event_id.to_string(),
            self.user_id.to_string(),
            timestamp(&self.event_ts),
            self.event_type.to_string(),
            self.feature_name.to_string(),
            experiment_name,
            experiment_variant,
            self.session_duration_sec
                .map(|value| value.to_string())
                .unwrap_or_default(),
        ]
    }
}

impl CsvRow for Payment {
    fn record(&self) -> Vec<String> {
        vec![
            self.payment_id.to_string(),
            self.user_id.to_string(),
            timestamp(&self.payment_ts),
            format!("{:.2}", self.amount_usd),
            self.payment_status.to_string(),
            self.invoice_type.to_string(),
        ]
    }
}

impl CsvRow for Ticket {
    fn record(&self) -> Vec<String> {
        vec![
            self.ticket_id.to_string(),
            self.user_id.to_string(),
            timestamp(&self.created_ts),
            self.resolved_ts.as_ref().map(timestamp).unwrap_or_default(),
            self.severity.to_string(),
            self.csat_score.to_string(),
        ]
    }
}

/// Write a table as CSV with the header of `spec`, also for zero rows.
///
/// Returns the number of bytes written.
pub fn write_table_csv<R: CsvRow>(
    path: &Path,
    spec: &RawTableSpec,
    rows: &[R],
) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(spec.header())?;
    for row in rows {
        writer.write_record(row.record())?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use lakehouse_core::schema::RAW_SUPPORT_TICKETS;

    use super::*;

    fn temp_file(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lakehouse_csv_{label}_{}.csv", uuid::Uuid::new_v4()))
    }

    #[test]
    fn empty_table_keeps_header() {
        let path = temp_file("empty");
        let rows: Vec<Ticket> = Vec::new();
        let bytes = write_table_csv(&path, &RAW_SUPPORT_TICKETS, &rows).expect("write csv");
        let contents = std::fs::read_to_string(&path).expect("read csv");
        assert_eq!(
            contents,
            "ticket_id,user_id,created_ts,resolved_ts,severity,csat_score\n"
        );
        assert_eq!(bytes, contents.len() as u64);
    }

    #[test]
    fn unresolved_ticket_leaves_field_empty() {
        let created_ts = chrono::NaiveDate::from_ymd_opt(2024, 2, 3)
            .and_then(|date| date.and_hms_opt(4, 5, 6))
            .expect("valid timestamp");
        let ticket = Ticket {
            ticket_id: 9,
            user_id: 3,
            created_ts,
            resolved_ts: None,
            severity: lakehouse_core::Severity::High,
            csat_score: 2,
        };
        assert_eq!(
            ticket.record(),
            vec!["9", "3", "2024-02-03 04:05:06", "", "high", "2"]
        );
    }
}
