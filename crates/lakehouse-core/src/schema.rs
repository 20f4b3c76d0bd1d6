//! Layouts of the raw tables shared by the raw store writer and the loader.

/// Storage kind of a raw column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    /// Text in [`crate::TIMESTAMP_FORMAT`].
    Timestamp,
}

impl ColumnKind {
    /// SQLite declared type used when creating the raw table.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text | ColumnKind::Timestamp => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl ColumnSpec {
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// A raw entity table: its flat file name, warehouse table name and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTableSpec {
    pub table: &'static str,
    pub file_name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl RawTableSpec {
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

use ColumnKind::{Integer, Real, Text, Timestamp};

pub const RAW_USERS: RawTableSpec = RawTableSpec {
    table: "raw_users",
    file_name: "users.csv",
    columns: &[
        ColumnSpec::required("user_id", Integer),
        ColumnSpec::required("signup_ts", Timestamp),
        ColumnSpec::required("acquisition_channel", Text),
        ColumnSpec::required("country", Text),
        ColumnSpec::required("plan_tier", Text),
        ColumnSpec::required("company_size", Text),
    ],
};

pub const RAW_EVENTS: RawTableSpec = RawTableSpec {
    table: "raw_events",
    file_name: "events.csv",
    columns: &[
        ColumnSpec::required("event_id", Integer),
        ColumnSpec::required("user_id", Integer),
        ColumnSpec::required("event_ts", Timestamp),
        ColumnSpec::required("event_type", Text),
        ColumnSpec::required("feature_name", Text),
        ColumnSpec::nullable("experiment_name", Text),
        ColumnSpec::nullable("experiment_variant", Text),
        ColumnSpec::nullable("session_duration_sec", Integer),
    ],
};

pub const RAW_PAYMENTS: RawTableSpec = RawTableSpec {
    table: "raw_payments",
    file_name: "payments.csv",
    columns: &[
        ColumnSpec::required("payment_id", Integer),
        ColumnSpec::required("user_id", Integer),
        ColumnSpec::required("payment_ts", Timestamp),
        ColumnSpec::required("amount_usd", Real),
        ColumnSpec::required("payment_status", Text),
        ColumnSpec::required("invoice_type", Text),
    ],
};

pub const RAW_SUPPORT_TICKETS: RawTableSpec = RawTableSpec {
    table: "raw_support_tickets",
    file_name: "support_tickets.csv",
    columns: &[
        ColumnSpec::required("ticket_id", Integer),
        ColumnSpec::required("user_id", Integer),
        ColumnSpec::required("created_ts", Timestamp),
        ColumnSpec::nullable("resolved_ts", Timestamp),
        ColumnSpec::required("severity", Text),
        ColumnSpec::required("csat_score", Integer),
    ],
};

/// Raw tables in load order.
pub const RAW_TABLES: [RawTableSpec; 4] = [RAW_USERS, RAW_EVENTS, RAW_PAYMENTS, RAW_SUPPORT_TICKETS];
