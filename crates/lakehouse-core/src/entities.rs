use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::Error;

macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $domain:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every label of the domain, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    _ => Err(Error::UnknownLabel {
                        domain: $domain,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

label_enum! {
    /// Marketing channel a user signed up through.
    AcquisitionChannel, "acquisition_channel" {
        Organic => "organic",
        PaidSearch => "paid_search",
        Referral => "referral",
        Partner => "partner",
        Social => "social",
    }
}

label_enum! {
    Country, "country" {
        Us => "US",
        Ca => "CA",
        Uk => "UK",
        De => "DE",
        In => "IN",
        Au => "AU",
    }
}

label_enum! {
    /// Subscription tier. Only paid tiers are billed.
    PlanTier, "plan_tier" {
        Free => "free",
        Pro => "pro",
        Enterprise => "enterprise",
    }
}

label_enum! {
    CompanySize, "company_size" {
        Individual => "individual",
        Small => "small",
        Mid => "mid",
        Large => "large",
    }
}

label_enum! {
    EventType, "event_type" {
        SessionStart => "session_start",
        FeatureUsed => "feature_used",
        TrialStarted => "trial_started",
        SubscriptionStarted => "subscription_started",
        Churned => "churned",
    }
}

label_enum! {
    /// Product surface an event is attributed to.
    Feature, "feature_name" {
        Dashboard => "dashboard",
        Alerts => "alerts",
        ReportBuilder => "report_builder",
        CohortView => "cohort_view",
        Copilot => "copilot",
    }
}

label_enum! {
    ExperimentVariant, "experiment_variant" {
        A => "A",
        B => "B",
    }
}

label_enum! {
    PaymentStatus, "payment_status" {
        Success => "success",
        Refund => "refund",
        Failed => "failed",
    }
}

label_enum! {
    InvoiceType, "invoice_type" {
        Subscription => "subscription",
        Upgrade => "upgrade",
    }
}

label_enum! {
    Severity, "severity" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl PlanTier {
    pub fn is_paid(&self) -> bool {
        matches!(self, PlanTier::Pro | PlanTier::Enterprise)
    }
}

/// A generated account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub signup_ts: NaiveDateTime,
    pub acquisition_channel: AcquisitionChannel,
    pub country: Country,
    pub plan_tier: PlanTier,
    pub company_size: CompanySize,
}

/// Enrollment of an event in a running experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentExposure {
    pub name: String,
    pub variant: ExperimentVariant,
}

/// A product usage event owned by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_id: i64,
    pub user_id: i64,
    pub event_ts: NaiveDateTime,
    pub event_type: EventType,
    pub feature_name: Feature,
    pub experiment: Option<ExperimentExposure>,
    /// Present for `session_start` events only.
    pub session_duration_sec: Option<i64>,
}

/// An invoice charged to a paid-tier user.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub payment_id: i64,
    pub user_id: i64,
    pub payment_ts: NaiveDateTime,
    /// Always positive, rounded to cents.
    pub amount_usd: f64,
    pub payment_status: PaymentStatus,
    pub invoice_type: InvoiceType,
}

/// A support ticket. Unresolved tickets carry no `resolved_ts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub ticket_id: i64,
    pub user_id: i64,
    pub created_ts: NaiveDateTime,
    pub resolved_ts: Option<NaiveDateTime>,
    pub severity: Severity,
    pub csat_score: u8,
}

/// The four correlated tables produced by one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub users: Vec<User>,
    pub events: Vec<Event>,
    pub payments: Vec<Payment>,
    pub tickets: Vec<Ticket>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.events.is_empty()
            && self.payments.is_empty()
            && self.tickets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back() {
        for tier in PlanTier::ALL {
            assert_eq!(tier.as_str().parse::<PlanTier>().unwrap(), *tier);
        }
        assert_eq!("paid_search".parse::<AcquisitionChannel>().unwrap(), AcquisitionChannel::PaidSearch);
    }

    #[test]
    fn unknown_label_names_domain() {
        let err = "platinum".parse::<PlanTier>().unwrap_err();
        assert_eq!(err.to_string(), "unknown plan_tier label: platinum");
    }

    #[test]
    fn only_pro_and_enterprise_are_paid() {
        assert!(!PlanTier::Free.is_paid());
        assert!(PlanTier::Pro.is_paid());
        assert!(PlanTier::Enterprise.is_paid());
    }
}
