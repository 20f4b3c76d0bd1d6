use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::entities::{Dataset, PlanTier};
use crate::error::{Error, Result};

/// Minimum number of events every user owns.
pub const MIN_EVENTS_PER_USER: usize = 4;

/// Validate the cross-entity invariants of a generated dataset.
///
/// This checks:
/// - unique ids in every table, dense user ids `1..=N`
/// - every owner `user_id` exists, payments only for paid tiers
/// - no event, payment or ticket precedes its owner's signup
/// - resolved tickets are not resolved before they were created
/// - positive, cent-rounded payment amounts and the per-user event floor
pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    let mut owners: BTreeMap<i64, (NaiveDateTime, PlanTier)> = BTreeMap::new();
    for user in &dataset.users {
        if owners
            .insert(user.user_id, (user.signup_ts, user.plan_tier))
            .is_some()
        {
            return Err(Error::InvalidDataset(format!(
                "duplicate user_id {}",
                user.user_id
            )));
        }
    }
    let expected_ids = 1..=dataset.users.len() as i64;
    if !owners.keys().copied().eq(expected_ids) {
        return Err(Error::InvalidDataset(
            "user ids are not dense from 1".to_string(),
        ));
    }

    let owner = |table: &str, id: i64, user_id: i64| {
        owners.get(&user_id).copied().ok_or_else(|| {
            Error::InvalidDataset(format!(
                "{table} {id} references unknown user_id {user_id}"
            ))
        })
    };

    let mut event_ids = BTreeSet::new();
    let mut events_per_user: BTreeMap<i64, usize> = BTreeMap::new();
    for event in &dataset.events {
        if !event_ids.insert(event.event_id) {
            return Err(Error::InvalidDataset(format!(
                "duplicate event_id {}",
                event.event_id
            )));
        }
        let (signup_ts, _) = owner("event", event.event_id, event.user_id)?;
        if event.event_ts < signup_ts {
            return Err(Error::InvalidDataset(format!(
                "event {} precedes signup of user {}",
                event.event_id, event.user_id
            )));
        }
        *events_per_user.entry(event.user_id).or_insert(0) += 1;
    }
    for user_id in owners.keys() {
        let count = events_per_user.get(user_id).copied().unwrap_or(0);
        if count < MIN_EVENTS_PER_USER {
            return Err(Error::InvalidDataset(format!(
                "user {user_id} owns {count} events, expected at least {MIN_EVENTS_PER_USER}"
            )));
        }
    }

    let mut payment_ids = BTreeSet::new();
    for payment in &dataset.payments {
        if !payment_ids.insert(payment.payment_id) {
            return Err(Error::InvalidDataset(format!(
                "duplicate payment_id {}",
                payment.payment_id
            )));
        }
        let (signup_ts, tier) = owner("payment", payment.payment_id, payment.user_id)?;
        if !tier.is_paid() {
            return Err(Error::InvalidDataset(format!(
                "payment {} belongs to {tier} user {}",
                payment.payment_id, payment.user_id
            )));
        }
        if payment.payment_ts < signup_ts {
            return Err(Error::InvalidDataset(format!(
                "payment {} precedes signup of user {}",
                payment.payment_id, payment.user_id
            )));
        }
        let cents = payment.amount_usd * 100.0;
        if payment.amount_usd <= 0.0 || (cents - cents.round()).abs() > 1e-6 {
            return Err(Error::InvalidDataset(format!(
                "payment {} has invalid amount {}",
                payment.payment_id, payment.amount_usd
            )));
        }
    }

    let mut ticket_ids = BTreeSet::new();
    for ticket in &dataset.tickets {
        if !ticket_ids.insert(ticket.ticket_id) {
            return Err(Error::InvalidDataset(format!(
                "duplicate ticket_id {}",
                ticket.ticket_id
            )));
        }
        let (signup_ts, _) = owner("ticket", ticket.ticket_id, ticket.user_id)?;
        if ticket.created_ts < signup_ts {
            return Err(Error::InvalidDataset(format!(
                "ticket {} precedes signup of user {}",
                ticket.ticket_id, ticket.user_id
            )));
        }
        if let Some(resolved_ts) = ticket.resolved_ts
            && resolved_ts < ticket.created_ts
        {
            return Err(Error::InvalidDataset(format!(
                "ticket {} resolved before it was created",
                ticket.ticket_id
            )));
        }
    }

    Ok(())
}
