use chrono::TimeDelta;
use lakehouse_core::{Severity, Ticket, User};
use rand::Rng;

use super::{Categorical, Stream, stream_rng, uniform_instant};
use crate::errors::GenerationError;
use crate::model::GeneratorConfig;

const SEVERITY_WEIGHTS: [f64; 3] = [0.46, 0.38, 0.16];
static CSAT_SCORES: [u8; 5] = [1, 2, 3, 4, 5];
const CSAT_WEIGHTS: [f64; 5] = [0.06, 0.09, 0.19, 0.35, 0.31];
const RESOLUTION_HOURS: std::ops::Range<i64> = 2..96;
const UNRESOLVED_RATE: f64 = 0.14;

/// Build support tickets for owners drawn uniformly with replacement.
///
/// Tickets are opened after their owner's signup; unresolved tickets carry
/// no resolution time.
pub fn build_tickets(
    users: &[User],
    config: &GeneratorConfig,
) -> Result<Vec<Ticket>, GenerationError> {
    let mut rng = stream_rng(config.seed, Stream::Tickets);
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let severities = Categorical::new(Severity::ALL, &SEVERITY_WEIGHTS)?;
    let scores = Categorical::new(&CSAT_SCORES, &CSAT_WEIGHTS)?;

    let mut tickets: Vec<Ticket> = (1..=config.ticket_count() as i64)
        .map(|ticket_id| {
            let owner = &users[rng.random_range(0..users.len())];
            let created_ts = uniform_instant(&mut rng, owner.signup_ts, config.anchor);
            let hours = rng.random_range(RESOLUTION_HOURS);
            let unresolved = rng.random::<f64>() < UNRESOLVED_RATE;
            Ticket {
                ticket_id,
                user_id: owner.user_id,
                created_ts,
                resolved_ts: (!unresolved).then(|| created_ts + TimeDelta::hours(hours)),
                severity: severities.sample(&mut rng),
                csat_score: scores.sample(&mut rng),
            }
        })
        .collect();

    tickets.sort_by_key(|ticket| (ticket.created_ts, ticket.ticket_id));
    Ok(tickets)
}
