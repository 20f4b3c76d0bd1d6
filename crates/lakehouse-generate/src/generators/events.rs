use lakehouse_core::validation::MIN_EVENTS_PER_USER;
use lakehouse_core::{
    Event, EventType, ExperimentExposure, ExperimentVariant, Feature, PlanTier, User,
};
use rand::Rng;
use rand_distr::{Distribution, Poisson};

use super::{Categorical, Stream, sorted_instants, stream_rng};
use crate::errors::GenerationError;
use crate::model::GeneratorConfig;

const EVENT_TYPE_WEIGHTS: [f64; 5] = [0.60, 0.25, 0.06, 0.06, 0.03];
const FEATURE_WEIGHTS: [f64; 5] = [0.27, 0.17, 0.26, 0.16, 0.14];
const VARIANT_WEIGHTS: [f64; 2] = [0.5, 0.5];

/// Experiment every enrolled event is attributed to.
pub const ONBOARDING_EXPERIMENT: &str = "new_onboarding";
const ENROLLMENT_RATE: f64 = 0.72;
const SESSION_SECONDS: std::ops::Range<i64> = 20..3600;

fn tier_uplift(tier: PlanTier) -> i64 {
    match tier {
        PlanTier::Free => 0,
        PlanTier::Pro => 5,
        PlanTier::Enterprise => 11,
    }
}

/// Build the event stream of every user, ordered by event time.
///
/// Event ids follow generation order (users in signup order, each user's
/// events ascending in time).
pub fn build_events(
    users: &[User],
    config: &GeneratorConfig,
) -> Result<Vec<Event>, GenerationError> {
    let mut rng = stream_rng(config.seed, Stream::Events);

    let event_types = Categorical::new(EventType::ALL, &EVENT_TYPE_WEIGHTS)?;
    let features = Categorical::new(Feature::ALL, &FEATURE_WEIGHTS)?;
    let variants = Categorical::new(ExperimentVariant::ALL, &VARIANT_WEIGHTS)?;
    let counts = if config.avg_events_per_user > 0 {
        let poisson = Poisson::new(config.avg_events_per_user as f64)
            .map_err(|err| GenerationError::Distribution(err.to_string()))?;
        Some(poisson)
    } else {
        None
    };

    let mut events = Vec::new();
    let mut next_id = 1_i64;

    for user in users {
        let base = counts
            .as_ref()
            .map(|poisson| poisson.sample(&mut rng) as i64)
            .unwrap_or(0);
        let count = (base + tier_uplift(user.plan_tier)).max(MIN_EVENTS_PER_USER as i64);

        for event_ts in sorted_instants(&mut rng, user.signup_ts, config.anchor, count as usize) {
            let event_type = event_types.sample(&mut rng);
            let experiment = if rng.random::<f64>() < ENROLLMENT_RATE {
                Some(ExperimentExposure {
                    name: ONBOARDING_EXPERIMENT.to_string(),
                    variant: variants.sample(&mut rng),
                })
            } else {
                None
            };
            let feature_name = features.sample(&mut rng);
            let session_duration_sec = (event_type == EventType::SessionStart)
                .then(|| rng.random_range(SESSION_SECONDS));

            events.push(Event {
                event_id: next_id,
                user_id: user.user_id,
                event_ts,
                event_type,
                feature_name,
                experiment,
                session_duration_sec,
            });
            next_id += 1;
        }
    }

    events.sort_by_key(|event| (event.event_ts, event.event_id));
    Ok(events)
}
