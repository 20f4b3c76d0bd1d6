use lakehouse_core::{AcquisitionChannel, CompanySize, Country, PlanTier, User};

use super::{Categorical, Stream, stream_rng, uniform_instant};
use crate::errors::GenerationError;
use crate::model::GeneratorConfig;

const CHANNEL_WEIGHTS: [f64; 5] = [0.28, 0.24, 0.18, 0.12, 0.18];
const COUNTRY_WEIGHTS: [f64; 6] = [0.48, 0.10, 0.10, 0.08, 0.18, 0.06];
const PLAN_TIER_WEIGHTS: [f64; 3] = [0.57, 0.36, 0.07];
const COMPANY_SIZE_WEIGHTS: [f64; 4] = [0.45, 0.29, 0.18, 0.08];

/// Build `n_users` accounts with dense ids, ordered by signup time.
pub fn build_users(config: &GeneratorConfig) -> Result<Vec<User>, GenerationError> {
    let mut rng = stream_rng(config.seed, Stream::Users);
    let (start, end) = config.window()?;

    let channels = Categorical::new(AcquisitionChannel::ALL, &CHANNEL_WEIGHTS)?;
    let countries = Categorical::new(Country::ALL, &COUNTRY_WEIGHTS)?;
    let tiers = Categorical::new(PlanTier::ALL, &PLAN_TIER_WEIGHTS)?;
    let sizes = Categorical::new(CompanySize::ALL, &COMPANY_SIZE_WEIGHTS)?;

    let mut users: Vec<User> = (1..=config.n_users)
        .map(|user_id| User {
            user_id,
            signup_ts: uniform_instant(&mut rng, start, end),
            acquisition_channel: channels.sample(&mut rng),
            country: countries.sample(&mut rng),
            plan_tier: tiers.sample(&mut rng),
            company_size: sizes.sample(&mut rng),
        })
        .collect();

    users.sort_by_key(|user| user.signup_ts);
    Ok(users)
}
