//! Per-entity generators and the sampling helpers they share.
//!
//! Every entity draws from its own ChaCha stream so that changing the draws
//! of one entity leaves the sequences of the others untouched.

mod events;
mod payments;
mod tickets;
mod users;

pub use events::build_events;
pub use payments::build_payments;
pub use tickets::build_tickets;
pub use users::build_users;

use chrono::{NaiveDateTime, TimeDelta};
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::GenerationError;

/// Seed offsets of the entity streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Users = 0,
    Events = 1,
    Payments = 2,
    Tickets = 3,
}

/// Deterministic RNG for one entity stream.
pub fn stream_rng(seed: u64, stream: Stream) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(stream as u64))
}

/// Fixed-probability draw over a static label domain.
#[derive(Debug, Clone)]
pub struct Categorical<T: 'static> {
    values: &'static [T],
    index: WeightedIndex<f64>,
}

impl<T: Copy + 'static> Categorical<T> {
    pub fn new(values: &'static [T], weights: &[f64]) -> Result<Self, GenerationError> {
        if values.len() != weights.len() {
            return Err(GenerationError::Distribution(format!(
                "{} labels but {} weights",
                values.len(),
                weights.len()
            )));
        }
        let index = WeightedIndex::new(weights)
            .map_err(|err| GenerationError::Distribution(err.to_string()))?;
        Ok(Self { values, index })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.values[self.index.sample(rng)]
    }
}

/// Uniform whole-second instant in `[start, end)`.
///
/// An empty window yields `start`.
pub fn uniform_instant<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime {
    let span = (end - start).num_seconds().max(1);
    start + TimeDelta::seconds(rng.random_range(0..span))
}

/// `count` uniform instants in `[start, end)`, ascending.
pub fn sorted_instants<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDateTime,
    end: NaiveDateTime,
    count: usize,
) -> Vec<NaiveDateTime> {
    let mut instants: Vec<NaiveDateTime> = (0..count)
        .map(|_| uniform_instant(rng, start, end))
        .collect();
    instants.sort();
    instants
}

/// Round to cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn streams_are_isolated_and_reproducible() {
        let mut users_a = stream_rng(7, Stream::Users);
        let mut users_b = stream_rng(7, Stream::Users);
        let mut events = stream_rng(7, Stream::Events);
        let a: u64 = users_a.random();
        assert_eq!(a, users_b.random::<u64>());
        assert_ne!(a, events.random::<u64>());
        // the events stream of seed 7 is the users stream of seed 8
        let mut shifted = stream_rng(8, Stream::Users);
        let mut events = stream_rng(7, Stream::Events);
        assert_eq!(shifted.random::<u64>(), events.random::<u64>());
    }

    #[test]
    fn categorical_respects_zero_weights() {
        static LABELS: [&str; 3] = ["a", "b", "c"];
        let dist = Categorical::new(&LABELS, &[0.0, 1.0, 0.0]).expect("valid weights");
        let mut rng = stream_rng(1, Stream::Users);
        assert!((0..100).all(|_| dist.sample(&mut rng) == "b"));
    }

    #[test]
    fn categorical_rejects_mismatched_weights() {
        static LABELS: [u8; 2] = [1, 2];
        assert!(Categorical::new(&LABELS, &[1.0]).is_err());
    }

    #[test]
    fn instants_stay_in_window() {
        let mut rng = stream_rng(3, Stream::Events);
        let instants = sorted_instants(&mut rng, at(1), at(3), 200);
        assert!(instants.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(instants.iter().all(|ts| *ts >= at(1) && *ts < at(3)));
    }

    #[test]
    fn empty_window_collapses_to_start() {
        let mut rng = stream_rng(3, Stream::Events);
        assert_eq!(uniform_instant(&mut rng, at(2), at(2)), at(2));
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_cents(49.456), 49.46);
        assert_eq!(round_cents(5.0), 5.0);
    }
}
