use lakehouse_core::{InvoiceType, Payment, PaymentStatus, PlanTier, User};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::{Categorical, Stream, round_cents, sorted_instants, stream_rng};
use crate::errors::GenerationError;
use crate::model::GeneratorConfig;

const STATUS_WEIGHTS: [f64; 3] = [0.91, 0.05, 0.04];
const INVOICE_TYPE_WEIGHTS: [f64; 2] = [0.88, 0.12];
const PRICE_NOISE: f64 = 0.12;
const MIN_AMOUNT_USD: f64 = 5.0;
const BILLING_CYCLE_DAYS: i64 = 30;

/// Monthly list price of a tier, `None` for unbilled tiers.
pub fn base_price(tier: PlanTier) -> Option<f64> {
    match tier {
        PlanTier::Free => None,
        PlanTier::Pro => Some(49.0),
        PlanTier::Enterprise => Some(199.0),
    }
}

/// Build invoices for paid-tier users, ordered by payment time.
pub fn build_payments(
    users: &[User],
    config: &GeneratorConfig,
) -> Result<Vec<Payment>, GenerationError> {
    let mut rng = stream_rng(config.seed, Stream::Payments);

    let statuses = Categorical::new(PaymentStatus::ALL, &STATUS_WEIGHTS)?;
    let invoice_types = Categorical::new(InvoiceType::ALL, &INVOICE_TYPE_WEIGHTS)?;

    let mut payments = Vec::new();
    let mut next_id = 1_i64;

    for user in users {
        let Some(price) = base_price(user.plan_tier) else {
            continue;
        };
        let noise = Normal::new(0.0, price * PRICE_NOISE)
            .map_err(|err| GenerationError::Distribution(err.to_string()))?;

        let tenure_days = (config.anchor - user.signup_ts).num_days().max(1);
        let invoices = (tenure_days / BILLING_CYCLE_DAYS + rng.random_range(0..2_i64)).max(1);

        for payment_ts in sorted_instants(&mut rng, user.signup_ts, config.anchor, invoices as usize)
        {
            let payment_status = statuses.sample(&mut rng);
            let amount = (price + noise.sample(&mut rng)).max(MIN_AMOUNT_USD);
            payments.push(Payment {
                payment_id: next_id,
                user_id: user.user_id,
                payment_ts,
                amount_usd: round_cents(amount),
                payment_status,
                invoice_type: invoice_types.sample(&mut rng),
            });
            next_id += 1;
        }
    }

    payments.sort_by_key(|payment| (payment.payment_ts, payment.payment_id));
    Ok(payments)
}
