//! Pari-mutuel pool accounting.
//!
//! Odds are a snapshot of the pool's current shape: every accepted bet
//! bumps one outcome's stake and the market total, then recomputes odds and
//! implied probability for all outcomes from scratch. Already-placed
//! predictions keep the odds they were sold at.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{lifecycle, EngineError};
use crate::models::Market;

/// Monetary amounts are normalized to this many fractional digits before
/// they touch the pool, so per-outcome stakes always sum to the total
/// exactly.
pub const AMOUNT_SCALE: u32 = 6;

/// Payout multiplier never drops below this once an outcome holds stake.
pub fn odds_floor() -> Decimal {
    Decimal::new(101, 2)
}

/// Apply a bet to an open market.
///
/// Returns the outcome's odds as they stood before this stake landed; that
/// snapshot is what the bettor's reward is computed from. On any error the
/// market is untouched.
pub fn apply_bet(
    market: &mut Market,
    outcome_id: &str,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, EngineError> {
    // 1. Amount must be positive after normalization.
    let amount = amount.round_dp(AMOUNT_SCALE);
    if amount <= Decimal::ZERO {
        return Err(EngineError::Validation(vec![
            "Bet amount must be greater than 0".to_string(),
        ]));
    }

    // 2. Market must be explicitly active and inside its window.
    if !lifecycle::is_open_for_bets(market, now) {
        return Err(EngineError::MarketClosed {
            status: lifecycle::current_status(market, now),
        });
    }

    // 3. Outcome must exist on this market.
    let Some(index) = market.outcomes.iter().position(|o| o.id == outcome_id) else {
        return Err(EngineError::UnknownOutcome {
            market_id: market.market_id,
            outcome_id: outcome_id.to_string(),
        });
    };

    let outcome = &mut market.outcomes[index];
    let prior_odds = outcome.odds;

    // 4. Same normalized amount lands on both accumulators, keeping
    //    sum(stake) == total_pool exact.
    outcome.stake += amount;
    market.total_pool += amount;

    recompute_odds(market);
    market.touch();

    Ok(prior_odds)
}

/// Full-pool recompute of odds and implied probability for every outcome.
///
/// With an empty pool the initialized defaults stand (odds 1, probability an
/// even split). Otherwise, for an outcome holding stake the odds are
/// `total_pool / stake` floored at 1.01 and the probability is the outcome's
/// share of the pool in percent; outcomes without stake read odds 1,
/// probability 0.
pub fn recompute_odds(market: &mut Market) {
    if market.total_pool.is_zero() {
        return;
    }

    let pool = market.total_pool;
    let floor = odds_floor();
    for outcome in &mut market.outcomes {
        if outcome.stake > Decimal::ZERO {
            outcome.odds = (pool / outcome.stake).max(floor).round_dp(AMOUNT_SCALE);
            outcome.probability = (Decimal::ONE_HUNDRED * outcome.stake / pool).round_dp(2);
        } else {
            outcome.odds = Decimal::ONE;
            outcome.probability = Decimal::ZERO;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
