//! Market lifecycle state machine.
//!
//! Persisted statuses move `pending -> active -> {resolved, cancelled}`.
//! `expired` exists only as a read-time derivation: a market whose betting
//! window has closed reports `expired` until it is resolved or cancelled,
//! but the stored record keeps its last persisted status so that a
//! post-window `resolve` remains legal.

use chrono::{DateTime, Utc};

use super::EngineError;
use crate::models::{Market, MarketStatus};

/// Single source of truth for a market's observable status at `now`.
///
/// Terminal statuses are sticky. Otherwise the status is derived from the
/// betting window: before `start_date` the market reads as pending, after
/// `end_date` as expired, in between as active.
pub fn current_status(market: &Market, now: DateTime<Utc>) -> MarketStatus {
    if market.status.is_terminal() {
        return market.status;
    }
    if now < market.start_date {
        MarketStatus::Pending
    } else if now > market.end_date {
        MarketStatus::Expired
    } else {
        MarketStatus::Active
    }
}

/// Betting requires both an explicit activation and an open time window.
/// A market inside its window but never activated stays closed.
pub fn is_open_for_bets(market: &Market, now: DateTime<Utc>) -> bool {
    market.status == MarketStatus::Active && current_status(market, now) == MarketStatus::Active
}

/// Move a pending market to active.
pub fn activate(market: &mut Market) -> Result<(), EngineError> {
    if market.status != MarketStatus::Pending {
        return Err(EngineError::InvalidTransition {
            action: "activate",
            status: market.status,
        });
    }
    market.status = MarketStatus::Active;
    market.touch();
    Ok(())
}

/// Resolve an active market to one of its outcomes.
pub fn resolve(market: &mut Market, outcome_id: &str) -> Result<(), EngineError> {
    if market.status != MarketStatus::Active {
        return Err(EngineError::InvalidTransition {
            action: "resolve",
            status: market.status,
        });
    }
    if !market.has_outcome(outcome_id) {
        return Err(EngineError::UnknownOutcome {
            market_id: market.market_id,
            outcome_id: outcome_id.to_string(),
        });
    }

    market.status = MarketStatus::Resolved;
    market.resolved_outcome = Some(outcome_id.to_string());
    market.resolved_at = Some(Utc::now());
    market.touch();
    Ok(())
}

/// Cancel a market. Legal from any status except resolved.
pub fn cancel(market: &mut Market) -> Result<(), EngineError> {
    if market.status == MarketStatus::Resolved {
        return Err(EngineError::InvalidTransition {
            action: "cancel",
            status: market.status,
        });
    }
    market.status = MarketStatus::Cancelled;
    market.touch();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
