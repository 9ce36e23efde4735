use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MarketStatus, ResolutionMethod};

/// One selectable option within a market.
///
/// Odds and probability are derived snapshots of the pool shape; they are
/// rewritten on every accepted bet (see `engine::pool`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub id: String,
    pub label: String,
    /// Cumulative amount staked on this outcome.
    pub stake: Decimal,
    /// Pari-mutuel payout multiplier (total pool / stake, floored at 1.01).
    pub odds: Decimal,
    /// Implied probability as a percentage (0-100).
    pub probability: Decimal,
}

/// A prediction market on a creator-related event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub market_id: Uuid,
    pub creator_id: String,
    pub outcome_description: String,
    pub outcomes: Vec<Outcome>,
    /// Persisted lifecycle state. The observable state at a point in time is
    /// `engine::lifecycle::current_status`, which also derives `expired`.
    pub status: MarketStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Total value staked across all outcomes.
    pub total_pool: Decimal,
    /// Creator fee percentage (0-100).
    pub creator_fee: Decimal,
    pub resolution_method: ResolutionMethod,
    pub resolved_outcome: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Market {
    /// Build a new market in `pending` with an empty pool.
    ///
    /// Outcome ids are assigned positionally ("1", "2", ...). Each outcome
    /// starts at odds 1 and an even probability split; both stay at those
    /// defaults until the first bet lands.
    pub fn new(
        creator_id: impl Into<String>,
        outcome_description: impl Into<String>,
        outcome_labels: Vec<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        creator_fee: Decimal,
        resolution_method: ResolutionMethod,
    ) -> Self {
        let even_split = if outcome_labels.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from(100 / outcome_labels.len() as u32)
        };

        let outcomes = outcome_labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| Outcome {
                id: (i + 1).to_string(),
                label,
                stake: Decimal::ZERO,
                odds: Decimal::ONE,
                probability: even_split,
            })
            .collect();

        let now = Utc::now();
        Self {
            market_id: Uuid::new_v4(),
            creator_id: creator_id.into(),
            outcome_description: outcome_description.into(),
            outcomes,
            status: MarketStatus::Pending,
            start_date,
            end_date,
            total_pool: Decimal::ZERO,
            creator_fee,
            resolution_method,
            resolved_outcome: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn outcome(&self, outcome_id: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.id == outcome_id)
    }

    pub fn has_outcome(&self, outcome_id: &str) -> bool {
        self.outcome(outcome_id).is_some()
    }

    /// Time left in the betting window, clamped at zero.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.end_date - now).max(Duration::zero())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
