use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PredictionStatus;

/// A single bet placed by a user on one outcome of a market.
///
/// `bet_amount`, `odds`, and `potential_reward` are frozen at creation; only
/// `status`, `reward_claimed`, and the timestamps mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction_id: Uuid,
    pub market_id: Uuid,
    pub user_id: String,
    pub selected_outcome: String,
    pub bet_amount: Decimal,
    /// Odds at the time the bet was placed, never recomputed.
    pub odds: Decimal,
    /// `bet_amount * odds`, rounded to 6 decimal places at creation.
    pub potential_reward: Decimal,
    pub status: PredictionStatus,
    pub reward_claimed: bool,
    pub placed_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(
        market_id: Uuid,
        user_id: impl Into<String>,
        selected_outcome: impl Into<String>,
        bet_amount: Decimal,
        odds: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            prediction_id: Uuid::new_v4(),
            market_id,
            user_id: user_id.into(),
            selected_outcome: selected_outcome.into(),
            bet_amount,
            odds,
            potential_reward: (bet_amount * odds).round_dp(6),
            status: PredictionStatus::Pending,
            reward_claimed: false,
            placed_at: now,
            resolved_at: None,
            claimed_at: None,
            updated_at: now,
        }
    }

    /// True once the prediction reached won, lost, or cancelled.
    pub fn is_resolved(&self) -> bool {
        !matches!(self.status, PredictionStatus::Pending)
    }

    /// True when the reward can still be claimed.
    pub fn can_claim(&self) -> bool {
        self.status == PredictionStatus::Won && !self.reward_claimed
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
