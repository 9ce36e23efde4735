use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profile of a bettor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub farcaster_id: String,
    pub wallet_address: String,
    pub display_name: Option<String>,
    pub token_balance: Decimal,
    pub total_bets_placed: i32,
    pub total_rewards_earned: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate view used by the profile endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total_bets: i32,
    pub total_rewards: Decimal,
    pub average_reward_per_bet: Decimal,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        farcaster_id: impl Into<String>,
        wallet_address: impl Into<String>,
        display_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            farcaster_id: farcaster_id.into(),
            wallet_address: wallet_address.into(),
            display_name,
            token_balance: Decimal::ZERO,
            total_bets_placed: 0,
            total_rewards_earned: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stats(&self) -> UserStats {
        let average_reward_per_bet = if self.total_bets_placed > 0 {
            (self.total_rewards_earned / Decimal::from(self.total_bets_placed)).round_dp(6)
        } else {
            Decimal::ZERO
        };

        UserStats {
            total_bets: self.total_bets_placed,
            total_rewards: self.total_rewards_earned,
            average_reward_per_bet,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
