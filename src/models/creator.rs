use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profile of a market creator.
///
/// Identity comes from the external wallet/identity provider; this record
/// only tracks the activity counters the engine accumulates for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub creator_id: String,
    pub native_token_address: String,
    pub social_handle: String,
    pub display_name: Option<String>,
    pub total_markets_created: i32,
    pub total_volume: Decimal,
    /// Activity-based score in [0, 100].
    pub reputation_score: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate view used by the profile endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CreatorStats {
    pub markets_created: i32,
    pub total_volume: Decimal,
    pub reputation_score: Decimal,
    pub average_volume_per_market: Decimal,
}

impl Creator {
    pub fn new(
        creator_id: impl Into<String>,
        native_token_address: impl Into<String>,
        social_handle: impl Into<String>,
        display_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let mut creator = Self {
            creator_id: creator_id.into(),
            native_token_address: native_token_address.into(),
            social_handle: social_handle.into(),
            display_name,
            total_markets_created: 0,
            total_volume: Decimal::ZERO,
            reputation_score: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        creator.recompute_reputation();
        creator
    }

    /// Preferred display name: explicit name, then social handle, then a
    /// truncated id.
    pub fn preferred_name(&self) -> String {
        if let Some(name) = &self.display_name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        if !self.social_handle.is_empty() {
            return self.social_handle.clone();
        }
        let tail_start = self.creator_id.len().saturating_sub(4);
        format!("Creator {}", &self.creator_id[tail_start..])
    }

    /// Recompute the reputation score from activity:
    /// base 50, up to +20 for markets created, up to +30 for volume,
    /// capped at 100.
    pub fn recompute_reputation(&mut self) {
        let base = Decimal::from(50);
        let market_bonus =
            (Decimal::from(self.total_markets_created) * Decimal::from(2)).min(Decimal::from(20));
        let volume_bonus = (self.total_volume * Decimal::new(1, 1)).min(Decimal::from(30));

        self.reputation_score = (base + market_bonus + volume_bonus).min(Decimal::ONE_HUNDRED);
    }

    pub fn stats(&self) -> CreatorStats {
        let average_volume_per_market = if self.total_markets_created > 0 {
            (self.total_volume / Decimal::from(self.total_markets_created)).round_dp(6)
        } else {
            Decimal::ZERO
        };

        CreatorStats {
            markets_created: self.total_markets_created,
            total_volume: self.total_volume,
            reputation_score: self.reputation_score,
            average_volume_per_market,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
