use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{lifecycle, pool, settlement, EngineError};
use crate::models::{
    Creator, Market, MarketStatus, Prediction, ResolutionMethod, User,
};
use crate::store::MemoryStore;
use crate::validation;

/// Caller-supplied description of a market to create.
#[derive(Debug, Clone)]
pub struct CreateMarketSpec {
    pub creator_id: String,
    pub outcome_description: String,
    pub outcome_labels: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub creator_fee: Decimal,
    pub resolution_method: ResolutionMethod,
}

/// Per-outcome odds as observed at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeOdds {
    pub outcome_id: String,
    pub label: String,
    pub stake: Decimal,
    pub odds: Decimal,
    pub probability: Decimal,
}

/// Read-time view of a market's pool shape.
#[derive(Debug, Clone, Serialize)]
pub struct OddsSnapshot {
    pub market_id: Uuid,
    pub status: MarketStatus,
    pub total_pool: Decimal,
    pub outcomes: Vec<OutcomeOdds>,
    pub as_of: DateTime<Utc>,
}

/// Result of a market cancellation: the cancelled market plus the ids of
/// predictions whose stake is now refund-eligible.
#[derive(Debug, Clone)]
pub struct Cancellation {
    pub market: Market,
    pub refund_eligible: Vec<Uuid>,
}

/// One async mutex per market id.
///
/// All writes to a market and its predictions run under that market's lock,
/// while different markets proceed in parallel. Entries are kept for the
/// life of the process: reward claims still need exclusivity after their
/// market turns terminal.
#[derive(Clone, Default)]
struct LockRegistry {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl LockRegistry {
    async fn acquire(&self, market_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(market_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Facade over the lifecycle, pool, and settlement layers.
///
/// Owns the per-market locking discipline; the layers underneath stay pure
/// so they can be tested without a store.
#[derive(Clone)]
pub struct MarketEngine {
    store: MemoryStore,
    locks: LockRegistry,
}

impl MarketEngine {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            locks: LockRegistry::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Markets
    // -----------------------------------------------------------------------

    /// Validate and persist a new market. Starts pending regardless of the
    /// requested window.
    pub async fn create_market(&self, spec: CreateMarketSpec) -> Result<Market, EngineError> {
        let market = Market::new(
            spec.creator_id,
            spec.outcome_description,
            spec.outcome_labels,
            spec.start_date,
            spec.end_date,
            spec.creator_fee,
            spec.resolution_method,
        );

        let report = validation::validate_market(&market);
        if !report.is_valid {
            return Err(EngineError::Validation(report.errors));
        }

        self.store.save_market(market.clone()).await;

        // Creator counters only move when a profile is registered.
        self.store
            .update_creator(&market.creator_id, |creator| {
                creator.total_markets_created += 1;
                creator.recompute_reputation();
            })
            .await;

        counter!("markets_created_total").increment(1);
        tracing::info!(
            market_id = %market.market_id,
            creator = %market.creator_id,
            outcomes = market.outcomes.len(),
            "Market created"
        );

        Ok(market)
    }

    pub async fn activate_market(&self, market_id: Uuid) -> Result<Market, EngineError> {
        let _guard = self.locks.acquire(market_id).await;

        let mut market = self
            .store
            .load_market(market_id)
            .await
            .ok_or(EngineError::MarketNotFound(market_id))?;

        lifecycle::activate(&mut market)?;
        self.store.save_market(market.clone()).await;

        gauge!("markets_active").increment(1.0);
        tracing::info!(market_id = %market_id, "Market activated");

        Ok(market)
    }

    /// Resolve an active market to `outcome_id` and settle every pending
    /// prediction on it in the same critical section.
    pub async fn resolve_market(
        &self,
        market_id: Uuid,
        outcome_id: &str,
    ) -> Result<Market, EngineError> {
        let _guard = self.locks.acquire(market_id).await;

        let mut market = self
            .store
            .load_market(market_id)
            .await
            .ok_or(EngineError::MarketNotFound(market_id))?;

        lifecycle::resolve(&mut market, outcome_id)?;

        let mut predictions = self.store.list_predictions(market_id).await;
        let (won, lost) = settlement::resolve_predictions(&market, &mut predictions)?;

        self.store.save_market(market.clone()).await;
        for prediction in predictions {
            self.store.save_prediction(prediction).await;
        }

        counter!("markets_resolved_total").increment(1);
        gauge!("markets_active").decrement(1.0);
        tracing::info!(
            market_id = %market_id,
            outcome = %outcome_id,
            won,
            lost,
            "Market resolved"
        );

        Ok(market)
    }

    /// Cancel a market and every pending prediction on it. The returned
    /// prediction ids are refund-eligible; moving the money back is the
    /// caller's concern.
    pub async fn cancel_market(&self, market_id: Uuid) -> Result<Cancellation, EngineError> {
        let _guard = self.locks.acquire(market_id).await;

        let mut market = self
            .store
            .load_market(market_id)
            .await
            .ok_or(EngineError::MarketNotFound(market_id))?;

        let was_active = market.status == MarketStatus::Active;
        lifecycle::cancel(&mut market)?;

        let mut predictions = self.store.list_predictions(market_id).await;
        let refund_eligible = settlement::cancel_predictions(&market, &mut predictions)?;

        self.store.save_market(market.clone()).await;
        for prediction in predictions {
            self.store.save_prediction(prediction).await;
        }

        counter!("markets_cancelled_total").increment(1);
        if was_active {
            gauge!("markets_active").decrement(1.0);
        }
        tracing::info!(
            market_id = %market_id,
            refunds = refund_eligible.len(),
            "Market cancelled"
        );

        Ok(Cancellation {
            market,
            refund_eligible,
        })
    }

    pub async fn get_market(&self, market_id: Uuid) -> Result<Market, EngineError> {
        self.store
            .load_market(market_id)
            .await
            .ok_or(EngineError::MarketNotFound(market_id))
    }

    pub async fn list_markets(&self) -> Vec<Market> {
        self.store.list_markets().await
    }

    /// Markets currently open for betting.
    pub async fn list_active_markets(&self) -> Vec<Market> {
        let now = Utc::now();
        self.store
            .list_markets()
            .await
            .into_iter()
            .filter(|market| lifecycle::is_open_for_bets(market, now))
            .collect()
    }

    /// Unlocked read of the market's pool shape at `now`.
    pub async fn get_odds(&self, market_id: Uuid) -> Result<OddsSnapshot, EngineError> {
        let market = self
            .store
            .load_market(market_id)
            .await
            .ok_or(EngineError::MarketNotFound(market_id))?;

        let now = Utc::now();
        Ok(OddsSnapshot {
            market_id: market.market_id,
            status: lifecycle::current_status(&market, now),
            total_pool: market.total_pool,
            outcomes: market
                .outcomes
                .iter()
                .map(|o| OutcomeOdds {
                    outcome_id: o.id.clone(),
                    label: o.label.clone(),
                    stake: o.stake,
                    odds: o.odds,
                    probability: o.probability,
                })
                .collect(),
            as_of: now,
        })
    }

    // -----------------------------------------------------------------------
    // Bets
    // -----------------------------------------------------------------------

    /// Place a bet on an open market.
    ///
    /// The returned prediction carries the odds the outcome showed before
    /// this stake landed; its reward never moves afterwards.
    pub async fn place_bet(
        &self,
        market_id: Uuid,
        outcome_id: &str,
        amount: Decimal,
        user_id: &str,
    ) -> Result<Prediction, EngineError> {
        let result = self
            .place_bet_inner(market_id, outcome_id, amount, user_id)
            .await;

        match &result {
            Ok(prediction) => {
                counter!("bets_placed_total").increment(1);
                histogram!("bet_amount").record(prediction.bet_amount.to_f64().unwrap_or(0.0));
            }
            Err(err) => {
                counter!("bets_rejected_total").increment(1);
                tracing::debug!(
                    market_id = %market_id,
                    outcome = %outcome_id,
                    error = %err,
                    "Bet rejected"
                );
            }
        }

        result
    }

    async fn place_bet_inner(
        &self,
        market_id: Uuid,
        outcome_id: &str,
        amount: Decimal,
        user_id: &str,
    ) -> Result<Prediction, EngineError> {
        // 1. Structural checks before any lock is taken.
        let report = validation::validate_bet(user_id, outcome_id, amount);
        if !report.is_valid {
            return Err(EngineError::Validation(report.errors));
        }
        let amount = amount.round_dp(pool::AMOUNT_SCALE);

        // 2. Read-modify-write of the pool under the market lock.
        let _guard = self.locks.acquire(market_id).await;

        let mut market = self
            .store
            .load_market(market_id)
            .await
            .ok_or(EngineError::MarketNotFound(market_id))?;

        let sold_at = pool::apply_bet(&mut market, outcome_id, amount, Utc::now())?;
        let prediction = Prediction::new(market_id, user_id, outcome_id, amount, sold_at);

        // Final structural guard on the record about to be persisted.
        let report = validation::validate_prediction(&prediction);
        if !report.is_valid {
            return Err(EngineError::Validation(report.errors));
        }

        self.store.save_market(market.clone()).await;
        self.store.save_prediction(prediction.clone()).await;

        // 3. Profile counters, when the profiles exist.
        self.store
            .update_user(user_id, |user| {
                user.total_bets_placed += 1;
            })
            .await;
        self.store
            .update_creator(&market.creator_id, |creator| {
                creator.total_volume += amount;
                creator.recompute_reputation();
            })
            .await;

        tracing::info!(
            market_id = %market_id,
            outcome = %outcome_id,
            user = %user_id,
            amount = %amount,
            odds = %sold_at,
            pool = %market.total_pool,
            "Bet accepted"
        );

        Ok(prediction)
    }

    // -----------------------------------------------------------------------
    // Predictions
    // -----------------------------------------------------------------------

    pub async fn get_prediction(&self, prediction_id: Uuid) -> Result<Prediction, EngineError> {
        self.store
            .load_prediction(prediction_id)
            .await
            .ok_or(EngineError::PredictionNotFound(prediction_id))
    }

    pub async fn list_predictions(&self, market_id: Uuid) -> Result<Vec<Prediction>, EngineError> {
        if self.store.load_market(market_id).await.is_none() {
            return Err(EngineError::MarketNotFound(market_id));
        }
        Ok(self.store.list_predictions(market_id).await)
    }

    pub async fn list_user_predictions(&self, user_id: &str) -> Vec<Prediction> {
        self.store.list_predictions_for_user(user_id).await
    }

    /// Claim the reward on a won prediction, exactly once.
    pub async fn claim_reward(&self, prediction_id: Uuid) -> Result<Prediction, EngineError> {
        // Find the owning market first; the claim itself runs under that
        // market's lock, re-reading the prediction so two concurrent claims
        // cannot both observe it unclaimed.
        let market_id = self
            .store
            .load_prediction(prediction_id)
            .await
            .ok_or(EngineError::PredictionNotFound(prediction_id))?
            .market_id;

        let _guard = self.locks.acquire(market_id).await;

        let mut prediction = self
            .store
            .load_prediction(prediction_id)
            .await
            .ok_or(EngineError::PredictionNotFound(prediction_id))?;

        settlement::claim_reward(&mut prediction)?;
        self.store.save_prediction(prediction.clone()).await;

        self.store
            .update_user(&prediction.user_id, |user| {
                user.total_rewards_earned += prediction.potential_reward;
            })
            .await;

        counter!("rewards_claimed_total").increment(1);
        tracing::info!(
            prediction_id = %prediction_id,
            user = %prediction.user_id,
            reward = %prediction.potential_reward,
            "Reward claimed"
        );

        Ok(prediction)
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub async fn register_creator(&self, creator: Creator) -> Result<Creator, EngineError> {
        let report = validation::validate_creator(&creator);
        if !report.is_valid {
            return Err(EngineError::Validation(report.errors));
        }
        self.store.save_creator(creator.clone()).await;
        tracing::info!(creator = %creator.creator_id, "Creator registered");
        Ok(creator)
    }

    pub async fn get_creator(&self, creator_id: &str) -> Result<Creator, EngineError> {
        self.store
            .load_creator(creator_id)
            .await
            .ok_or_else(|| EngineError::CreatorNotFound(creator_id.to_string()))
    }

    pub async fn register_user(&self, user: User) -> Result<User, EngineError> {
        let report = validation::validate_user(&user);
        if !report.is_valid {
            return Err(EngineError::Validation(report.errors));
        }
        self.store.save_user(user.clone()).await;
        tracing::info!(user = %user.user_id, "User registered");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, EngineError> {
        self.store
            .load_user(user_id)
            .await
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PredictionStatus;
    use chrono::Duration;

    fn engine() -> MarketEngine {
        MarketEngine::new(MemoryStore::new())
    }

    fn open_spec(creator: &str) -> CreateMarketSpec {
        let now = Utc::now();
        CreateMarketSpec {
            creator_id: creator.to_string(),
            outcome_description: "Will the release ship on time?".to_string(),
            outcome_labels: vec!["Yes".to_string(), "No".to_string()],
            start_date: now - Duration::hours(1),
            end_date: now + Duration::hours(23),
            creator_fee: Decimal::from(5),
            resolution_method: ResolutionMethod::Creator,
        }
    }

    #[tokio::test]
    async fn test_full_market_flow() {
        let engine = engine();

        let market = engine.create_market(open_spec("creator_1")).await.unwrap();
        assert_eq!(market.status, MarketStatus::Pending);

        engine.activate_market(market.market_id).await.unwrap();

        let winning = engine
            .place_bet(market.market_id, "1", Decimal::ONE, "alice")
            .await
            .unwrap();
        // Sold at the pre-bet default.
        assert_eq!(winning.odds, Decimal::ONE);

        engine
            .place_bet(market.market_id, "2", Decimal::ONE, "bob")
            .await
            .unwrap();

        let odds = engine.get_odds(market.market_id).await.unwrap();
        assert_eq!(odds.total_pool, Decimal::from(2));
        assert!(odds
            .outcomes
            .iter()
            .all(|o| o.odds == Decimal::from(2) && o.probability == Decimal::from(50)));

        let resolved = engine.resolve_market(market.market_id, "1").await.unwrap();
        assert_eq!(resolved.status, MarketStatus::Resolved);

        let claimed = engine.claim_reward(winning.prediction_id).await.unwrap();
        assert!(claimed.reward_claimed);
        assert_eq!(claimed.potential_reward, Decimal::ONE); // 1.0 × 1 odds

        let bob_predictions = engine.list_user_predictions("bob").await;
        assert_eq!(bob_predictions.len(), 1);
        assert_eq!(bob_predictions[0].status, PredictionStatus::Lost);
    }

    #[tokio::test]
    async fn test_create_market_validation() {
        let engine = engine();
        let mut spec = open_spec("creator_1");
        spec.outcome_labels = vec!["Only".to_string()];

        let err = engine.create_market(spec).await.unwrap_err();
        match err {
            EngineError::Validation(errors) => {
                assert_eq!(errors, vec!["At least 2 outcomes are required"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert!(engine.list_markets().await.is_empty());
    }

    #[tokio::test]
    async fn test_bet_requires_activation() {
        let engine = engine();
        let market = engine.create_market(open_spec("creator_1")).await.unwrap();

        let err = engine
            .place_bet(market.market_id, "1", Decimal::ONE, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MarketClosed { .. }));
    }

    #[tokio::test]
    async fn test_bet_on_missing_market() {
        let engine = engine();
        let err = engine
            .place_bet(Uuid::new_v4(), "1", Decimal::ONE, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MarketNotFound(_)));
    }

    #[tokio::test]
    async fn test_claim_requires_win() {
        let engine = engine();
        let market = engine.create_market(open_spec("creator_1")).await.unwrap();
        engine.activate_market(market.market_id).await.unwrap();

        let losing = engine
            .place_bet(market.market_id, "2", Decimal::ONE, "alice")
            .await
            .unwrap();
        engine.resolve_market(market.market_id, "1").await.unwrap();

        let err = engine.claim_reward(losing.prediction_id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::NotWon {
                status: PredictionStatus::Lost,
            }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_claims_single_winner() {
        let engine = engine();
        let market = engine.create_market(open_spec("creator_1")).await.unwrap();
        engine.activate_market(market.market_id).await.unwrap();

        let prediction = engine
            .place_bet(market.market_id, "1", Decimal::ONE, "alice")
            .await
            .unwrap();
        engine.resolve_market(market.market_id, "1").await.unwrap();

        let a = {
            let engine = engine.clone();
            let id = prediction.prediction_id;
            tokio::spawn(async move { engine.claim_reward(id).await })
        };
        let b = {
            let engine = engine.clone();
            let id = prediction.prediction_id;
            tokio::spawn(async move { engine.claim_reward(id).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(EngineError::AlreadyClaimed))));
    }

    #[tokio::test]
    async fn test_cancellation_reports_refunds() {
        let engine = engine();
        let market = engine.create_market(open_spec("creator_1")).await.unwrap();
        engine.activate_market(market.market_id).await.unwrap();

        let prediction = engine
            .place_bet(market.market_id, "1", Decimal::ONE, "alice")
            .await
            .unwrap();

        let cancellation = engine.cancel_market(market.market_id).await.unwrap();
        assert_eq!(cancellation.market.status, MarketStatus::Cancelled);
        assert_eq!(cancellation.refund_eligible, vec![prediction.prediction_id]);

        let stored = engine
            .get_prediction(prediction.prediction_id)
            .await
            .unwrap();
        assert_eq!(stored.status, PredictionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_pending_market_without_bets() {
        let engine = engine();
        let market = engine.create_market(open_spec("creator_1")).await.unwrap();

        let cancellation = engine.cancel_market(market.market_id).await.unwrap();
        assert!(cancellation.refund_eligible.is_empty());
    }

    #[tokio::test]
    async fn test_profile_counters_follow_activity() {
        let engine = engine();
        engine
            .register_creator(Creator::new("creator_1", "0xT", "@maker", None))
            .await
            .unwrap();
        engine
            .register_user(User::new("alice", "fc_alice", "0xA", None))
            .await
            .unwrap();

        let market = engine.create_market(open_spec("creator_1")).await.unwrap();
        engine.activate_market(market.market_id).await.unwrap();
        let prediction = engine
            .place_bet(market.market_id, "1", Decimal::from(10), "alice")
            .await
            .unwrap();
        engine.resolve_market(market.market_id, "1").await.unwrap();
        engine.claim_reward(prediction.prediction_id).await.unwrap();

        let creator = engine.get_creator("creator_1").await.unwrap();
        assert_eq!(creator.total_markets_created, 1);
        assert_eq!(creator.total_volume, Decimal::from(10));
        // 50 base + 2 for the market + 1 for the volume.
        assert_eq!(creator.reputation_score, Decimal::from(53));

        let user = engine.get_user("alice").await.unwrap();
        assert_eq!(user.total_bets_placed, 1);
        assert_eq!(user.total_rewards_earned, prediction.potential_reward);
    }

    #[tokio::test]
    async fn test_active_listing_tracks_window_and_status() {
        let engine = engine();

        let open = engine.create_market(open_spec("creator_1")).await.unwrap();
        engine.activate_market(open.market_id).await.unwrap();

        // Activated but already past its window.
        let now = Utc::now();
        let mut stale_spec = open_spec("creator_1");
        stale_spec.start_date = now - Duration::hours(48);
        stale_spec.end_date = now - Duration::hours(24);
        let stale = engine.create_market(stale_spec).await.unwrap();
        engine.activate_market(stale.market_id).await.unwrap();

        // Never activated.
        engine.create_market(open_spec("creator_1")).await.unwrap();

        let active = engine.list_active_markets().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].market_id, open.market_id);
    }
}
