use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Creator, Market, Prediction, User};

/// In-memory store for markets, predictions, and profiles.
///
/// Cloning is cheap; all clones share the same underlying maps. Records are
/// cloned on the way in and out, so callers never hold references into the
/// store and each save replaces the record wholesale.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    markets: HashMap<Uuid, Market>,
    predictions: HashMap<Uuid, Prediction>,
    creators: HashMap<String, Creator>,
    users: HashMap<String, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }

    // -----------------------------------------------------------------------
    // Markets
    // -----------------------------------------------------------------------

    pub async fn save_market(&self, market: Market) {
        let mut inner = self.inner.write().await;
        inner.markets.insert(market.market_id, market);
    }

    pub async fn load_market(&self, market_id: Uuid) -> Option<Market> {
        let inner = self.inner.read().await;
        inner.markets.get(&market_id).cloned()
    }

    /// All markets, oldest first. Ordering is deterministic for equal
    /// timestamps.
    pub async fn list_markets(&self) -> Vec<Market> {
        let inner = self.inner.read().await;
        let mut markets: Vec<Market> = inner.markets.values().cloned().collect();
        markets.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.market_id.cmp(&b.market_id))
        });
        markets
    }

    // -----------------------------------------------------------------------
    // Predictions
    // -----------------------------------------------------------------------

    pub async fn save_prediction(&self, prediction: Prediction) {
        let mut inner = self.inner.write().await;
        inner
            .predictions
            .insert(prediction.prediction_id, prediction);
    }

    pub async fn load_prediction(&self, prediction_id: Uuid) -> Option<Prediction> {
        let inner = self.inner.read().await;
        inner.predictions.get(&prediction_id).cloned()
    }

    /// Every prediction placed on the given market, oldest first.
    pub async fn list_predictions(&self, market_id: Uuid) -> Vec<Prediction> {
        let inner = self.inner.read().await;
        let mut predictions: Vec<Prediction> = inner
            .predictions
            .values()
            .filter(|p| p.market_id == market_id)
            .cloned()
            .collect();
        sort_predictions(&mut predictions);
        predictions
    }

    /// Every prediction placed by the given user, oldest first.
    pub async fn list_predictions_for_user(&self, user_id: &str) -> Vec<Prediction> {
        let inner = self.inner.read().await;
        let mut predictions: Vec<Prediction> = inner
            .predictions
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        sort_predictions(&mut predictions);
        predictions
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub async fn save_creator(&self, creator: Creator) {
        let mut inner = self.inner.write().await;
        inner.creators.insert(creator.creator_id.clone(), creator);
    }

    pub async fn load_creator(&self, creator_id: &str) -> Option<Creator> {
        let inner = self.inner.read().await;
        inner.creators.get(creator_id).cloned()
    }

    /// Mutate a creator record in place under the store lock. Returns false
    /// when no such creator exists.
    pub async fn update_creator(&self, creator_id: &str, f: impl FnOnce(&mut Creator)) -> bool {
        let mut inner = self.inner.write().await;
        match inner.creators.get_mut(creator_id) {
            Some(creator) => {
                f(creator);
                creator.touch();
                true
            }
            None => false,
        }
    }

    pub async fn save_user(&self, user: User) {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.user_id.clone(), user);
    }

    pub async fn load_user(&self, user_id: &str) -> Option<User> {
        let inner = self.inner.read().await;
        inner.users.get(user_id).cloned()
    }

    /// Mutate a user record in place under the store lock. Returns false
    /// when no such user exists.
    pub async fn update_user(&self, user_id: &str, f: impl FnOnce(&mut User)) -> bool {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(user_id) {
            Some(user) => {
                f(user);
                user.touch();
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_predictions(predictions: &mut [Prediction]) {
    predictions.sort_by(|a, b| {
        a.placed_at
            .cmp(&b.placed_at)
            .then_with(|| a.prediction_id.cmp(&b.prediction_id))
    });
}
