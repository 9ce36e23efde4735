use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use creatorbets::engine::{CreateMarketSpec, MarketEngine};
use creatorbets::models::{Market, ResolutionMethod};
use creatorbets::store::MemoryStore;

#[allow(dead_code)]
pub fn test_engine() -> MarketEngine {
    MarketEngine::new(MemoryStore::new())
}

/// Two-outcome Yes/No market whose window opened an hour ago.
#[allow(dead_code)]
pub fn open_spec(creator: &str) -> CreateMarketSpec {
    let now = Utc::now();
    CreateMarketSpec {
        creator_id: creator.to_string(),
        outcome_description: "Will the feature ship this sprint?".to_string(),
        outcome_labels: vec!["Yes".to_string(), "No".to_string()],
        start_date: now - Duration::hours(1),
        end_date: now + Duration::hours(23),
        creator_fee: Decimal::from(5),
        resolution_method: ResolutionMethod::Creator,
    }
}

/// Create and activate a market ready to take bets.
#[allow(dead_code)]
pub async fn open_market(engine: &MarketEngine, creator: &str) -> Market {
    let market = engine
        .create_market(open_spec(creator))
        .await
        .expect("Failed to create market");
    engine
        .activate_market(market.market_id)
        .await
        .expect("Failed to activate market")
}

#[allow(dead_code)]
pub fn dec(s: &str) -> Decimal {
    s.parse().expect("Failed to parse decimal literal")
}
