//! Core betting engine: market lifecycle, pari-mutuel pool math,
//! prediction settlement, and the service facade that ties them to a store.

pub mod lifecycle;
pub mod pool;
pub mod service;
pub mod settlement;

pub use service::{Cancellation, CreateMarketSpec, MarketEngine, OddsSnapshot, OutcomeOdds};

use thiserror::Error;
use uuid::Uuid;

use crate::models::{MarketStatus, PredictionStatus};

/// Rejection produced by an engine operation. Every variant is deterministic
/// for a given input and state; no operation leaves partial mutations behind
/// when it returns an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("cannot {action} a market in status {status}")]
    InvalidTransition {
        action: &'static str,
        status: MarketStatus,
    },

    #[error("market is not open for betting (status: {status})")]
    MarketClosed { status: MarketStatus },

    #[error("market {market_id} has no outcome '{outcome_id}'")]
    UnknownOutcome {
        market_id: Uuid,
        outcome_id: String,
    },

    #[error("prediction has not won (status: {status})")]
    NotWon { status: PredictionStatus },

    #[error("reward already claimed")]
    AlreadyClaimed,

    #[error("market {0} not found")]
    MarketNotFound(Uuid),

    #[error("prediction {0} not found")]
    PredictionNotFound(Uuid),

    #[error("creator {0} not found")]
    CreatorNotFound(String),

    #[error("user {0} not found")]
    UserNotFound(String),
}
