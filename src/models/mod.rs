pub mod creator;
pub mod market;
pub mod prediction;
pub mod user;

pub use creator::{Creator, CreatorStats};
pub use market::{Market, Outcome};
pub use prediction::Prediction;
pub use user::{User, UserStats};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MarketStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Pending,
    Active,
    Resolved,
    Cancelled,
    /// Derived at read time when the betting window has closed without a
    /// resolution. Never written back to the store.
    Expired,
}

impl MarketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MarketStatus::Resolved | MarketStatus::Cancelled)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketStatus::Pending => write!(f, "pending"),
            MarketStatus::Active => write!(f, "active"),
            MarketStatus::Resolved => write!(f, "resolved"),
            MarketStatus::Cancelled => write!(f, "cancelled"),
            MarketStatus::Expired => write!(f, "expired"),
        }
    }
}

// ---------------------------------------------------------------------------
// PredictionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Pending,
    Won,
    Lost,
    Cancelled,
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionStatus::Pending => write!(f, "pending"),
            PredictionStatus::Won => write!(f, "won"),
            PredictionStatus::Lost => write!(f, "lost"),
            PredictionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ---------------------------------------------------------------------------
// ResolutionMethod
// ---------------------------------------------------------------------------

/// How a market's final outcome is decided. Only creator resolution is
/// implemented; the other variants are accepted and stored for forward
/// compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    Creator,
    Oracle,
    Other,
}

impl Default for ResolutionMethod {
    fn default() -> Self {
        ResolutionMethod::Creator
    }
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionMethod::Creator => write!(f, "creator"),
            ResolutionMethod::Oracle => write!(f, "oracle"),
            ResolutionMethod::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(MarketStatus::Resolved.is_terminal());
        assert!(MarketStatus::Cancelled.is_terminal());
        assert!(!MarketStatus::Pending.is_terminal());
        assert!(!MarketStatus::Active.is_terminal());
        assert!(!MarketStatus::Expired.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MarketStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&PredictionStatus::Won).unwrap(),
            "\"won\""
        );
        assert_eq!(
            serde_json::to_string(&ResolutionMethod::Creator).unwrap(),
            "\"creator\""
        );
    }
}
