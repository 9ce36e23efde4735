//! Structural validation for markets, predictions, and profiles.
//!
//! Every check is pure and side-effect free: it inspects a record and
//! returns a [`ValidationReport`] listing each problem found, in a stable
//! order. Callers decide what to do with an invalid report.

use rust_decimal::Decimal;

use crate::models::{Creator, Market, Prediction, User};

/// Outcome of a validation pass. `errors` is ordered and deterministic for
/// a given input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a market before it is persisted.
pub fn validate_market(market: &Market) -> ValidationReport {
    let mut errors = Vec::new();

    if market.creator_id.trim().is_empty() {
        errors.push("Creator ID is required".to_string());
    }
    if market.outcome_description.trim().is_empty() {
        errors.push("Outcome description is required".to_string());
    }
    if market.outcomes.len() < 2 {
        errors.push("At least 2 outcomes are required".to_string());
    }
    if market.end_date <= market.start_date {
        errors.push("End date must be after start date".to_string());
    }
    if market.creator_fee < Decimal::ZERO || market.creator_fee > Decimal::ONE_HUNDRED {
        errors.push("Creator fee must be between 0 and 100".to_string());
    }

    for (index, outcome) in market.outcomes.iter().enumerate() {
        let position = index + 1;
        if outcome.label.trim().is_empty() {
            errors.push(format!("Outcome {position} label is required"));
        }
        if outcome.odds <= Decimal::ZERO {
            errors.push(format!("Outcome {position} odds must be greater than 0"));
        }
        if outcome.probability < Decimal::ZERO || outcome.probability > Decimal::ONE_HUNDRED {
            errors.push(format!(
                "Outcome {position} probability must be between 0 and 100"
            ));
        }
    }

    ValidationReport::from_errors(errors)
}

/// Validate the caller-supplied parts of a bet before a prediction is built.
pub fn validate_bet(user_id: &str, outcome_id: &str, amount: Decimal) -> ValidationReport {
    let mut errors = Vec::new();

    if user_id.trim().is_empty() {
        errors.push("User ID is required".to_string());
    }
    if outcome_id.trim().is_empty() {
        errors.push("Selected outcome is required".to_string());
    }
    if amount <= Decimal::ZERO {
        errors.push("Bet amount must be greater than 0".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Validate a fully built prediction record.
pub fn validate_prediction(prediction: &Prediction) -> ValidationReport {
    let mut errors = Vec::new();

    if prediction.market_id.is_nil() {
        errors.push("Market ID is required".to_string());
    }
    if prediction.user_id.trim().is_empty() {
        errors.push("User ID is required".to_string());
    }
    if prediction.selected_outcome.trim().is_empty() {
        errors.push("Selected outcome is required".to_string());
    }
    if prediction.bet_amount <= Decimal::ZERO {
        errors.push("Bet amount must be greater than 0".to_string());
    }
    if prediction.odds <= Decimal::ZERO {
        errors.push("Odds must be greater than 0".to_string());
    }
    if prediction.potential_reward < Decimal::ZERO {
        errors.push("Potential reward cannot be negative".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Validate a creator profile.
pub fn validate_creator(creator: &Creator) -> ValidationReport {
    let mut errors = Vec::new();

    if creator.creator_id.trim().is_empty() {
        errors.push("Creator ID is required".to_string());
    }
    if creator.native_token_address.trim().is_empty() {
        errors.push("Native token address is required".to_string());
    }
    if creator.social_handle.trim().is_empty() {
        errors.push("Social handle is required".to_string());
    }
    if creator.total_markets_created < 0 {
        errors.push("Total markets created cannot be negative".to_string());
    }
    if creator.total_volume < Decimal::ZERO {
        errors.push("Total volume cannot be negative".to_string());
    }
    if creator.reputation_score < Decimal::ZERO || creator.reputation_score > Decimal::ONE_HUNDRED
    {
        errors.push("Reputation score must be between 0 and 100".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Validate a bettor profile.
pub fn validate_user(user: &User) -> ValidationReport {
    let mut errors = Vec::new();

    if user.user_id.trim().is_empty() {
        errors.push("User ID is required".to_string());
    }
    if user.farcaster_id.trim().is_empty() {
        errors.push("Farcaster ID is required".to_string());
    }
    if user.wallet_address.trim().is_empty() {
        errors.push("Wallet address is required".to_string());
    }
    if user.token_balance < Decimal::ZERO {
        errors.push("Token balance cannot be negative".to_string());
    }
    if user.total_bets_placed < 0 {
        errors.push("Total bets placed cannot be negative".to_string());
    }
    if user.total_rewards_earned < Decimal::ZERO {
        errors.push("Total rewards earned cannot be negative".to_string());
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResolutionMethod;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn sample_market() -> Market {
        let now = Utc::now();
        Market::new(
            "creator_1",
            "Will it rain tomorrow?",
            vec!["Yes".to_string(), "No".to_string()],
            now,
            now + Duration::hours(24),
            Decimal::from(5),
            ResolutionMethod::Creator,
        )
    }

    #[test]
    fn test_valid_market_passes() {
        let report = validate_market(&sample_market());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_invalid_market_collects_ordered_errors() {
        let now = Utc::now();
        let mut market = Market::new(
            "",
            "",
            vec!["".to_string()],
            now,
            now - Duration::hours(1),
            Decimal::from(150),
            ResolutionMethod::Creator,
        );
        market.outcomes[0].odds = Decimal::ZERO;
        market.outcomes[0].probability = Decimal::from(120);

        let report = validate_market(&market);
        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![
                "Creator ID is required",
                "Outcome description is required",
                "At least 2 outcomes are required",
                "End date must be after start date",
                "Creator fee must be between 0 and 100",
                "Outcome 1 label is required",
                "Outcome 1 odds must be greater than 0",
                "Outcome 1 probability must be between 0 and 100",
            ]
        );
    }

    #[test]
    fn test_bet_amount_must_be_positive() {
        let report = validate_bet("user_1", "1", Decimal::ZERO);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["Bet amount must be greater than 0"]);
    }

    #[test]
    fn test_bet_missing_fields() {
        let report = validate_bet("", "", Decimal::from(1));
        assert_eq!(
            report.errors,
            vec!["User ID is required", "Selected outcome is required"]
        );
    }

    #[test]
    fn test_valid_prediction_passes() {
        let prediction = Prediction::new(
            Uuid::new_v4(),
            "user_1",
            "1",
            Decimal::ONE,
            Decimal::from(2),
        );
        assert!(validate_prediction(&prediction).is_valid);
    }

    #[test]
    fn test_prediction_with_nil_market_rejected() {
        let prediction = Prediction::new(Uuid::nil(), "user_1", "1", Decimal::ONE, Decimal::ONE);
        let report = validate_prediction(&prediction);
        assert_eq!(report.errors, vec!["Market ID is required"]);
    }

    #[test]
    fn test_creator_reputation_bounds() {
        let mut creator = Creator::new("creator_1", "0xT", "@h", None);
        creator.reputation_score = Decimal::from(101);
        let report = validate_creator(&creator);
        assert_eq!(
            report.errors,
            vec!["Reputation score must be between 0 and 100"]
        );
    }

    #[test]
    fn test_user_negative_counters_rejected() {
        let mut user = User::new("user_1", "fc_1", "0xW", None);
        user.token_balance = Decimal::from(-1);
        user.total_bets_placed = -2;
        let report = validate_user(&user);
        assert_eq!(
            report.errors,
            vec![
                "Token balance cannot be negative",
                "Total bets placed cannot be negative",
            ]
        );
    }
}
