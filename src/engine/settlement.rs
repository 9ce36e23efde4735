//! Prediction settlement: marking bets won or lost once their market
//! resolves, cancelling them when it is called off, and guarding the
//! one-shot reward claim.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::EngineError;
use crate::models::{Market, MarketStatus, Prediction, PredictionStatus};

/// Settle every pending prediction on a resolved market.
///
/// Predictions whose `selected_outcome` matches the winner go to `won`,
/// the rest to `lost`. Rewards are not recomputed here; each prediction
/// keeps the reward frozen at bet time. Returns `(won, lost)` counts.
pub fn resolve_predictions(
    market: &Market,
    predictions: &mut [Prediction],
) -> Result<(usize, usize), EngineError> {
    let winner = match (&market.status, &market.resolved_outcome) {
        (MarketStatus::Resolved, Some(winner)) => winner.as_str(),
        _ => {
            return Err(EngineError::InvalidTransition {
                action: "settle predictions for",
                status: market.status,
            })
        }
    };

    let now = Utc::now();
    let mut won = 0usize;
    let mut lost = 0usize;

    for prediction in predictions
        .iter_mut()
        .filter(|p| p.market_id == market.market_id && p.status == PredictionStatus::Pending)
    {
        if prediction.selected_outcome == winner {
            prediction.status = PredictionStatus::Won;
            won += 1;
        } else {
            prediction.status = PredictionStatus::Lost;
            lost += 1;
        }
        prediction.resolved_at = Some(now);
        prediction.touch();
    }

    Ok((won, lost))
}

/// Cancel every pending prediction on a cancelled market.
///
/// Returns the ids of the predictions cancelled by this call; their bet
/// amounts are refund-eligible. Refund transfer itself is the caller's
/// concern.
pub fn cancel_predictions(
    market: &Market,
    predictions: &mut [Prediction],
) -> Result<Vec<Uuid>, EngineError> {
    if market.status != MarketStatus::Cancelled {
        return Err(EngineError::InvalidTransition {
            action: "cancel predictions for",
            status: market.status,
        });
    }

    let mut refund_eligible = Vec::new();
    for prediction in predictions
        .iter_mut()
        .filter(|p| p.market_id == market.market_id && p.status == PredictionStatus::Pending)
    {
        prediction.status = PredictionStatus::Cancelled;
        prediction.touch();
        refund_eligible.push(prediction.prediction_id);
    }

    Ok(refund_eligible)
}

/// Flip `reward_claimed` exactly once on a won prediction.
pub fn claim_reward(prediction: &mut Prediction) -> Result<(), EngineError> {
    if prediction.status != PredictionStatus::Won {
        return Err(EngineError::NotWon {
            status: prediction.status,
        });
    }
    if prediction.reward_claimed {
        return Err(EngineError::AlreadyClaimed);
    }

    prediction.reward_claimed = true;
    prediction.claimed_at = Some(Utc::now());
    prediction.touch();
    Ok(())
}

/// Realized profit: reward minus stake, defined only once a won prediction
/// has claimed. Everything else reads 0 by convention.
pub fn profit(prediction: &Prediction) -> Decimal {
    if prediction.status == PredictionStatus::Won && prediction.reward_claimed {
        prediction.potential_reward - prediction.bet_amount
    } else {
        Decimal::ZERO
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lifecycle::{activate, cancel, resolve};
    use crate::models::ResolutionMethod;
    use chrono::Duration;

    fn active_market() -> Market {
        let now = Utc::now();
        let mut market = Market::new(
            "creator_1",
            "Which side wins?",
            vec!["Yes".to_string(), "No".to_string()],
            now - Duration::hours(1),
            now + Duration::hours(23),
            Decimal::from(5),
            ResolutionMethod::Creator,
        );
        activate(&mut market).unwrap();
        market
    }

    fn prediction_on(market: &Market, outcome_id: &str) -> Prediction {
        Prediction::new(
            market.market_id,
            "user_1",
            outcome_id,
            Decimal::ONE,
            Decimal::from(2),
        )
    }

    #[test]
    fn test_resolution_splits_won_and_lost() {
        let mut market = active_market();
        let mut predictions = vec![
            prediction_on(&market, "1"),
            prediction_on(&market, "2"),
            prediction_on(&market, "1"),
        ];
        resolve(&mut market, "1").unwrap();

        let (won, lost) = resolve_predictions(&market, &mut predictions).unwrap();
        assert_eq!((won, lost), (2, 1));

        assert_eq!(predictions[0].status, PredictionStatus::Won);
        assert_eq!(predictions[1].status, PredictionStatus::Lost);
        assert_eq!(predictions[2].status, PredictionStatus::Won);
        assert!(predictions.iter().all(|p| p.resolved_at.is_some()));

        // Snapshots survive settlement untouched.
        assert!(predictions
            .iter()
            .all(|p| p.bet_amount == Decimal::ONE && p.potential_reward == Decimal::from(2)));
    }

    #[test]
    fn test_resolution_requires_resolved_market() {
        let market = active_market();
        let mut predictions = vec![prediction_on(&market, "1")];

        let err = resolve_predictions(&market, &mut predictions).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
        assert_eq!(predictions[0].status, PredictionStatus::Pending);
    }

    #[test]
    fn test_resolution_skips_foreign_and_settled() {
        let mut market = active_market();
        let other = active_market();

        let mut predictions = vec![prediction_on(&market, "1"), prediction_on(&other, "1")];
        predictions.push({
            let mut p = prediction_on(&market, "2");
            p.status = PredictionStatus::Cancelled;
            p
        });
        resolve(&mut market, "1").unwrap();

        let (won, lost) = resolve_predictions(&market, &mut predictions).unwrap();
        assert_eq!((won, lost), (1, 0));
        assert_eq!(predictions[1].status, PredictionStatus::Pending);
        assert_eq!(predictions[2].status, PredictionStatus::Cancelled);
    }

    #[test]
    fn test_cancellation_reports_refund_eligible() {
        let mut market = active_market();
        let mut predictions = vec![prediction_on(&market, "1"), prediction_on(&market, "2")];
        predictions[1].status = PredictionStatus::Lost;

        cancel(&mut market).unwrap();
        let refunds = cancel_predictions(&market, &mut predictions).unwrap();

        assert_eq!(refunds, vec![predictions[0].prediction_id]);
        assert_eq!(predictions[0].status, PredictionStatus::Cancelled);
        assert_eq!(predictions[1].status, PredictionStatus::Lost);
    }

    #[test]
    fn test_cancellation_requires_cancelled_market() {
        let market = active_market();
        let mut predictions = vec![prediction_on(&market, "1")];

        assert!(matches!(
            cancel_predictions(&market, &mut predictions).unwrap_err(),
            EngineError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_claim_flips_exactly_once() {
        let market = active_market();
        let mut prediction = prediction_on(&market, "1");
        prediction.status = PredictionStatus::Won;

        claim_reward(&mut prediction).unwrap();
        assert!(prediction.reward_claimed);
        assert!(prediction.claimed_at.is_some());

        assert!(matches!(
            claim_reward(&mut prediction).unwrap_err(),
            EngineError::AlreadyClaimed
        ));
    }

    #[test]
    fn test_claim_requires_win() {
        let market = active_market();
        let mut prediction = prediction_on(&market, "1");
        prediction.status = PredictionStatus::Lost;

        assert!(matches!(
            claim_reward(&mut prediction).unwrap_err(),
            EngineError::NotWon {
                status: PredictionStatus::Lost,
            }
        ));
        assert!(!prediction.reward_claimed);
    }

    #[test]
    fn test_profit_only_after_claim() {
        let market = active_market();
        let mut prediction = prediction_on(&market, "1");

        assert_eq!(profit(&prediction), Decimal::ZERO);

        prediction.status = PredictionStatus::Won;
        assert_eq!(profit(&prediction), Decimal::ZERO);

        claim_reward(&mut prediction).unwrap();
        assert_eq!(profit(&prediction), Decimal::ONE); // 2.0 reward - 1.0 stake

        prediction.status = PredictionStatus::Lost;
        assert_eq!(profit(&prediction), Decimal::ZERO);
    }
}
