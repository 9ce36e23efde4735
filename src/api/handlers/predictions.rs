use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::settlement;
use crate::errors::AppError;
use crate::models::Prediction;
use crate::AppState;

use super::ApiResponse;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PlaceBetRequest {
    pub outcome_id: String,
    pub amount: Decimal,
    pub user_id: String,
}

/// Prediction as returned to clients: the stored record plus realized
/// profit (zero until a won prediction has claimed).
#[derive(Serialize)]
pub struct PredictionView {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub can_claim: bool,
    pub profit: Decimal,
}

fn prediction_view(prediction: Prediction) -> PredictionView {
    PredictionView {
        can_claim: prediction.can_claim(),
        profit: settlement::profit(&prediction),
        prediction,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/markets/{id}/bets: place a bet on an open market
pub async fn place_bet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PlaceBetRequest>,
) -> Result<Json<ApiResponse<PredictionView>>, AppError> {
    let prediction = state
        .engine
        .place_bet(id, &body.outcome_id, body.amount, &body.user_id)
        .await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(prediction_view(prediction)),
        error: None,
    }))
}

/// GET /api/markets/{id}/predictions
pub async fn list_for_market(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PredictionView>>>, AppError> {
    let predictions = state.engine.list_predictions(id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(predictions.into_iter().map(prediction_view).collect()),
        error: None,
    }))
}

/// GET /api/users/{id}/predictions
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<PredictionView>>>, AppError> {
    let predictions = state.engine.list_user_predictions(&user_id).await;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(predictions.into_iter().map(prediction_view).collect()),
        error: None,
    }))
}

/// GET /api/predictions/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PredictionView>>, AppError> {
    let prediction = state.engine.get_prediction(id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(prediction_view(prediction)),
        error: None,
    }))
}

/// POST /api/predictions/{id}/claim: one-shot reward claim
pub async fn claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PredictionView>>, AppError> {
    let prediction = state.engine.claim_reward(id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(prediction_view(prediction)),
        error: None,
    }))
}
