use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{lifecycle, Cancellation, CreateMarketSpec, OddsSnapshot};
use crate::errors::AppError;
use crate::models::{Market, MarketStatus, ResolutionMethod};
use crate::AppState;

use super::ApiResponse;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateMarketRequest {
    pub creator_id: String,
    pub outcome_description: String,
    /// Outcome labels, in display order.
    pub outcomes: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Window length applied when `end_date` is omitted.
    pub duration_hours: Option<i64>,
    pub creator_fee: Option<Decimal>,
    pub resolution_method: Option<ResolutionMethod>,
}

#[derive(Deserialize)]
pub struct ResolveRequest {
    pub outcome_id: String,
}

#[derive(Deserialize)]
pub struct ListMarketsQuery {
    /// Filter on the time-derived status, not the persisted one.
    pub status: Option<MarketStatus>,
}

/// Market as returned to clients: the stored record plus the time-derived
/// status and remaining window.
#[derive(Serialize)]
pub struct MarketView {
    #[serde(flatten)]
    pub market: Market,
    pub current_status: MarketStatus,
    pub time_remaining_secs: i64,
}

#[derive(Serialize)]
pub struct CancellationView {
    pub market: MarketView,
    pub refund_eligible: Vec<Uuid>,
}

pub(super) fn market_view(market: Market) -> MarketView {
    let now = Utc::now();
    MarketView {
        current_status: lifecycle::current_status(&market, now),
        time_remaining_secs: market.time_remaining(now).num_seconds(),
        market,
    }
}

fn cancellation_view(cancellation: Cancellation) -> CancellationView {
    CancellationView {
        market: market_view(cancellation.market),
        refund_eligible: cancellation.refund_eligible,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/markets: create a market, pending until activated
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateMarketRequest>,
) -> Result<Json<ApiResponse<MarketView>>, AppError> {
    let start_date = body.start_date.unwrap_or_else(Utc::now);
    let end_date = body.end_date.unwrap_or_else(|| {
        let hours = body
            .duration_hours
            .unwrap_or(state.config.default_market_duration_hours);
        start_date + Duration::hours(hours)
    });

    let spec = CreateMarketSpec {
        creator_id: body.creator_id,
        outcome_description: body.outcome_description,
        outcome_labels: body.outcomes,
        start_date,
        end_date,
        creator_fee: body.creator_fee.unwrap_or(state.config.default_creator_fee),
        resolution_method: body.resolution_method.unwrap_or_default(),
    };

    let market = state.engine.create_market(spec).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(market_view(market)),
        error: None,
    }))
}

/// GET /api/markets: all markets, oldest first, optionally filtered by
/// derived status (`?status=active`)
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListMarketsQuery>,
) -> Result<Json<ApiResponse<Vec<MarketView>>>, AppError> {
    let markets = state.engine.list_markets().await;
    let views = markets
        .into_iter()
        .map(market_view)
        .filter(|v| query.status.map_or(true, |wanted| v.current_status == wanted))
        .collect();

    Ok(Json(ApiResponse {
        success: true,
        data: Some(views),
        error: None,
    }))
}

/// GET /api/markets/active: markets currently open for betting
pub async fn list_active(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MarketView>>>, AppError> {
    let markets = state.engine.list_active_markets().await;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(markets.into_iter().map(market_view).collect()),
        error: None,
    }))
}

/// GET /api/markets/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MarketView>>, AppError> {
    let market = state.engine.get_market(id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(market_view(market)),
        error: None,
    }))
}

/// POST /api/markets/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MarketView>>, AppError> {
    let market = state.engine.activate_market(id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(market_view(market)),
        error: None,
    }))
}

/// POST /api/markets/{id}/resolve: settle the market to one outcome
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<ApiResponse<MarketView>>, AppError> {
    let market = state.engine.resolve_market(id, &body.outcome_id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(market_view(market)),
        error: None,
    }))
}

/// POST /api/markets/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CancellationView>>, AppError> {
    let cancellation = state.engine.cancel_market(id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(cancellation_view(cancellation)),
        error: None,
    }))
}

/// GET /api/markets/{id}/odds: per-outcome odds snapshot
pub async fn odds(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OddsSnapshot>>, AppError> {
    let snapshot = state.engine.get_odds(id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(snapshot),
        error: None,
    }))
}
