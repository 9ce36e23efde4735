use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Creator, CreatorStats, User, UserStats};
use crate::AppState;

use super::ApiResponse;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RegisterCreatorRequest {
    pub creator_id: String,
    pub native_token_address: String,
    pub social_handle: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub user_id: String,
    pub farcaster_id: String,
    pub wallet_address: String,
    pub display_name: Option<String>,
}

#[derive(Serialize)]
pub struct CreatorView {
    #[serde(flatten)]
    pub creator: Creator,
    pub preferred_name: String,
    pub stats: CreatorStats,
}

#[derive(Serialize)]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    pub stats: UserStats,
}

fn creator_view(creator: Creator) -> CreatorView {
    CreatorView {
        preferred_name: creator.preferred_name(),
        stats: creator.stats(),
        creator,
    }
}

fn user_view(user: User) -> UserView {
    UserView {
        stats: user.stats(),
        user,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/creators
pub async fn register_creator(
    State(state): State<AppState>,
    Json(body): Json<RegisterCreatorRequest>,
) -> Result<Json<ApiResponse<CreatorView>>, AppError> {
    let creator = Creator::new(
        body.creator_id,
        body.native_token_address,
        body.social_handle,
        body.display_name,
    );
    let creator = state.engine.register_creator(creator).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(creator_view(creator)),
        error: None,
    }))
}

/// GET /api/creators/{id}
pub async fn creator_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CreatorView>>, AppError> {
    let creator = state.engine.get_creator(&id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(creator_view(creator)),
        error: None,
    }))
}

/// POST /api/users
pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, AppError> {
    let user = User::new(
        body.user_id,
        body.farcaster_id,
        body.wallet_address,
        body.display_name,
    );
    let user = state.engine.register_user(user).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(user_view(user)),
        error: None,
    }))
}

/// GET /api/users/{id}
pub async fn user_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserView>>, AppError> {
    let user = state.engine.get_user(&id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: Some(user_view(user)),
        error: None,
    }))
}
