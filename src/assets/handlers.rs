use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    assets::{dto::CreateAssetRequest, repo::Asset},
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
};

pub fn asset_routes() -> Router<AppState> {
    Router::new().route("/assets", post(create_asset).get(list_assets))
}

#[instrument(skip(state, payload))]
pub async fn create_asset(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<Asset>), ApiError> {
    let asset_type = payload.asset_type.trim();
    if asset_type.is_empty() {
        return Err(ApiError::Validation("type must not be empty".into()));
    }

    let asset = Asset::create(
        &state.db,
        user_id,
        asset_type,
        payload.amount,
        payload.description.as_deref(),
    )
    .await?;

    info!(asset_id = %asset.id, user_id = %user_id, "asset recorded");
    Ok((StatusCode::CREATED, Json(asset)))
}

#[instrument(skip(state))]
pub async fn list_assets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Asset>>, ApiError> {
    let assets = Asset::list_by_user(&state.db, user_id).await?;
    Ok(Json(assets))
}
