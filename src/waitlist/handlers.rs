use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    db::is_unique_violation,
    error::ApiError,
    state::AppState,
    validate::is_valid_email,
    waitlist::{
        dto::{JoinWaitlistRequest, WaitlistResponse},
        repo::WaitlistEntry,
    },
};

pub fn waitlist_routes() -> Router<AppState> {
    Router::new().route("/waitlist", post(join_waitlist))
}

#[instrument(skip(state, payload))]
pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(mut payload): Json<JoinWaitlistRequest>,
) -> Result<(StatusCode, Json<WaitlistResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let entry = match WaitlistEntry::create(&state.db, &payload.email).await {
        Ok(entry) => entry,
        // Duplicate signups must be told apart from storage failures.
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email already on waitlist");
            return Err(ApiError::AlreadyRegistered);
        }
        Err(e) => return Err(ApiError::Internal(e.into())),
    };

    info!(entry_id = %entry.id, "waitlist signup");
    Ok((
        StatusCode::CREATED,
        Json(WaitlistResponse {
            id: entry.id,
            email: entry.email,
            message: "Successfully joined the waitlist!".into(),
        }),
    ))
}
