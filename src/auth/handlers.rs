use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{GoogleAuthRequest, GoogleAuthResponse, LoginRequest, PublicUser, TokenResponse},
        google::VerifyError,
        jwt::JwtKeys,
        password::verify_password,
        repo::{AuthMethod, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/auth/google", post(google_login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email, wrong password and password-less (OAuth) accounts all
    // fail with the same message.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::BadCredentials);
        }
    };

    let AuthMethod::Password { ref hash } = user.auth else {
        warn!(user_id = %user.id, "login attempt against oauth account");
        return Err(ApiError::BadCredentials);
    };

    if !verify_password(&payload.password, hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::BadCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state, payload))]
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<Json<GoogleAuthResponse>, ApiError> {
    let id_token = payload.token.trim();
    if id_token.is_empty() {
        return Err(ApiError::Validation("token is required".into()));
    }

    let verifier = state.google.as_ref().ok_or_else(|| {
        ApiError::Misconfigured("GOOGLE_CLIENT_ID is not configured on the server.".into())
    })?;

    let identity = verifier.verify(id_token).await.map_err(|e| match e {
        VerifyError::InvalidToken(_) => ApiError::Unauthorized(e.to_string()),
        VerifyError::Provider(inner) => ApiError::Internal(inner),
    })?;

    let user = User::find_or_create_oauth(
        &state.db,
        &identity.email,
        "google",
        identity.name.as_deref(),
        identity.picture.as_deref(),
    )
    .await?;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, google_sub = %identity.subject, "google sign-in");
    Ok(Json(GoogleAuthResponse {
        user: PublicUser {
            id: user.id,
            email: user.email,
            name: user.name,
            picture: user.picture,
        },
        access_token: token,
        token_type: "bearer".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::google::{IdTokenVerifier, VerifiedIdentity};
    use async_trait::async_trait;

    struct RejectingVerifier;

    #[async_trait]
    impl IdTokenVerifier for RejectingVerifier {
        async fn verify(&self, _token: &str) -> Result<VerifiedIdentity, VerifyError> {
            Err(VerifyError::InvalidToken("bad signature".into()))
        }
    }

    #[tokio::test]
    async fn google_login_without_client_id_is_a_server_error() {
        let state = AppState::fake();
        let err = google_login(
            State(state),
            Json(GoogleAuthRequest { token: "some-token".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Misconfigured(_)));
        assert_eq!(
            err.to_string(),
            "GOOGLE_CLIENT_ID is not configured on the server."
        );
    }

    #[tokio::test]
    async fn google_login_requires_a_token() {
        let state = AppState::fake();
        let err = google_login(State(state), Json(GoogleAuthRequest { token: "  ".into() }))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn google_login_rejects_an_invalid_token() {
        let mut state = AppState::fake();
        state.google = Some(std::sync::Arc::new(RejectingVerifier));
        let err = google_login(
            State(state),
            Json(GoogleAuthRequest { token: "forged".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Invalid Google token: bad signature");
    }
}
