use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for Google sign-in: the raw ID token from the frontend.
#[derive(Debug, Deserialize)]
pub struct GoogleAuthRequest {
    #[serde(default)]
    pub token: String,
}

/// Bearer token returned after any successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
        }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Response for Google sign-in: the user plus a session token.
#[derive(Debug, Serialize)]
pub struct GoogleAuthResponse {
    pub user: PublicUser,
    pub access_token: String,
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_uses_bearer_type() {
        let resp = TokenResponse::bearer("abc".into());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["access_token"], "abc");
        assert_eq!(json["token_type"], "bearer");
    }

    #[test]
    fn google_request_tolerates_missing_token_field() {
        let req: GoogleAuthRequest = serde_json::from_str("{}").unwrap();
        assert!(req.token.is_empty());
    }

    #[test]
    fn public_user_serializes_optional_fields_as_null() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            name: None,
            picture: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "test@example.com");
        assert!(json["name"].is_null());
        assert!(json["picture"].is_null());
    }
}
