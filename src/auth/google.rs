use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

// Google issues `iss` in both bare and https forms.
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims extracted from a verified ID token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The token itself is bad: the caller gets a 401.
    #[error("Invalid Google token: {0}")]
    InvalidToken(String),
    /// The provider side failed (certs unreachable etc.): the caller gets a 500.
    #[error("Token verification failed: {0}")]
    Provider(#[from] anyhow::Error),
}

/// Seam for identity verification so handlers can be exercised with a stub.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError>;
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

/// Verifies Google ID tokens against Google's published signing keys.
///
/// Keys are cached in-process and refreshed whenever a token arrives with an
/// unknown `kid` (Google rotates them every few days).
pub struct GoogleVerifier {
    client_id: String,
    certs_url: String,
    http: reqwest::Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl GoogleVerifier {
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            certs_url: GOOGLE_CERTS_URL.to_string(),
            http: reqwest::Client::new(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }
        self.refresh_keys().await?;
        self.keys
            .read()
            .await
            .get(kid)
            .cloned()
            .ok_or_else(|| VerifyError::InvalidToken(format!("unknown key id {kid}")))
    }

    async fn refresh_keys(&self) -> Result<(), VerifyError> {
        let set: JwkSet = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .context("fetch google signing keys")?
            .error_for_status()
            .context("fetch google signing keys")?
            .json()
            .await
            .context("parse google signing keys")?;

        let mut map = HashMap::with_capacity(set.keys.len());
        for jwk in set.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    map.insert(jwk.kid, key);
                }
                Err(e) => warn!(error = %e, kid = %jwk.kid, "skipping malformed jwk"),
            }
        }
        debug!(count = map.len(), "google signing keys refreshed");
        *self.keys.write().await = map;
        Ok(())
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        let header = decode_header(token).map_err(|e| VerifyError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::InvalidToken("missing key id".into()))?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(std::slice::from_ref(&self.client_id));
        validation.set_issuer(&GOOGLE_ISSUERS);

        let data = decode::<GoogleClaims>(token, &key, &validation)
            .map_err(|e| VerifyError::InvalidToken(e.to_string()))?;

        let claims = data.claims;
        debug!(subject = %claims.sub, "google id token verified");
        Ok(VerifiedIdentity {
            subject: claims.sub,
            email: claims.email.trim().to_lowercase(),
            name: claims.name,
            picture: claims.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_parse_with_optional_profile_fields_absent() {
        let claims: GoogleClaims =
            serde_json::from_str(r#"{"sub":"1234567890","email":"A@Example.COM"}"#).unwrap();
        assert_eq!(claims.sub, "1234567890");
        assert!(claims.name.is_none());
        assert!(claims.picture.is_none());
    }

    #[test]
    fn claims_parse_with_full_profile() {
        let claims: GoogleClaims = serde_json::from_str(
            r#"{"sub":"42","email":"u@example.com","name":"U","picture":"https://p/img.png","aud":"x","iss":"accounts.google.com"}"#,
        )
        .unwrap();
        assert_eq!(claims.name.as_deref(), Some("U"));
        assert_eq!(claims.picture.as_deref(), Some("https://p/img.png"));
    }

    #[test]
    fn jwk_set_parses_google_cert_document() {
        let set: JwkSet = serde_json::from_str(
            r#"{"keys":[{"kty":"RSA","alg":"RS256","use":"sig","kid":"abc","n":"0vx7agoebGcQ","e":"AQAB"}]}"#,
        )
        .unwrap();
        assert_eq!(set.keys.len(), 1);
        assert_eq!(set.keys[0].kid, "abc");
        assert_eq!(set.keys[0].e, "AQAB");
    }

    #[tokio::test]
    async fn verify_rejects_a_non_jwt_token() {
        let verifier = GoogleVerifier::new("client-id".into());
        let err = verifier.verify("definitely-not-a-jwt").await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidToken(_)));
        assert!(err.to_string().starts_with("Invalid Google token:"));
    }

    #[tokio::test]
    async fn verify_rejects_a_token_without_kid() {
        // HS256 token with no kid in the header; must be refused before any
        // network traffic happens.
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &serde_json::json!({"sub": "x", "exp": 4102444800u64}),
            &jsonwebtoken::EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        let verifier = GoogleVerifier::new("client-id".into());
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidToken(_)));
        assert!(err.to_string().contains("missing key id"));
    }
}
