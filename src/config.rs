use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Audience for Google ID-token verification. Google login is disabled
    /// until this is set.
    pub google_client_id: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "financeos".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "financeos-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        // The frontend build injects the Vite-prefixed name; accept both.
        let google_client_id = non_empty("GOOGLE_CLIENT_ID").or_else(|| non_empty("VITE_GOOGLE_CLIENT_ID"));
        Ok(Self {
            database_url,
            jwt,
            google_client_id,
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
        })
    }
}
