use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::password;
use crate::db::is_unique_violation;
use crate::state::AppState;

/// How an account authenticates. A user either carries a password hash or
/// belongs to an external provider, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    Password { hash: String },
    OAuth { provider: String },
}

/// User record in the database.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub auth: AuthMethod,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub created_at: OffsetDateTime,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let password_hash: Option<String> = row.try_get("password_hash")?;
        let oauth_provider: Option<String> = row.try_get("oauth_provider")?;
        let auth = match (password_hash, oauth_provider) {
            (Some(hash), None) => AuthMethod::Password { hash },
            (None, Some(provider)) => AuthMethod::OAuth { provider },
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "password_hash".into(),
                    source: "user row must set exactly one of password_hash, oauth_provider".into(),
                })
            }
        };
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            auth,
            name: row.try_get("name")?,
            picture: row.try_get("picture")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, oauth_provider, name, picture, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create_password(
        db: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, oauth_provider, name, picture, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn create_oauth(
        db: &PgPool,
        email: &str,
        provider: &str,
        name: Option<&str>,
        picture: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, oauth_provider, name, picture)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, oauth_provider, name, picture, created_at
            "#,
        )
        .bind(email)
        .bind(provider)
        .bind(name)
        .bind(picture)
        .fetch_one(db)
        .await
    }

    /// Return the user for a verified provider email, creating the account on
    /// first sign-in. A concurrent first sign-in loses the insert race and
    /// picks up the row the winner created.
    pub async fn find_or_create_oauth(
        db: &PgPool,
        email: &str,
        provider: &str,
        name: Option<&str>,
        picture: Option<&str>,
    ) -> anyhow::Result<User> {
        if let Some(user) = Self::find_by_email(db, email).await? {
            return Ok(user);
        }
        match Self::create_oauth(db, email, provider, name, picture).await {
            Ok(user) => {
                info!(user_id = %user.id, %provider, "user created from oauth sign-in");
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => Self::find_by_email(db, email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("user vanished after insert conflict")),
            Err(e) => Err(e.into()),
        }
    }
}

/// Create the configured admin account if it does not exist yet. A no-op
/// unless both ADMIN_EMAIL and ADMIN_PASSWORD are set.
pub async fn bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let (Some(email), Some(pass)) = (
        state.config.admin_email.as_deref(),
        state.config.admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    let email = email.trim().to_lowercase();
    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Ok(());
    }

    let hash = password::hash_password(pass)?;
    match User::create_password(&state.db, &email, &hash).await {
        Ok(user) => {
            info!(user_id = %user.id, "admin user bootstrapped");
            Ok(())
        }
        // Another instance may have won the startup race.
        Err(e) if is_unique_violation(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
