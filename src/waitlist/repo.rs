use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A pre-launch signup. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    pub created_at: OffsetDateTime,
}

impl WaitlistEntry {
    pub async fn create(db: &PgPool, email: &str) -> Result<WaitlistEntry, sqlx::Error> {
        sqlx::query_as::<_, WaitlistEntry>(
            r#"
            INSERT INTO waitlist (email)
            VALUES ($1)
            RETURNING id, email, created_at
            "#,
        )
        .bind(email)
        .fetch_one(db)
        .await
    }
}
