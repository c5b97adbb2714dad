use serde::{Deserialize, Serialize};
use sqlx::{types::Decimal, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A user-owned financial holding.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Asset {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        asset_type: &str,
        amount: Decimal,
        description: Option<&str>,
    ) -> anyhow::Result<Asset> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (user_id, asset_type, amount, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, asset_type, amount, description, created_at
            "#,
        )
        .bind(user_id)
        .bind(asset_type)
        .bind(amount)
        .bind(description)
        .fetch_one(db)
        .await?;
        Ok(asset)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Asset>> {
        let rows = sqlx::query_as::<_, Asset>(
            r#"
            SELECT id, user_id, asset_type, amount, description, created_at
            FROM assets
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_type_serializes_under_the_type_key() {
        let asset = Asset {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            asset_type: "crypto".into(),
            amount: "0.5".parse().unwrap(),
            description: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "crypto");
        assert!(json.get("asset_type").is_none());
    }
}
