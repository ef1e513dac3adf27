//! Durable cart persistence. One snapshot row per session key, written after
//! every mutation and read once when a session's cart is first touched.

use async_trait::async_trait;

use crate::db::DbPool;

use super::CartLine;

/// Narrow contract over the snapshot slot. Both operations may fail; the
/// registry decides what failure means (load failure yields an empty cart,
/// save failure is swallowed and logged).
#[async_trait]
pub trait CartStorage: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<CartLine>>>;
    async fn save(&self, key: &str, lines: &[CartLine]) -> anyhow::Result<()>;
}

/// Snapshot storage backed by the `cart_snapshots` table: the serialized
/// line collection is the sole JSONB value under the session key.
pub struct PgCartStorage {
    pool: DbPool,
}

impl PgCartStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStorage for PgCartStorage {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<CartLine>>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT snapshot FROM cart_snapshots WHERE session_key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(None),
            Some((value,)) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn save(&self, key: &str, lines: &[CartLine]) -> anyhow::Result<()> {
        let snapshot = serde_json::to_value(lines)?;
        sqlx::query(
            r#"
            INSERT INTO cart_snapshots (session_key, snapshot, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (session_key)
            DO UPDATE SET snapshot = EXCLUDED.snapshot, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(snapshot)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
