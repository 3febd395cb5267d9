use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    domain::{errors::TransportResult, value_objects::AttachmentCategory},
    ports::repositories::AttachmentCatalog,
};

/// SQL-based implementation of AttachmentCatalog using PostgreSQL
#[derive(Clone)]
pub struct SqlAttachmentCatalog {
    pool: PgPool,
}

impl SqlAttachmentCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        Ok(Self::new(PgPool::connect(url).await?))
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attachments (
                id BIGSERIAL PRIMARY KEY,
                file_key VARCHAR(1024) NOT NULL,
                type VARCHAR(32) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (file_key, type)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AttachmentCatalog for SqlAttachmentCatalog {
    async fn exists_by_key_and_category(
        &self,
        key: &str,
        category: AttachmentCategory,
    ) -> TransportResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attachments WHERE file_key = $1 AND type = $2")
                .bind(key)
                .bind(category.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    async fn record(&self, key: &str, category: AttachmentCategory) -> TransportResult<()> {
        sqlx::query(
            "INSERT INTO attachments (file_key, type) VALUES ($1, $2) ON CONFLICT (file_key, type) DO NOTHING",
        )
        .bind(key)
        .bind(category.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str, category: AttachmentCategory) -> TransportResult<()> {
        sqlx::query("DELETE FROM attachments WHERE file_key = $1 AND type = $2")
            .bind(key)
            .bind(category.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
