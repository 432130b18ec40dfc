// src/handbook/overrides.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tokio::sync::RwLock;

use super::key::ContentKey;
use crate::error::AppError;

/// Admin-authored handbook markup that shadows backend content.
///
/// Only the admin editor writes here; readers take a [`snapshot`] before
/// resolving so the resolver itself never touches storage.
///
/// [`snapshot`]: LocalOverrideStore::snapshot
#[async_trait]
pub trait LocalOverrideStore: Send + Sync {
    async fn get(&self, key: &ContentKey) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &ContentKey, html: &str) -> Result<(), AppError>;

    /// Returns whether an override existed.
    async fn clear(&self, key: &ContentKey) -> Result<bool, AppError>;

    async fn snapshot(&self) -> Result<HashMap<ContentKey, String>, AppError>;
}

/// Process-local store, used in tests and when no database is wanted.
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    entries: RwLock<HashMap<ContentKey, String>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalOverrideStore for MemoryOverrideStore {
    async fn get(&self, key: &ContentKey) -> Result<Option<String>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &ContentKey, html: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .await
            .insert(key.clone(), html.to_string());
        Ok(())
    }

    async fn clear(&self, key: &ContentKey) -> Result<bool, AppError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn snapshot(&self) -> Result<HashMap<ContentKey, String>, AppError> {
        Ok(self.entries.read().await.clone())
    }
}

#[derive(FromRow)]
struct OverrideRow {
    content_key: String,
    html: String,
}

/// Overrides persisted in the `handbook_overrides` table.
#[derive(Debug, Clone)]
pub struct SqlOverrideStore {
    pool: SqlitePool,
}

impl SqlOverrideStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocalOverrideStore for SqlOverrideStore {
    async fn get(&self, key: &ContentKey) -> Result<Option<String>, AppError> {
        let html = sqlx::query_scalar::<_, String>(
            "SELECT html FROM handbook_overrides WHERE content_key = ?",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(html)
    }

    async fn set(&self, key: &ContentKey, html: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO handbook_overrides (content_key, html, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (content_key)
            DO UPDATE SET html = excluded.html, updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(html)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save handbook override: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(())
    }

    async fn clear(&self, key: &ContentKey) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM handbook_overrides WHERE content_key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn snapshot(&self) -> Result<HashMap<ContentKey, String>, AppError> {
        let rows = sqlx::query_as::<_, OverrideRow>(
            "SELECT content_key, html FROM handbook_overrides",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (ContentKey::new(&row.content_key), row.html))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn sql_store() -> SqlOverrideStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        SqlOverrideStore::new(pool)
    }

    async fn exercise(store: &dyn LocalOverrideStore) {
        let roverx = ContentKey::new("roverx");

        assert_eq!(store.get(&roverx).await.unwrap(), None);

        store.set(&roverx, "<p>v1</p>").await.unwrap();
        store.set(&roverx, "<p>v2</p>").await.unwrap();
        assert_eq!(store.get(&roverx).await.unwrap().as_deref(), Some("<p>v2</p>"));

        store.set(&ContentKey::new("ninjas"), "<p>n</p>").await.unwrap();
        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[&roverx], "<p>v2</p>");

        assert!(store.clear(&roverx).await.unwrap());
        assert!(!store.clear(&roverx).await.unwrap());
        assert_eq!(store.get(&roverx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        exercise(&MemoryOverrideStore::new()).await;
    }

    #[tokio::test]
    async fn sql_store_round_trip() {
        exercise(&sql_store().await).await;
    }
}
