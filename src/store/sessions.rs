// src/store/sessions.rs

use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::session::{HandbookEntry, Session, end_of_day},
    upstream::LoginOutcome,
};

/// Persists a freshly signed-in session and returns it.
pub async fn create_session(
    pool: &SqlitePool,
    id: &str,
    login: LoginOutcome,
    handbooks: Vec<HandbookEntry>,
    now: DateTime<Utc>,
) -> Result<Session, AppError> {
    let session = Session {
        id: id.to_string(),
        email: login.email,
        name: login.name,
        role: login.role,
        status: login.status,
        tabs: Json(login.tabs),
        sheets: Json(login.sheets),
        handbooks: Json(handbooks),
        created_at: now,
        expires_at: end_of_day(now),
    };

    sqlx::query(
        r#"
        INSERT INTO sessions
            (id, email, name, role, status, tabs, sheets, handbooks, created_at, expires_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(&session.email)
    .bind(&session.name)
    .bind(&session.role)
    .bind(&session.status)
    .bind(&session.tabs)
    .bind(&session.sheets)
    .bind(&session.handbooks)
    .bind(session.created_at)
    .bind(session.expires_at)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create session: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(session)
}

/// Loads a live session. Expired rows are treated as missing and removed.
pub async fn find_session(
    pool: &SqlitePool,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, email, name, role, status, tabs, sheets, handbooks, created_at, expires_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match session {
        Some(session) if session.is_expired(now) => {
            delete_session(pool, id).await?;
            Ok(None)
        }
        other => Ok(other),
    }
}

pub async fn delete_session(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Drops every session past its expiry. Returns how many were removed.
pub async fn purge_expired(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handbook::ContentKey, models::session::PanelFlags};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn login() -> LoginOutcome {
        LoginOutcome {
            email: "staff@example.test".into(),
            name: "Staff".into(),
            role: "Staff".into(),
            status: "approved".into(),
            tabs: PanelFlags {
                leave: true,
                ..PanelFlags::default()
            },
            sheets: Vec::new(),
        }
    }

    fn handbooks() -> Vec<HandbookEntry> {
        vec![HandbookEntry {
            key: ContentKey::new("roverx"),
            company: "Rover X".into(),
            html: "<p>hi</p>".into(),
        }]
    }

    #[tokio::test]
    async fn stored_sessions_round_trip() {
        let pool = pool().await;
        let now = Utc::now();
        create_session(&pool, "abc", login(), handbooks(), now).await.unwrap();

        let loaded = find_session(&pool, "abc", now).await.unwrap().unwrap();
        assert_eq!(loaded.email, "staff@example.test");
        assert!(loaded.tabs.leave);
        assert_eq!(loaded.handbooks.0, handbooks());
        assert!(loaded.is_approved());

        assert!(delete_session(&pool, "abc").await.unwrap());
        assert!(find_session(&pool, "abc", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let pool = pool().await;
        let now = Utc::now();
        let session = create_session(&pool, "old", login(), Vec::new(), now).await.unwrap();

        let later = session.expires_at + chrono::Duration::seconds(1);
        assert!(find_session(&pool, "old", later).await.unwrap().is_none());
        assert!(!delete_session(&pool, "old").await.unwrap());
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let pool = pool().await;
        let now = Utc::now();
        let session = create_session(&pool, "a", login(), Vec::new(), now).await.unwrap();
        create_session(&pool, "b", login(), Vec::new(), now + chrono::Duration::days(2))
            .await
            .unwrap();

        let removed = purge_expired(&pool, session.expires_at + chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(find_session(&pool, "b", now).await.unwrap().is_some());
    }
}
