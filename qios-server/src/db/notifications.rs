//! Notification feed database operations

use shared::models::{Notification, NotificationKind};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::util::snowflake_id;

/// Notification to append
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub async fn insert(
    conn: &mut PgConnection,
    store_id: i64,
    notification: &NewNotification,
    now: i64,
) -> Result<Notification, BoxError> {
    let row = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, store_id, kind, title, message, is_read, created_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6)
        RETURNING id, store_id, kind, title, message, is_read, created_at
        "#,
    )
    .bind(snowflake_id())
    .bind(store_id)
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// Append several notifications in one statement
pub async fn insert_many(
    conn: &mut PgConnection,
    store_id: i64,
    notifications: &[NewNotification],
    now: i64,
) -> Result<(), BoxError> {
    if notifications.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = notifications.iter().map(|_| snowflake_id()).collect();
    let kinds: Vec<NotificationKind> = notifications.iter().map(|n| n.kind).collect();
    let titles: Vec<String> = notifications.iter().map(|n| n.title.clone()).collect();
    let messages: Vec<String> = notifications.iter().map(|n| n.message.clone()).collect();
    sqlx::query(
        r#"
        INSERT INTO notifications (id, store_id, kind, title, message, is_read, created_at)
        SELECT d.id, $5, d.kind, d.title, d.message, FALSE, $6
        FROM UNNEST($1::bigint[], $2::notification_kind[], $3::text[], $4::text[])
            AS d(id, kind, title, message)
        "#,
    )
    .bind(&ids)
    .bind(&kinds)
    .bind(&titles)
    .bind(&messages)
    .bind(store_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    store_id: i64,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<Notification>, BoxError> {
    let rows = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, store_id, kind, title, message, is_read, created_at
        FROM notifications
        WHERE store_id = $1 AND (NOT $2 OR NOT is_read)
        ORDER BY created_at DESC, id DESC
        LIMIT $3
        "#,
    )
    .bind(store_id)
    .bind(unread_only)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Number of unread rows of the store, independent of any list filter
pub async fn unread_count(pool: &PgPool, store_id: i64) -> Result<i64, BoxError> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE store_id = $1 AND NOT is_read")
            .bind(store_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// Mark the given ids (or all when `None`) of the store as read
pub async fn mark_read(
    pool: &PgPool,
    store_id: i64,
    ids: Option<&[i64]>,
) -> Result<u64, BoxError> {
    let result = match ids {
        Some(ids) => {
            sqlx::query(
                "UPDATE notifications SET is_read = TRUE
                 WHERE store_id = $1 AND id = ANY($2) AND NOT is_read",
            )
            .bind(store_id)
            .bind(ids)
            .execute(pool)
            .await?
        }
        None => {
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE store_id = $1 AND NOT is_read")
                .bind(store_id)
                .execute(pool)
                .await?
        }
    };
    Ok(result.rows_affected())
}
