//! User database operations

use shared::models::{User, UserRole};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

/// User row including the password hash (never serialized)
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub role: UserRole,
    pub created_at: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, BoxError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, store_id, name, email, hashed_password, role, created_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn email_exists(conn: &mut PgConnection, email: &str) -> Result<bool, BoxError> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(conn)
        .await?;
    Ok(row.0)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    conn: &mut PgConnection,
    id: i64,
    store_id: i64,
    name: &str,
    email: &str,
    hashed_password: &str,
    role: UserRole,
    now: i64,
) -> Result<User, BoxError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, store_id, name, email, hashed_password, role, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, store_id, name, email, hashed_password, role, created_at",
    )
    .bind(id)
    .bind(store_id)
    .bind(name)
    .bind(email)
    .bind(hashed_password)
    .bind(role)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row.into())
}
