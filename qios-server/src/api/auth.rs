//! Login and registration
//!
//! POST /api/auth/register - create store + OWNER user, return token
//! POST /api/auth/login    - email/password → token

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router, middleware};
use shared::error::{AppError, ErrorCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, UserRole};
use sqlx::PgPool;

use super::{ApiResult, ok};
use crate::auth::jwt::create_token;
use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::db;
use crate::error::{ServiceResult, internal};
use crate::state::AppState;
use crate::util::{hash_password, now_millis, snowflake_id, verify_password};
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, MIN_PASSWORD_LEN,
    normalize_email, validate_optional_text, validate_required_text,
};

pub fn router(state: AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/api/auth/login", post(login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));
    let register = Router::new()
        .route("/api/auth/register", post(register))
        .layer(middleware::from_fn_with_state(state, register_rate_limit));
    login.merge(register)
}

fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    validate_required_text(&req.store_name, "storeName", MAX_NAME_LEN)?;
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.address, "address", MAX_ADDRESS_LEN)?;
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    let hashed = hash_password(&req.password).map_err(internal)?;
    let (user, store) = create_owner(&state.pool, &req, &email, &hashed).await?;

    let token = create_token(user.id, store.id, &user.email, user.role, &state.config.jwt_secret)
        .map_err(internal)?;
    tracing::info!(store_id = store.id, user_id = user.id, "Store registered");
    ok(AuthResponse { token, user, store })
}

async fn create_owner(
    pool: &PgPool,
    req: &RegisterRequest,
    email: &str,
    hashed_password: &str,
) -> ServiceResult<(shared::models::User, shared::models::Store)> {
    let mut tx = pool.begin().await?;
    if db::users::email_exists(&mut *tx, email).await? {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
    }

    let now = now_millis();
    let store = db::stores::create(
        &mut *tx,
        snowflake_id(),
        req.store_name.trim(),
        req.address.as_deref(),
        req.phone.as_deref(),
        Some(email),
        now,
    )
    .await?;
    let user = db::users::create(
        &mut *tx,
        snowflake_id(),
        store.id,
        req.name.trim(),
        email,
        hashed_password,
        UserRole::Owner,
        now,
    )
    .await?;
    tx.commit().await?;
    Ok((user, store))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();
    let row = db::users::find_by_email(&state.pool, &email)
        .await
        .map_err(internal)?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &row.hashed_password) {
        tracing::warn!(user_id = row.id, "Login failed: wrong password");
        return Err(AppError::invalid_credentials());
    }

    let store = db::stores::find_by_id(&state.pool, row.store_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    let user: shared::models::User = row.into();
    let token = create_token(user.id, store.id, &user.email, user.role, &state.config.jwt_secret)
        .map_err(internal)?;

    tracing::info!(store_id = store.id, user_id = user.id, "User logged in");
    ok(AuthResponse { token, user, store })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_length_rules() {
        assert_eq!(
            validate_password("short").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
        assert!(validate_password("longenough").is_ok());
        assert_eq!(
            validate_password(&"x".repeat(MAX_PASSWORD_LEN + 1)).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
