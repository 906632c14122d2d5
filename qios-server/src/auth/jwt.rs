//! User JWT authentication
//!
//! The middleware runs on every request and always inserts an [`Access`]
//! extension. Only paths under [`PROTECTED_PREFIXES`] require a token; in the
//! development environment nothing does.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::UserRole;

use crate::state::AppState;

/// Route prefixes that require a bearer token
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/api/products",
    "/api/orders",
    "/api/customers",
    "/api/inventory",
    "/api/dashboard",
    "/api/notifications",
    "/api/analytics",
    "/api/payment/create",
    "/api/payment/verify",
];

const JWT_EXPIRY_HOURS: i64 = 24;

/// JWT claims for store users
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    pub store_id: i64,
    pub email: String,
    pub role: UserRole,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
}

/// Authenticated user extracted from JWT
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: i64,
    pub store_id: i64,
    pub email: String,
    pub role: UserRole,
}

/// What the current request may touch
#[derive(Debug, Clone)]
pub enum Access {
    /// Auth disabled (development)
    Unrestricted,
    /// Valid bearer token
    User(UserIdentity),
    /// Public route without a token
    Anonymous,
}

impl Access {
    /// Reject a request naming a store other than the token's
    pub fn ensure_store(&self, store_id: i64) -> Result<(), AppError> {
        match self {
            Access::Unrestricted => Ok(()),
            Access::User(identity) if identity.store_id == store_id => Ok(()),
            Access::User(identity) => {
                tracing::warn!(
                    user_id = identity.user_id,
                    token_store_id = identity.store_id,
                    store_id,
                    "Store access denied"
                );
                Err(AppError::new(ErrorCode::StoreAccessDenied))
            }
            Access::Anonymous => Err(AppError::not_authenticated()),
        }
    }
}

/// Whether a path needs a bearer token (when auth is enabled)
pub fn requires_auth(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: i64,
    store_id: i64,
    email: &str,
    role: UserRole,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        store_id,
        email: email.to_string(),
        role,
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and extract the identity
pub fn verify_token(token: &str, secret: &str) -> Result<UserIdentity, AppError> {
    let token_data = jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid or expired token"),
        }
    })?;

    let claims = token_data.claims;
    let user_id = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Invalid subject"))?;

    Ok(UserIdentity {
        user_id,
        store_id: claims.store_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Middleware that resolves [`Access`] for every request
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    if state.config.is_development() {
        request.extensions_mut().insert(Access::Unrestricted);
        return Ok(next.run(request).await);
    }

    let protected = requires_auth(request.uri().path());
    let resolved = match request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        None => Err(AppError::not_authenticated()),
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => verify_token(token, &state.config.jwt_secret).map(Access::User),
            None => Err(AppError::invalid_token("Invalid Authorization format")),
        },
    };

    let access = match resolved {
        Ok(access) => access,
        Err(e) if protected => return Err(e.into_response()),
        Err(_) => Access::Anonymous,
    };

    request.extensions_mut().insert(access);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_prefix_matching() {
        assert!(requires_auth("/api/products"));
        assert!(requires_auth("/api/products/123/recipe"));
        assert!(requires_auth("/api/payment/create"));
        assert!(requires_auth("/api/notifications/read"));
        assert!(!requires_auth("/api/payment/gateways"));
        assert!(!requires_auth("/api/auth/login"));
        assert!(!requires_auth("/api/dev/seed"));
        assert!(!requires_auth("/health"));
        assert!(!requires_auth("/api/productsx"));
    }

    #[test]
    fn token_roundtrip() {
        let token = create_token(42, 7, "owner@toko.id", UserRole::Owner, "secret").unwrap();
        let identity = verify_token(&token, "secret").unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.store_id, 7);
        assert_eq!(identity.email, "owner@toko.id");
        assert_eq!(identity.role, UserRole::Owner);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = create_token(1, 1, "a@b.id", UserRole::Cashier, "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn store_access_rules() {
        let user = Access::User(UserIdentity {
            user_id: 1,
            store_id: 7,
            email: "a@b.id".into(),
            role: UserRole::Owner,
        });
        assert!(user.ensure_store(7).is_ok());
        assert_eq!(
            user.ensure_store(8).unwrap_err().code,
            ErrorCode::StoreAccessDenied
        );
        assert!(Access::Unrestricted.ensure_store(8).is_ok());
        assert_eq!(
            Access::Anonymous.ensure_store(7).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
    }
}
