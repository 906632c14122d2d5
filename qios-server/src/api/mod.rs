//! HTTP API routes
//!
//! Every handler answers with the `ApiResponse` envelope. Store-scoped
//! handlers take `storeId` from the query (GET) or body (POST/PUT) and check
//! it against the caller's [`Access`](crate::auth::Access).

pub mod analytics;
pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod dev;
pub mod health;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod payment;
pub mod products;

use axum::http::{HeaderValue, Method, Uri, header};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::jwt::auth_middleware;
use crate::config::Config;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Wrap `data` in a success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// `?storeId=` for store-scoped reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQuery {
    pub store_id: i64,
}

/// Create the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router(state.clone()))
        .merge(products::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(inventory::router())
        .merge(dashboard::router())
        .merge(notifications::router())
        .merge(analytics::router())
        .merge(payment::router())
        .merge(dev::router(state.clone()))
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Route {}", uri.path()))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use shared::error::ErrorCode;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn app(environment: &str) -> Router {
        let config = Config::for_tests(environment);
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        build_router(AppState::with_pool(pool, config))
    }

    async fn post_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_route_answers_with_envelope() {
        let (status, body) = post_json(app("development"), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], 3);
        assert_eq!(body["details"]["resource"], "Route /api/nope");
    }

    #[tokio::test]
    async fn dev_routes_are_hidden_outside_development() {
        let (status, body) = post_json(app("production"), "/api/dev/seed").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], ErrorCode::DevOnly.code());
    }
}
