//! Request extractors
//!
//! Authentication happens upstream; the gateway forwards the caller's id
//! in the `X-User-Id` header. Admin rights come from configuration.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts, OptionalFromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::application::services::Caller;
use crate::domain::value_objects::UserId;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// The authenticated caller. Use `Option<CurrentUser>` on endpoints where
/// anonymous access is allowed.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Caller);

/// `Ok(None)` when the header is absent; a present but malformed header is
/// always rejected.
fn caller_from_parts(parts: &Parts, state: &AppState) -> Result<Option<Caller>, ApiError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let user_id = value
        .to_str()
        .ok()
        .and_then(|v| UserId::parse(v.trim()).ok())
        .ok_or_else(ApiError::unauthorized)?;

    let caller = if state.config.is_admin(user_id) {
        Caller::admin(user_id)
    } else {
        Caller::user(user_id)
    };
    Ok(Some(caller))
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts, state)?
            .map(CurrentUser)
            .ok_or_else(ApiError::unauthorized)
    }
}

impl OptionalFromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(caller_from_parts(parts, state)?.map(CurrentUser))
    }
}

/// JSON body that has passed its `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::persistence::memory_pool;
    use crate::infrastructure::random::OsRngAdapter;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn required(CurrentUser(caller): CurrentUser) -> String {
        format!("{}:{}", caller.user_id, caller.is_admin)
    }

    async fn optional(caller: Option<CurrentUser>) -> String {
        match caller {
            Some(CurrentUser(caller)) => caller.user_id.to_string(),
            None => "anonymous".to_string(),
        }
    }

    async fn app(admin: Option<UserId>) -> Router {
        let config = AppConfig {
            admin_user_ids: admin.into_iter().collect(),
            ..AppConfig::default()
        };
        let state = AppState::with_pool(config, memory_pool().await, Arc::new(OsRngAdapter::new()));
        Router::new()
            .route("/required", get(required))
            .route("/optional", get(optional))
            .with_state(Arc::new(state))
    }

    async fn call(app: Router, uri: &str, user: Option<&str>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_required_user() {
        let user = UserId::new();
        let (status, body) = call(app(None).await, "/required", Some(&user.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{user}:false"));
    }

    #[tokio::test]
    async fn test_admin_flag_from_config() {
        let admin = UserId::new();
        let (_, body) = call(app(Some(admin)).await, "/required", Some(&admin.to_string())).await;
        assert_eq!(body, format!("{admin}:true"));
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_is_unauthorized() {
        let (status, body) = call(app(None).await, "/required", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Authentication required"));

        let (status, _) = call(app(None).await, "/required", Some("user-123")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(app(None).await, "/optional", Some("user-123")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_user() {
        let (status, body) = call(app(None).await, "/optional", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }
}
