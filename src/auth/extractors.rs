use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{
    auth::{dto::PublicUser, jwt::JwtKeys, repo::UserRepo},
    error::AppError,
    state::AppState,
};

/// The authenticated caller, resolved from the bearer token and the users table.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthenticated("access token required".into()))?;

        let claims = JwtKeys::from_ref(state).verify_access(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            AppError::Forbidden("invalid or expired token".into())
        })?;

        let user = UserRepo::from_ref(state)
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = claims.sub, "token subject no longer exists");
                AppError::Unauthenticated("user not found".into())
            })?;

        Ok(CurrentUser(PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        }))
    }
}
