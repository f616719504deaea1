use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserRepo,
        repo_types::User,
    },
    error::{is_unique_violation, AppError},
    extract::ApiJson,
    response::{ApiResult, Created, Envelope},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

fn issue_tokens(keys: &JwtKeys, user: User) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    })
}

#[instrument(skip(users, payload))]
pub async fn register(
    State(users): State<UserRepo>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Envelope<Created>), AppError> {
    let new_user = payload.validate()?;

    if users.exists(&new_user.username, &new_user.email).await? {
        warn!(username = %new_user.username, "username or email already registered");
        return Err(AppError::Conflict("username or email already registered".into()));
    }

    let hash = hash_password(&new_user.password)?;
    let id = users
        .create(&new_user.username, &new_user.email, &hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("username or email already registered".into())
            } else {
                AppError::Internal(e)
            }
        })?;

    info!(user_id = id, username = %new_user.username, "user registered");
    Ok(Envelope::created(id, "registered"))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let (login, password) = payload.credentials()?;
    let invalid = || AppError::Unauthenticated("invalid username or password".into());

    let Some(user) = UserRepo::from_ref(&state).find_by_login(&login).await? else {
        warn!(login = %login, "login for unknown user");
        return Err(invalid());
    };
    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(invalid());
    }

    info!(user_id = user.id, "user logged in");
    let tokens = issue_tokens(&JwtKeys::from_ref(&state), user)?;
    Ok(Envelope::data(tokens).with_message("logged in"))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        AppError::Forbidden("invalid or expired refresh token".into())
    })?;

    let user = UserRepo::from_ref(&state)
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("user not found".into()))?;

    Ok(Envelope::data(issue_tokens(&keys, user)?))
}

#[instrument(skip_all, fields(user_id = user.id()))]
pub async fn me(user: CurrentUser) -> ApiResult<PublicUser> {
    Ok(Envelope::data(user.0))
}
