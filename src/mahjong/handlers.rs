use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    mahjong::{
        dto::{MahjongQuery, SessionPayload},
        repo::MahjongRepo,
        repo_types::{DailyResult, GameTypeResult, MahjongSession, MahjongTotals, MonthlyResult},
    },
    response::{ApiResult, Created, Envelope},
    state::AppState,
};

pub fn mahjong_routes() -> Router<AppState> {
    Router::new()
        .route("/mahjong", get(list_sessions).post(create_session))
        .route("/mahjong/statistics", get(statistics))
        .route("/mahjong/statistics/daily", get(daily_statistics))
        .route("/mahjong/statistics/game-types", get(game_type_statistics))
        .route("/mahjong/statistics/monthly", get(monthly_statistics))
        .route(
            "/mahjong/:id",
            get(get_session).put(update_session).delete(delete_session),
        )
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn list_sessions(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<MahjongQuery>,
) -> ApiResult<Vec<MahjongSession>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.list(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn get_session(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<MahjongSession> {
    let session = repo
        .find(id, user.id())
        .await?
        .ok_or_else(|| AppError::not_found("mahjong record"))?;
    Ok(Envelope::data(session))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn create_session(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<SessionPayload>,
) -> Result<(StatusCode, Envelope<Created>), AppError> {
    let new = payload.validate()?;
    let id = repo.create(user.id(), &new).await?;
    info!(session_id = id, win_amount = new.win_amount, "mahjong session created");
    Ok(Envelope::created(id, "mahjong record created"))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn update_session(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<SessionPayload>,
) -> ApiResult<()> {
    let new = payload.validate()?;
    if !repo.update(id, user.id(), &new).await? {
        return Err(AppError::not_found("mahjong record"));
    }
    info!(session_id = id, "mahjong session updated");
    Ok(Envelope::message("mahjong record updated"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn delete_session(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    if !repo.delete(id, user.id()).await? {
        return Err(AppError::not_found("mahjong record"));
    }
    info!(session_id = id, "mahjong session deleted");
    Ok(Envelope::message("mahjong record deleted"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn statistics(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<MahjongQuery>,
) -> ApiResult<MahjongTotals> {
    let filter = query.validate()?;
    Ok(Envelope::data(repo.totals(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn daily_statistics(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<MahjongQuery>,
) -> ApiResult<Vec<DailyResult>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.daily(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn game_type_statistics(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<MahjongQuery>,
) -> ApiResult<Vec<GameTypeResult>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.by_game_type(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn monthly_statistics(
    State(repo): State<MahjongRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<MahjongQuery>,
) -> ApiResult<Vec<MonthlyResult>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.monthly(user.id(), &filter).await?))
}
