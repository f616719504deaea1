use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    gifts::{
        dto::{GiftPayload, GiftQuery, YearQuery},
        repo::GiftRepo,
        repo_types::{EventTypeTotals, GiftRecord, GiftTotals, MonthlyGiftTotals, NameBalance},
    },
    response::{ApiResult, Created, Envelope},
    state::AppState,
};

pub fn gift_routes() -> Router<AppState> {
    Router::new()
        .route("/gifts", get(list_gifts).post(create_gift))
        .route("/gifts/statistics", get(statistics))
        .route("/gifts/statistics/event-types", get(event_type_statistics))
        .route("/gifts/statistics/names", get(name_statistics))
        .route("/gifts/statistics/yearly", get(yearly_statistics))
        .route("/gifts/:id", get(get_gift).put(update_gift).delete(delete_gift))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn list_gifts(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<GiftQuery>,
) -> ApiResult<Vec<GiftRecord>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.list(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn get_gift(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<GiftRecord> {
    let gift = repo
        .find(id, user.id())
        .await?
        .ok_or_else(|| AppError::not_found("gift record"))?;
    Ok(Envelope::data(gift))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn create_gift(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<GiftPayload>,
) -> Result<(StatusCode, Envelope<Created>), AppError> {
    let new = payload.validate()?;
    let id = repo.create(user.id(), &new).await?;
    info!(gift_id = id, gift_type = %new.gift_type, amount = new.amount, "gift record created");
    Ok(Envelope::created(id, "gift record created"))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn update_gift(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<GiftPayload>,
) -> ApiResult<()> {
    let new = payload.validate()?;
    if !repo.update(id, user.id(), &new).await? {
        return Err(AppError::not_found("gift record"));
    }
    info!(gift_id = id, "gift record updated");
    Ok(Envelope::message("gift record updated"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn delete_gift(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    if !repo.delete(id, user.id()).await? {
        return Err(AppError::not_found("gift record"));
    }
    info!(gift_id = id, "gift record deleted");
    Ok(Envelope::message("gift record deleted"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn statistics(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<GiftQuery>,
) -> ApiResult<GiftTotals> {
    let filter = query.validate()?;
    Ok(Envelope::data(repo.totals(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn event_type_statistics(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<GiftQuery>,
) -> ApiResult<Vec<EventTypeTotals>> {
    let filter = query.validate()?;
    let rows = repo
        .by_event_type(user.id(), filter.gift_type, &filter.range)
        .await?;
    Ok(Envelope::list(rows))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn name_statistics(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<GiftQuery>,
) -> ApiResult<Vec<NameBalance>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.by_name(user.id(), &filter.range).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn yearly_statistics(
    State(repo): State<GiftRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> ApiResult<Vec<MonthlyGiftTotals>> {
    let year = query.year()?;
    Ok(Envelope::list(repo.yearly(user.id(), year).await?))
}
