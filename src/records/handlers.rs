use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::CurrentUser,
    categories::repo::CategoryRepo,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    records::{
        dto::{NewRecord, RecordPayload, RecordQuery},
        repo::RecordRepo,
        repo_types::Record,
        stats::{fold_totals, pivot_daily, with_percentages, CategoryShare, DailyTotals, Totals},
    },
    response::{ApiResult, Created, Envelope},
    state::AppState,
};

pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/records", get(list_records).post(create_record))
        .route("/records/statistics", get(statistics))
        .route("/records/statistics/categories", get(category_statistics))
        .route("/records/statistics/daily", get(daily_statistics))
        .route(
            "/records/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

/// The category must be visible to the caller and point the same direction.
async fn check_category(
    categories: &CategoryRepo,
    user_id: i64,
    new: &NewRecord,
) -> Result<(), AppError> {
    let category = categories
        .find_visible(new.category_id, user_id)
        .await?
        .ok_or_else(|| AppError::invalid("category does not exist"))?;
    if category.kind != new.kind {
        warn!(category_id = category.id, "record type does not match category type");
        return Err(AppError::invalid(format!(
            "category `{}` is for {} records",
            category.name, category.kind
        )));
    }
    Ok(())
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn list_records(
    State(repo): State<RecordRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> ApiResult<Vec<Record>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.list(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn get_record(
    State(repo): State<RecordRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Record> {
    let record = repo
        .find(id, user.id())
        .await?
        .ok_or_else(|| AppError::not_found("record"))?;
    Ok(Envelope::data(record))
}

#[instrument(skip(repo, categories, user, payload), fields(user_id = user.id()))]
pub async fn create_record(
    State(repo): State<RecordRepo>,
    State(categories): State<CategoryRepo>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<RecordPayload>,
) -> Result<(StatusCode, Envelope<Created>), AppError> {
    let new = payload.validate()?;
    check_category(&categories, user.id(), &new).await?;
    let id = repo.create(user.id(), &new).await?;
    info!(record_id = id, kind = %new.kind, amount = new.amount, "record created");
    Ok(Envelope::created(id, "record created"))
}

#[instrument(skip(repo, categories, user, payload), fields(user_id = user.id()))]
pub async fn update_record(
    State(repo): State<RecordRepo>,
    State(categories): State<CategoryRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<RecordPayload>,
) -> ApiResult<()> {
    let new = payload.validate()?;
    check_category(&categories, user.id(), &new).await?;
    if !repo.update(id, user.id(), &new).await? {
        return Err(AppError::not_found("record"));
    }
    info!(record_id = id, "record updated");
    Ok(Envelope::message("record updated"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn delete_record(
    State(repo): State<RecordRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    if !repo.delete(id, user.id()).await? {
        return Err(AppError::not_found("record"));
    }
    info!(record_id = id, "record deleted");
    Ok(Envelope::message("record deleted"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn statistics(
    State(repo): State<RecordRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> ApiResult<Totals> {
    let filter = query.validate()?;
    let rows = repo.totals_by_kind(user.id(), &filter).await?;
    Ok(Envelope::data(fold_totals(&rows)))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn category_statistics(
    State(repo): State<RecordRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> ApiResult<Vec<CategoryShare>> {
    let filter = query.validate()?;
    let rows = repo
        .totals_by_category(user.id(), filter.kind, &filter.range)
        .await?;
    Ok(Envelope::list(with_percentages(rows)))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn daily_statistics(
    State(repo): State<RecordRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<RecordQuery>,
) -> ApiResult<Vec<DailyTotals>> {
    let filter = query.validate()?;
    let rows = repo.totals_by_day(user.id(), &filter.range).await?;
    Ok(Envelope::list(pivot_daily(&rows)))
}
