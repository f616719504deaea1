use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    response::{ApiResult, Created, Envelope},
    shopping::{
        dto::{BatchDeletePayload, BatchStatusPayload, ItemPayload, ShoppingQuery, StatusPayload},
        repo::ShoppingRepo,
        repo_types::{CategoryBreakdown, ShoppingItem, ShoppingTotals},
    },
    state::AppState,
};

pub fn shopping_routes() -> Router<AppState> {
    Router::new()
        .route("/shopping", get(list_items).post(create_item))
        .route("/shopping/statistics", get(statistics))
        .route("/shopping/statistics/categories", get(category_statistics))
        .route("/shopping/batch/status", post(batch_update_status))
        .route("/shopping/batch/delete", post(batch_delete))
        .route("/shopping/:id/status", patch(update_status))
        .route(
            "/shopping/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn list_items(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ShoppingQuery>,
) -> ApiResult<Vec<ShoppingItem>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.list(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn get_item(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ShoppingItem> {
    let item = repo
        .find(id, user.id())
        .await?
        .ok_or_else(|| AppError::not_found("shopping item"))?;
    Ok(Envelope::data(item))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn create_item(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ItemPayload>,
) -> Result<(StatusCode, Envelope<Created>), AppError> {
    let new = payload.validate()?;
    let id = repo.create(user.id(), &new).await?;
    info!(item_id = id, item = %new.item_name, "shopping item created");
    Ok(Envelope::created(id, "shopping item created"))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn update_item(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ItemPayload>,
) -> ApiResult<()> {
    let new = payload.validate()?;
    if !repo.update(id, user.id(), &new).await? {
        return Err(AppError::not_found("shopping item"));
    }
    info!(item_id = id, "shopping item updated");
    Ok(Envelope::message("shopping item updated"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn delete_item(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    if !repo.delete(id, user.id()).await? {
        return Err(AppError::not_found("shopping item"));
    }
    info!(item_id = id, "shopping item deleted");
    Ok(Envelope::message("shopping item deleted"))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn update_status(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<StatusPayload>,
) -> ApiResult<()> {
    let status = payload.validate()?;
    if !repo.update_status(id, user.id(), status).await? {
        return Err(AppError::not_found("shopping item"));
    }
    info!(item_id = id, %status, "shopping item status changed");
    Ok(Envelope::message(format!("status set to {status}")))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn batch_update_status(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<BatchStatusPayload>,
) -> ApiResult<()> {
    let (ids, status) = payload.validate()?;
    let changed = repo.set_status(user.id(), &ids, status).await?;
    info!(requested = ids.len(), changed, %status, "batch status update");
    Ok(Envelope::message(format!("updated {changed} items")).with_count(changed))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn batch_delete(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<BatchDeletePayload>,
) -> ApiResult<()> {
    let ids = payload.validate()?;
    let deleted = repo.delete_many(user.id(), &ids).await?;
    info!(requested = ids.len(), deleted, "batch delete");
    Ok(Envelope::message(format!("deleted {deleted} items")).with_count(deleted))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn statistics(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ShoppingQuery>,
) -> ApiResult<ShoppingTotals> {
    let filter = query.validate()?;
    Ok(Envelope::data(repo.totals(user.id(), &filter).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn category_statistics(
    State(repo): State<ShoppingRepo>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ShoppingQuery>,
) -> ApiResult<Vec<CategoryBreakdown>> {
    let filter = query.validate()?;
    Ok(Envelope::list(repo.by_category(user.id(), &filter).await?))
}
