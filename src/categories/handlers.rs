use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    categories::{
        dto::CategoryPayload,
        repo::CategoryRepo,
        repo_types::{Category, Change, EntryKind},
    },
    error::{is_foreign_key_violation, AppError},
    extract::{ApiJson, ApiPath},
    response::{ApiResult, Created, Envelope},
    state::AppState,
    validation::parse_choice,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/type/:type", get(list_by_type))
        .route(
            "/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn list_categories(
    State(repo): State<CategoryRepo>,
    user: CurrentUser,
) -> ApiResult<Vec<Category>> {
    Ok(Envelope::list(repo.list_visible(user.id(), None).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn list_by_type(
    State(repo): State<CategoryRepo>,
    user: CurrentUser,
    ApiPath(kind): ApiPath<String>,
) -> ApiResult<Vec<Category>> {
    let kind: EntryKind = parse_choice("type", &kind, EntryKind::ACCEPTED)?;
    Ok(Envelope::list(repo.list_visible(user.id(), Some(kind)).await?))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn get_category(
    State(repo): State<CategoryRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Category> {
    let category = repo
        .find_visible(id, user.id())
        .await?
        .ok_or_else(|| AppError::not_found("category"))?;
    Ok(Envelope::data(category))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn create_category(
    State(repo): State<CategoryRepo>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<CategoryPayload>,
) -> Result<(StatusCode, Envelope<Created>), AppError> {
    let new = payload.validate()?;
    let id = repo.create(user.id(), &new).await?;
    info!(category_id = id, name = %new.name, "category created");
    Ok(Envelope::created(id, "category created"))
}

#[instrument(skip(repo, user, payload), fields(user_id = user.id()))]
pub async fn update_category(
    State(repo): State<CategoryRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<CategoryPayload>,
) -> ApiResult<()> {
    let new = payload.validate()?;
    match repo.update(id, user.id(), &new).await? {
        Change::Applied => {}
        Change::Missing => return Err(AppError::not_found("category")),
        Change::InUse => {
            return Err(AppError::Conflict(
                "category type cannot change while records use it".into(),
            ))
        }
    }
    info!(category_id = id, "category updated");
    Ok(Envelope::message("category updated"))
}

#[instrument(skip(repo, user), fields(user_id = user.id()))]
pub async fn delete_category(
    State(repo): State<CategoryRepo>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    let in_use = || AppError::Conflict("category is still used by records".into());
    let change = repo.delete(id, user.id()).await.map_err(|e| {
        // a record inserted between the check and the delete trips the foreign key
        if is_foreign_key_violation(&e) {
            in_use()
        } else {
            AppError::Internal(e)
        }
    })?;
    match change {
        Change::Applied => {}
        Change::Missing => return Err(AppError::not_found("category")),
        Change::InUse => return Err(in_use()),
    }
    info!(category_id = id, "category deleted");
    Ok(Envelope::message("category deleted"))
}
