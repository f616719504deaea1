use anyhow::Context;
use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    categories::{
        dto::NewCategory,
        repo_types::{Category, Change, EntryKind},
    },
    query::Filter,
    state::AppState,
};

const SELECT_CATEGORY: &str =
    "SELECT id, name, type, description, user_id, created_at FROM categories";

#[derive(Clone)]
pub struct CategoryRepo {
    db: SqlitePool,
}

impl FromRef<AppState> for CategoryRepo {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }
}

impl CategoryRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Shared defaults plus the caller's own categories.
    pub async fn list_visible(&self, user_id: i64, kind: Option<EntryKind>) -> anyhow::Result<Vec<Category>> {
        let mut filter = Filter::new(SELECT_CATEGORY);
        filter.owned_or_shared("user_id", user_id).eq("type", kind);
        let mut qb = filter.into_builder();
        qb.push(" ORDER BY type, name");
        qb.build_query_as::<Category>()
            .fetch_all(&self.db)
            .await
            .context("list categories")
    }

    pub async fn find_visible(&self, id: i64, user_id: i64) -> anyhow::Result<Option<Category>> {
        let mut filter = Filter::new(SELECT_CATEGORY);
        filter.eq("id", Some(id)).owned_or_shared("user_id", user_id);
        let mut qb = filter.into_builder();
        qb.build_query_as::<Category>()
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("load category {id}"))
    }

    pub async fn create(&self, user_id: i64, new: &NewCategory) -> anyhow::Result<i64> {
        let done = sqlx::query(
            "INSERT INTO categories (name, type, description, user_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(new.kind)
        .bind(&new.description)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("insert category")?;
        Ok(done.last_insert_rowid())
    }

    /// Only the caller's own rows match; shared defaults are never changed.
    /// The type stays fixed while records of the current type use the category.
    pub async fn update(&self, id: i64, user_id: i64, new: &NewCategory) -> anyhow::Result<Change> {
        let done = sqlx::query(
            "UPDATE categories SET name = ?1, type = ?2, description = ?3, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?4 AND user_id = ?5 \
             AND NOT EXISTS (SELECT 1 FROM records WHERE category_id = ?4 AND type <> ?2)",
        )
        .bind(&new.name)
        .bind(new.kind)
        .bind(&new.description)
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .with_context(|| format!("update category {id}"))?;
        self.outcome(id, user_id, done.rows_affected()).await
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<Change> {
        let done = sqlx::query(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2 \
             AND NOT EXISTS (SELECT 1 FROM records WHERE category_id = ?1)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .with_context(|| format!("delete category {id}"))?;
        self.outcome(id, user_id, done.rows_affected()).await
    }

    async fn outcome(&self, id: i64, user_id: i64, rows: u64) -> anyhow::Result<Change> {
        if rows > 0 {
            return Ok(Change::Applied);
        }
        let (owned,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM categories WHERE id = ? AND user_id = ?)")
                .bind(id)
                .bind(user_id)
                .fetch_one(&self.db)
                .await
                .with_context(|| format!("check category {id}"))?;
        Ok(if owned { Change::InUse } else { Change::Missing })
    }
}
