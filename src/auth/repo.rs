use anyhow::Context;
use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{auth::repo_types::User, state::AppState};

const USER_COLUMNS: &str = "SELECT id, username, email, password_hash, created_at FROM users";

#[derive(Clone)]
pub struct UserRepo {
    db: SqlitePool,
}

impl FromRef<AppState> for UserRepo {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }
}

impl UserRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("load user {id}"))
    }

    /// Login accepts either the username or the email address.
    pub async fn find_by_login(&self, login: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "{USER_COLUMNS} WHERE username = ?1 OR email = ?1 LIMIT 1"
        ))
        .bind(login)
        .fetch_optional(&self.db)
        .await
        .context("look up user by login")
    }

    pub async fn exists(&self, username: &str, email: &str) -> anyhow::Result<bool> {
        let (n,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.db)
                .await
                .context("check for existing user")?;
        Ok(n > 0)
    }

    pub async fn create(&self, username: &str, email: &str, password_hash: &str) -> anyhow::Result<i64> {
        let done = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .execute(&self.db)
            .await
            .context("insert user")?;
        Ok(done.last_insert_rowid())
    }
}
