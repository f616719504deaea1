use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

/// Opens the pool, creating the database file when it does not exist yet.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid DATABASE_URL `{database_url}`"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let db = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("connect to sqlite")?;
    info!(url = %database_url, max_connections, "database pool ready");
    Ok(db)
}

pub async fn migrate(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
///
/// Every connection to `sqlite::memory:` sees its own database, so the pool
/// is pinned to one connection that never expires.
pub async fn memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("open in-memory sqlite")?;
    migrate(&db).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_database_has_seeded_categories() {
        let db = memory().await.unwrap();
        let (shared,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM categories WHERE user_id IS NULL")
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(shared, 12);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = memory().await.unwrap();
        let err = sqlx::query(
            "INSERT INTO records (type, category_id, amount, record_date, user_id) \
             VALUES ('expense', 1, 5.0, '2024-01-01', 999)",
        )
        .execute(&db)
        .await
        .unwrap_err();
        assert!(err
            .as_database_error()
            .is_some_and(|e| e.is_foreign_key_violation()));
    }
}
