use sqlx::SqlitePool;

/// Inserts a user with a placeholder hash and returns its id.
pub async fn seed_user(pool: &SqlitePool, username: &str) -> i64 {
    sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, 'x')")
        .bind(username)
        .bind(format!("{username}@example.com"))
        .execute(pool)
        .await
        .expect("seed user")
        .last_insert_rowid()
}
