use serde::Serialize;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::dates::sql_timestamp;

/// Row of the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "sql_timestamp")]
    pub created_at: PrimitiveDateTime,
}
