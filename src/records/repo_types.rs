use serde::Serialize;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::{
    categories::EntryKind,
    dates::{iso_date, sql_timestamp},
};

/// Income/expense row joined with its category.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Record {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: EntryKind,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub category_type: Option<EntryKind>,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(with = "iso_date")]
    pub record_date: Date,
    pub user_id: i64,
    #[serde(with = "sql_timestamp")]
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct KindTotal {
    #[sqlx(rename = "type")]
    pub kind: EntryKind,
    pub total: f64,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryTotal {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: EntryKind,
    pub total: f64,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DayKindTotal {
    pub record_date: Date,
    #[sqlx(rename = "type")]
    pub kind: EntryKind,
    pub total: f64,
    pub count: i64,
}
