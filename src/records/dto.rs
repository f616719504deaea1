use serde::Deserialize;
use time::Date;

use crate::{
    categories::EntryKind,
    dates::{parse_date, DateRange},
    error::AppError,
    validation::{
        empty_string_as_none, non_blank, optional_choice, parse_choice, positive_amount,
        required_id, required_text, NumberLike,
    },
};

#[derive(Debug, Deserialize)]
pub struct RecordPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category_id: Option<NumberLike>,
    pub amount: Option<NumberLike>,
    pub description: Option<String>,
    pub record_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub kind: EntryKind,
    pub category_id: i64,
    pub amount: f64,
    pub description: Option<String>,
    pub record_date: Date,
}

impl RecordPayload {
    pub fn validate(self) -> Result<NewRecord, AppError> {
        let kind = required_text("type", self.kind)?;
        let record_date = required_text("record_date", self.record_date)?;
        Ok(NewRecord {
            kind: parse_choice("type", &kind, EntryKind::ACCEPTED)?,
            category_id: required_id("category_id", self.category_id.as_ref())?,
            amount: positive_amount("amount", self.amount.as_ref())?,
            description: non_blank(self.description),
            record_date: parse_date("record_date", &record_date)?,
        })
    }
}

/// Query string of `GET /records` and the statistics endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub kind: Option<EntryKind>,
    pub category_id: Option<i64>,
    pub range: DateRange,
    pub limit: Option<i64>,
}

impl RecordQuery {
    pub fn validate(self) -> Result<RecordFilter, AppError> {
        if self.limit.is_some_and(|l| l <= 0) {
            return Err(AppError::invalid("limit must be a positive integer"));
        }
        Ok(RecordFilter {
            kind: optional_choice("type", self.kind.as_deref(), EntryKind::ACCEPTED)?,
            category_id: self.category_id,
            range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
            limit: self.limit,
        })
    }
}
