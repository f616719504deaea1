use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;

/// JSON envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

pub type ApiResult<T> = Result<Envelope<T>, AppError>;

/// Body of a 201 response: the id of the new row.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            count: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len() as u64;
        Self::data(items).with_count(count)
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            count: None,
        }
    }

    pub fn failure(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: detail,
            count: None,
        }
    }
}

impl Envelope<Created> {
    /// 201 with `{id}` as data.
    pub fn created(id: i64, message: impl Into<String>) -> (StatusCode, Self) {
        (
            StatusCode::CREATED,
            Self::data(Created { id }).with_message(message),
        )
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
