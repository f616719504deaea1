use serde::Deserialize;

use crate::{
    categories::repo_types::EntryKind,
    error::AppError,
    validation::{non_blank, parse_choice, required_text},
};

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub kind: EntryKind,
    pub description: Option<String>,
}

impl CategoryPayload {
    pub fn validate(self) -> Result<NewCategory, AppError> {
        let name = required_text("name", self.name)?;
        let kind = required_text("type", self.kind)?;
        Ok(NewCategory {
            name,
            kind: parse_choice("type", &kind, EntryKind::ACCEPTED)?,
            description: non_blank(self.description),
        })
    }
}
