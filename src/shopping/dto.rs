use serde::Deserialize;
use time::Date;

use crate::{
    dates::{parse_optional_date, DateRange},
    error::AppError,
    shopping::repo_types::{ItemStatus, Priority, ShoppingCategory},
    validation::{
        empty_string_as_none, non_blank, optional_choice, parse_choice, required_amount,
        required_text, NumberLike,
    },
};

#[derive(Debug, Deserialize)]
pub struct ItemPayload {
    pub item_name: Option<String>,
    pub category: Option<String>,
    pub amount: Option<NumberLike>,
    pub quantity: Option<NumberLike>,
    pub unit: Option<String>,
    pub status: Option<String>,
    pub purchase_date: Option<String>,
    pub shop_name: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<NumberLike>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub item_name: String,
    pub category: ShoppingCategory,
    pub amount: f64,
    pub quantity: i64,
    pub unit: String,
    pub status: ItemStatus,
    pub purchase_date: Option<Date>,
    pub shop_name: Option<String>,
    pub notes: Option<String>,
    pub priority: Priority,
}

fn parse_status(raw: Option<&str>) -> Result<Option<ItemStatus>, AppError> {
    optional_choice("status", raw, ItemStatus::ACCEPTED)
}

impl ItemPayload {
    pub fn validate(self) -> Result<NewItem, AppError> {
        let item_name = required_text("item_name", self.item_name)?;
        let category = required_text("category", self.category)?;

        let amount = match self.amount.as_ref() {
            None => 0.0,
            some => required_amount("amount", some)?,
        };
        if amount < 0.0 {
            return Err(AppError::invalid("amount must not be negative"));
        }
        let quantity = match self.quantity.as_ref() {
            None => 1,
            Some(q) => q
                .to_i64()
                .filter(|q| *q >= 1)
                .ok_or_else(|| AppError::invalid("quantity must be an integer of at least 1"))?,
        };
        let priority = match self.priority.as_ref() {
            None => Priority::default(),
            Some(p) => p
                .to_i64()
                .and_then(|n| Priority::try_from(n).ok())
                .ok_or_else(|| AppError::invalid("priority must be 1, 2 or 3"))?,
        };

        Ok(NewItem {
            item_name,
            category: parse_choice("category", &category, ShoppingCategory::ACCEPTED)?,
            amount,
            quantity,
            unit: non_blank(self.unit).unwrap_or_else(|| "piece".into()),
            status: parse_status(self.status.as_deref())?.unwrap_or_default(),
            purchase_date: parse_optional_date("purchase_date", self.purchase_date.as_deref())?,
            shop_name: non_blank(self.shop_name),
            notes: non_blank(self.notes),
            priority,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: Option<String>,
}

impl StatusPayload {
    pub fn validate(self) -> Result<ItemStatus, AppError> {
        parse_status(self.status.as_deref())?
            .ok_or_else(|| AppError::invalid("status is required"))
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchStatusPayload {
    pub ids: Option<Vec<i64>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeletePayload {
    pub ids: Option<Vec<i64>>,
}

fn require_ids(ids: Option<Vec<i64>>) -> Result<Vec<i64>, AppError> {
    match ids {
        Some(ids) if !ids.is_empty() => Ok(ids),
        _ => Err(AppError::invalid("ids must be a non-empty array")),
    }
}

impl BatchStatusPayload {
    pub fn validate(self) -> Result<(Vec<i64>, ItemStatus), AppError> {
        let ids = require_ids(self.ids)?;
        let status = StatusPayload { status: self.status }.validate()?;
        Ok((ids, status))
    }
}

impl BatchDeletePayload {
    pub fn validate(self) -> Result<Vec<i64>, AppError> {
        require_ids(self.ids)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ShoppingQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub priority: Option<i64>,
    pub item_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Date bounds apply to `purchase_date`.
#[derive(Debug, Clone, Default)]
pub struct ShoppingFilter {
    pub category: Option<ShoppingCategory>,
    pub status: Option<ItemStatus>,
    pub priority: Option<Priority>,
    pub item_name: Option<String>,
    pub range: DateRange,
}

impl ShoppingQuery {
    pub fn validate(self) -> Result<ShoppingFilter, AppError> {
        let priority = self
            .priority
            .map(|p| Priority::try_from(p).map_err(|_| AppError::invalid("priority must be 1, 2 or 3")))
            .transpose()?;
        Ok(ShoppingFilter {
            category: optional_choice("category", self.category.as_deref(), ShoppingCategory::ACCEPTED)?,
            status: parse_status(self.status.as_deref())?,
            priority,
            item_name: non_blank(self.item_name),
            range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ItemPayload {
        ItemPayload {
            item_name: Some("Rings".into()),
            category: Some("engagement".into()),
            amount: None,
            quantity: None,
            unit: None,
            status: None,
            purchase_date: None,
            shop_name: None,
            notes: None,
            priority: None,
        }
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let item = minimal().validate().unwrap();
        assert_eq!(item.amount, 0.0);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit, "piece");
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.priority, Priority::Medium);
        assert_eq!(item.purchase_date, None);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut p = minimal();
        p.quantity = Some(NumberLike::Number(0.0));
        assert!(p.validate().is_err());

        let mut p = minimal();
        p.priority = Some(NumberLike::Text("5".into()));
        assert!(p.validate().is_err());

        let mut p = minimal();
        p.amount = Some(NumberLike::Number(-1.0));
        assert!(p.validate().is_err());

        let mut p = minimal();
        p.category = Some("honeymoon".into());
        assert!(p.validate().is_err());

        let mut p = minimal();
        p.status = Some("lost".into());
        assert!(p.validate().is_err());
    }

    #[test]
    fn batch_requires_ids_and_status() {
        let empty = BatchStatusPayload { ids: Some(vec![]), status: Some("purchased".into()) };
        assert!(empty.validate().is_err());
        let no_status = BatchStatusPayload { ids: Some(vec![1]), status: None };
        assert!(no_status.validate().is_err());
        let ok = BatchStatusPayload { ids: Some(vec![1, 2]), status: Some("purchased".into()) };
        assert_eq!(ok.validate().unwrap(), (vec![1, 2], ItemStatus::Purchased));
        assert!(BatchDeletePayload { ids: None }.validate().is_err());
    }

    #[test]
    fn query_priority_must_be_known() {
        let q = ShoppingQuery { priority: Some(7), ..Default::default() };
        assert!(q.validate().is_err());
        let q = ShoppingQuery { priority: Some(1), ..Default::default() };
        assert_eq!(q.validate().unwrap().priority, Some(Priority::High));
    }
}
