use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::{
    dates::{iso_date, sql_timestamp},
    validation::UnknownVariant,
};

/// Wedding stage an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ShoppingCategory {
    FamilyMeeting,
    Engagement,
    Wedding,
    Other,
}

impl ShoppingCategory {
    pub const ACCEPTED: &'static str = "family_meeting, engagement, wedding, other";
}

impl FromStr for ShoppingCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "family_meeting" => Ok(Self::FamilyMeeting),
            "engagement" => Ok(Self::Engagement),
            "wedding" => Ok(Self::Wedding),
            "other" => Ok(Self::Other),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Purchased,
    Cancelled,
}

impl ItemStatus {
    pub const ACCEPTED: &'static str = "pending, purchased, cancelled";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Purchased => "purchased",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "purchased" => Ok(Self::Purchased),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored and serialized as 1 (high), 2 (medium) or 3 (low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, sqlx::Type)]
#[serde(into = "i32")]
#[repr(i32)]
pub enum Priority {
    High = 1,
    #[default]
    Medium = 2,
    Low = 3,
}

impl From<Priority> for i32 {
    fn from(p: Priority) -> Self {
        p as i32
    }
}

impl TryFrom<i64> for Priority {
    type Error = UnknownVariant;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShoppingItem {
    pub id: i64,
    pub user_id: i64,
    pub item_name: String,
    pub category: ShoppingCategory,
    pub amount: f64,
    pub quantity: i64,
    pub unit: String,
    pub status: ItemStatus,
    #[serde(with = "iso_date::option")]
    pub purchase_date: Option<Date>,
    pub shop_name: Option<String>,
    pub notes: Option<String>,
    pub priority: Priority,
    #[serde(with = "sql_timestamp")]
    pub created_at: PrimitiveDateTime,
    #[serde(with = "sql_timestamp")]
    pub updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ShoppingTotals {
    pub total_items: i64,
    pub pending_count: i64,
    pub purchased_count: i64,
    pub cancelled_count: i64,
    pub total_spent: f64,
    pub pending_amount: f64,
    pub avg_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryBreakdown {
    pub category: ShoppingCategory,
    pub item_count: i64,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub purchased_count: i64,
    pub pending_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_vocabularies() {
        assert_eq!(
            "family_meeting".parse::<ShoppingCategory>().unwrap(),
            ShoppingCategory::FamilyMeeting
        );
        assert!("honeymoon".parse::<ShoppingCategory>().is_err());
        assert_eq!("cancelled".parse::<ItemStatus>().unwrap(), ItemStatus::Cancelled);
        assert!("done".parse::<ItemStatus>().is_err());
        assert_eq!(Priority::try_from(1).unwrap(), Priority::High);
        assert!(Priority::try_from(4).is_err());
    }

    #[test]
    fn wire_forms() {
        assert_eq!(
            serde_json::to_string(&ShoppingCategory::FamilyMeeting).unwrap(),
            "\"family_meeting\""
        );
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "3");
        assert_eq!(ItemStatus::default(), ItemStatus::Pending);
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
