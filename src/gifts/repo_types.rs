use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::{
    dates::{iso_date, sql_timestamp},
    validation::UnknownVariant,
};

/// Money given to someone else, or received from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum GiftDirection {
    Giving,
    Receiving,
}

impl GiftDirection {
    pub const ACCEPTED: &'static str = "giving, receiving";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Giving => "giving",
            Self::Receiving => "receiving",
        }
    }
}

impl FromStr for GiftDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "giving" => Ok(Self::Giving),
            "receiving" => Ok(Self::Receiving),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for GiftDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GiftRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub gift_type: GiftDirection,
    pub event_type: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub event_date: Date,
    pub relationship: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "sql_timestamp")]
    pub created_at: PrimitiveDateTime,
    #[serde(with = "sql_timestamp")]
    pub updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GiftTotals {
    pub total_count: i64,
    pub giving_count: i64,
    pub receiving_count: i64,
    pub total_giving: f64,
    pub total_receiving: f64,
    pub net_amount: f64,
    pub avg_giving: Option<f64>,
    pub avg_receiving: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventTypeTotals {
    pub event_type: String,
    pub gift_type: GiftDirection,
    pub count: i64,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub max_amount: f64,
    pub min_amount: f64,
}

/// Running balance with one counterparty. Positive means they gave more.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NameBalance {
    pub name: String,
    pub total_giving: f64,
    pub total_receiving: f64,
    pub balance: f64,
    pub interaction_count: i64,
    #[serde(with = "iso_date")]
    pub last_event_date: Date,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlyGiftTotals {
    pub month: String,
    pub gift_type: GiftDirection,
    pub count: i64,
    pub total_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_closed_set() {
        assert_eq!("giving".parse::<GiftDirection>().unwrap(), GiftDirection::Giving);
        assert_eq!("receiving".parse::<GiftDirection>().unwrap(), GiftDirection::Receiving);
        assert!("gift".parse::<GiftDirection>().is_err());
        assert_eq!(serde_json::to_string(&GiftDirection::Receiving).unwrap(), "\"receiving\"");
    }
}
