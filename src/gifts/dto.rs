use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    dates::{parse_date, DateRange},
    error::AppError,
    gifts::repo_types::GiftDirection,
    validation::{
        empty_string_as_none, non_blank, optional_choice, parse_choice, positive_amount,
        required_text, NumberLike,
    },
};

#[derive(Debug, Deserialize)]
pub struct GiftPayload {
    pub name: Option<String>,
    pub gift_type: Option<String>,
    pub event_type: Option<String>,
    pub amount: Option<NumberLike>,
    pub event_date: Option<String>,
    pub relationship: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGift {
    pub name: String,
    pub gift_type: GiftDirection,
    pub event_type: String,
    pub amount: f64,
    pub event_date: Date,
    pub relationship: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl GiftPayload {
    pub fn validate(self) -> Result<NewGift, AppError> {
        let name = required_text("name", self.name)?;
        let gift_type = required_text("gift_type", self.gift_type)?;
        let event_type = required_text("event_type", self.event_type)?;
        let event_date = required_text("event_date", self.event_date)?;
        Ok(NewGift {
            name,
            gift_type: parse_choice("gift_type", &gift_type, GiftDirection::ACCEPTED)?,
            event_type,
            amount: positive_amount("amount", self.amount.as_ref())?,
            event_date: parse_date("event_date", &event_date)?,
            relationship: non_blank(self.relationship),
            location: non_blank(self.location),
            notes: non_blank(self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GiftQuery {
    pub gift_type: Option<String>,
    pub event_type: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GiftFilter {
    pub gift_type: Option<GiftDirection>,
    pub event_type: Option<String>,
    pub name: Option<String>,
    pub range: DateRange,
}

impl GiftQuery {
    pub fn validate(self) -> Result<GiftFilter, AppError> {
        Ok(GiftFilter {
            gift_type: optional_choice(
                "gift_type",
                self.gift_type.as_deref(),
                GiftDirection::ACCEPTED,
            )?,
            event_type: non_blank(self.event_type),
            name: non_blank(self.name),
            range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub year: Option<i32>,
}

impl YearQuery {
    /// Defaults to the current UTC year.
    pub fn year(&self) -> Result<i32, AppError> {
        let year = self.year.unwrap_or_else(|| OffsetDateTime::now_utc().year());
        if !(1900..=9999).contains(&year) {
            return Err(AppError::invalid("year must be between 1900 and 9999"));
        }
        Ok(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> GiftPayload {
        GiftPayload {
            name: Some("Uncle Chen".into()),
            gift_type: Some("receiving".into()),
            event_type: Some("wedding".into()),
            amount: Some(NumberLike::Number(888.0)),
            event_date: Some("2024-10-01".into()),
            relationship: Some("family".into()),
            location: None,
            notes: Some("".into()),
        }
    }

    #[test]
    fn valid_gift() {
        let g = payload().validate().unwrap();
        assert_eq!(g.gift_type, GiftDirection::Receiving);
        assert_eq!(g.amount, 888.0);
        assert_eq!(g.notes, None);
    }

    #[test]
    fn rejects_bad_direction_and_amount() {
        let mut p = payload();
        p.gift_type = Some("lending".into());
        assert!(p.validate().unwrap_err().to_string().contains("giving, receiving"));

        let mut p = payload();
        p.amount = Some(NumberLike::Number(0.0));
        assert!(p.validate().is_err());

        let mut p = payload();
        p.event_type = None;
        assert_eq!(p.validate().unwrap_err().to_string(), "event_type is required");
    }

    #[test]
    fn year_defaults_and_bounds() {
        assert_eq!(YearQuery { year: Some(2023) }.year().unwrap(), 2023);
        assert!(YearQuery { year: Some(12) }.year().is_err());
        assert!(YearQuery { year: None }.year().unwrap() >= 2024);
    }
}
