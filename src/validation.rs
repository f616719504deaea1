use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Numeric field that forms may send either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|n| n.is_finite())
    }

    pub fn to_i64(&self) -> Option<i64> {
        let n = self.to_f64()?;
        (n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
    }
}

/// Missing or blank strings become `None`; the rest is trimmed.
pub fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn required_text(field: &str, raw: Option<String>) -> Result<String, AppError> {
    non_blank(raw).ok_or_else(|| AppError::invalid(format!("{field} is required")))
}

pub fn required_amount(field: &str, raw: Option<&NumberLike>) -> Result<f64, AppError> {
    let raw = raw.ok_or_else(|| AppError::invalid(format!("{field} is required")))?;
    raw.to_f64()
        .ok_or_else(|| AppError::invalid(format!("{field} must be a number")))
}

pub fn positive_amount(field: &str, raw: Option<&NumberLike>) -> Result<f64, AppError> {
    let n = required_amount(field, raw)?;
    if n <= 0.0 {
        return Err(AppError::invalid(format!("{field} must be greater than 0")));
    }
    Ok(n)
}

/// Absent means zero; present values must not be negative.
pub fn fee(field: &str, raw: Option<&NumberLike>) -> Result<f64, AppError> {
    match raw {
        None => Ok(0.0),
        Some(_) => {
            let n = required_amount(field, raw)?;
            if n < 0.0 {
                return Err(AppError::invalid(format!("{field} must not be negative")));
            }
            Ok(n)
        }
    }
}

pub fn required_id(field: &str, raw: Option<&NumberLike>) -> Result<i64, AppError> {
    let raw = raw.ok_or_else(|| AppError::invalid(format!("{field} is required")))?;
    raw.to_i64()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid(format!("{field} must be a positive integer")))
}

/// Parses an enum-like field, naming the accepted values on failure.
pub fn parse_choice<T: FromStr>(field: &str, raw: &str, accepted: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::invalid(format!("{field} must be one of: {accepted}")))
}

pub fn optional_choice<T: FromStr>(
    field: &str,
    raw: Option<&str>,
    accepted: &str,
) -> Result<Option<T>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_choice(field, s, accepted))
        .transpose()
}

/// Error for `FromStr` on the closed vocabularies (entry kinds, statuses).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value `{}`", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// Query-string helper: `?category_id=` reads as absent rather than failing.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
    }

    #[test]
    fn number_like_accepts_strings() {
        assert_eq!(NumberLike::Text(" 12.5 ".into()).to_f64(), Some(12.5));
        assert_eq!(NumberLike::Number(3.0).to_i64(), Some(3));
        assert_eq!(NumberLike::Number(3.5).to_i64(), None);
        assert_eq!(NumberLike::Text("abc".into()).to_f64(), None);
        assert_eq!(NumberLike::Text("NaN".into()).to_f64(), None);
    }

    #[test]
    fn number_like_deserializes_both_forms() {
        let n: NumberLike = serde_json::from_str("42").unwrap();
        assert_eq!(n.to_f64(), Some(42.0));
        let s: NumberLike = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(s.to_f64(), Some(42.0));
    }

    #[test]
    fn amounts() {
        let zero = NumberLike::Number(0.0);
        assert!(positive_amount("amount", Some(&zero)).is_err());
        assert!(positive_amount("amount", None).is_err());
        assert_eq!(fee("table_fee", None).unwrap(), 0.0);
        assert!(fee("table_fee", Some(&NumberLike::Number(-1.0))).is_err());
        assert_eq!(required_amount("win_amount", Some(&NumberLike::Number(-30.0))).unwrap(), -30.0);
    }

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" hi ".into())), Some("hi".into()));
        let err = required_text("name", Some("".into())).unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(required_id("category_id", Some(&NumberLike::Text("4".into()))).unwrap(), 4);
        assert!(required_id("category_id", Some(&NumberLike::Number(0.0))).is_err());
        assert!(required_id("category_id", Some(&NumberLike::Number(1.5))).is_err());
    }
}
