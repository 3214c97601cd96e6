use std::fmt;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A coerced cell. Missing values are represented by the surrounding
/// `Option`, never by a variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Renders an optional cell for CSV output; missing values become empty cells.
pub fn display_cell(value: Option<&Value>) -> String {
    value.map(Value::as_display).unwrap_or_default()
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &[
        "%d %b %Y",
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%Y/%m/%d",
        "%d-%m-%Y",
    ];
    let trimmed = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        // Accept integral floats such as "2005.0".
        trimmed
            .parse::<f64>()
            .ok()
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_naive_date_supports_provider_and_iso_formats() {
        let expected = NaiveDate::from_ymd_opt(1978, 10, 27).unwrap();
        assert_eq!(parse_naive_date("27 Oct 1978").unwrap(), expected);
        assert_eq!(parse_naive_date("1978-10-27").unwrap(), expected);
        assert_eq!(parse_naive_date("1978/10/27").unwrap(), expected);
        assert!(parse_naive_date("N/A").is_err());
    }

    #[test]
    fn slashed_dates_read_month_first() {
        let march = NaiveDate::from_ymd_opt(2018, 3, 4).unwrap();
        assert_eq!(parse_naive_date("03/04/2018").unwrap(), march);
        let late = NaiveDate::from_ymd_opt(2018, 10, 25).unwrap();
        assert_eq!(parse_naive_date("25/10/2018").unwrap(), late);
    }

    #[test]
    fn numeric_helpers_reject_noise() {
        assert_eq!(parse_integer("1978"), Some(1978));
        assert_eq!(parse_integer(" 61 "), Some(61));
        assert_eq!(parse_integer("2005.0"), Some(2005));
        assert_eq!(parse_integer("2005–2007"), None);
        assert_eq!(parse_integer("99999999999999999999"), None);
        assert_eq!(parse_integer("1e30"), None);
        assert_eq!(parse_integer("-1e30"), None);
        assert_eq!(parse_integer("inf"), None);
        assert_eq!(parse_float("7.8"), Some(7.8));
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("N/A"), None);
    }

    #[test]
    fn display_drops_trailing_zero_fraction() {
        assert_eq!(Value::Float(87.0).as_display(), "87");
        assert_eq!(Value::Float(7.8).as_display(), "7.8");
        assert_eq!(Value::Float(1e15).as_display(), "1000000000000000");
        assert_ne!(Value::Float(1e300).as_display(), i64::MAX.to_string());
        assert_eq!(Value::Float(1e300).as_display(), 1e300_f64.to_string());
        assert_eq!(display_cell(None), "");
        let date = NaiveDate::from_ymd_opt(2018, 10, 19).unwrap();
        assert_eq!(display_cell(Some(&Value::Date(date))), "2018-10-19");
    }
}
