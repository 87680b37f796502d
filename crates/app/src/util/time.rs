use chrono::{NaiveDate, Utc};

use crate::error::{AppError, Result};

/// Calendar date the scheduled run records its total under.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| AppError::InvalidInput(format!("invalid date {value:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let date = parse_date("2024-01-03").expect("date");
        assert_eq!(date.to_string(), "2024-01-03");
        assert!(parse_date("03/01/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }
}
