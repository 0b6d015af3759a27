//! Text parsing for values that cross the record-store boundary.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::model::VehicleType;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a trip or registration date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.fff]`, `YYYY-MM-DDTHH:MM:SS`
/// and RFC 3339 timestamps. Any time-of-day component is dropped.
///
/// # Errors
///
/// Returns an error if the text matches none of the accepted layouts.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.date_naive());
    }
    for layout in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(ts.date());
        }
    }

    bail!("invalid date '{text}' (expected YYYY-MM-DD)")
}

/// Formats a date the way the store persists it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a vehicle type label such as `Truck`.
pub fn parse_vehicle_type(text: &str) -> Result<VehicleType> {
    text.parse::<VehicleType>().map_err(anyhow::Error::msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let date = parse_date("2025-01-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn test_parse_truncates_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(parse_date("2025-01-05 23:59:59").unwrap(), expected);
        assert_eq!(parse_date("2025-01-05T08:30:00").unwrap(), expected);
        assert_eq!(parse_date("2025-01-05 00:00:00.000").unwrap(), expected);
    }

    #[test]
    fn test_parse_rfc3339_keeps_local_date() {
        let date = parse_date("2025-01-05T23:30:00+05:30").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(parse_date("05/01/2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_format_date_round_trips() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
    }

    #[test]
    fn test_parse_vehicle_type() {
        assert_eq!(parse_vehicle_type("car").unwrap(), VehicleType::Car);
        assert!(parse_vehicle_type("tractor").is_err());
    }
}
