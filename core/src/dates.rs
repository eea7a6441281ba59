//! `DD/MM/YYYY HH:MM:SS.mmm`, the date format of ORCRIM query parameters.

use chrono::NaiveDateTime;

use crate::error::ApiError;

const QUERY_FORMAT: &str = "%d/%m/%Y %H:%M:%S%.3f";

/// Render a timestamp for a query parameter. Sub-millisecond precision is
/// truncated.
pub fn format_query_date(value: NaiveDateTime) -> String {
    value.format(QUERY_FORMAT).to_string()
}

pub fn parse_query_date(value: &str) -> Result<NaiveDateTime, ApiError> {
    NaiveDateTime::parse_from_str(value, QUERY_FORMAT)
        .map_err(|e| ApiError::InvalidInput(format!("date {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn formats_with_milliseconds() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_milli_opt(8, 5, 9, 42)
            .unwrap();
        assert_eq!(format_query_date(dt), "31/01/2024 08:05:09.042");
    }

    #[test]
    fn truncates_microseconds() {
        let dt = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_micro_opt(0, 0, 0, 999_999)
            .unwrap();
        assert_eq!(format_query_date(dt), "01/01/2023 00:00:00.999");
    }

    #[test]
    fn parse_accepts_wire_format() {
        let dt = parse_query_date("01/01/2023 00:00:00.000").unwrap();
        assert_eq!(format_query_date(dt), "01/01/2023 00:00:00.000");
    }

    #[test]
    fn parse_rejects_iso_dates() {
        let err = parse_query_date("2023-01-01T00:00:00").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}
