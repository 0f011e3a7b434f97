/// Loading of the published lake data files.
///
/// Submodules:
/// - `source`    : where files come from (HTTP host or local directory)
/// - `timeseries`: typed reader for `/data/timeseries/{lakeId}.csv`
/// - `phenology` : typed reader for `/data/phenology/{lakeId}.csv`

pub mod phenology;
pub mod source;
pub mod timeseries;

pub use source::{DataSource, DirSource, HttpSource};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;

use crate::csv::{CsvTable, parse_csv};
use crate::model::DataError;

/// Fetches a CSV resource and parses it. An empty header is an error here,
/// since no typed reader can work without one.
pub fn fetch_csv(source: &dyn DataSource, path: &str) -> Result<CsvTable, DataError> {
    let text = source.fetch_text(path)?;
    let table = parse_csv(&text);
    if table.is_empty_header() {
        return Err(DataError::EmptyHeader);
    }
    Ok(table)
}

/// Fetches a JSON resource and deserializes it.
pub fn fetch_json<T: DeserializeOwned>(source: &dyn DataSource, path: &str) -> Result<T, DataError> {
    let text = source.fetch_text(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Parses the date part of a published timestamp.
///
/// Accepts plain dates (`2021-03-15`), naive timestamps with `T` or space
/// separator and optional fractional seconds, and RFC 3339 timestamps
/// (converted to UTC before taking the date).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_published_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 15);
        assert_eq!(parse_date("2021-03-15"), expected);
        assert_eq!(parse_date("2021-03-15T10:20:30"), expected);
        assert_eq!(parse_date("2021-03-15 10:20:30.123"), expected);
        assert_eq!(parse_date("2021-03-15T10:20:30Z"), expected);
        assert_eq!(parse_date(" 2021-03-15 "), expected);
    }

    #[test]
    fn test_parse_date_rfc3339_offset_converts_to_utc() {
        // 00:30 at +02:00 is still the previous day in UTC.
        assert_eq!(
            parse_date("2021-03-15T00:30:00+02:00"),
            NaiveDate::from_ymd_opt(2021, 3, 14)
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("NaT"), None);
        assert_eq!(parse_date("2021-02-30"), None);
    }
}
