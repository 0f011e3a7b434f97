/// Core data types for the lake ice service.
///
/// This module defines the shared domain model imported by all other modules:
/// the parsed time-series and phenology rows, the per-day statistics, and the
/// error type used by every fetch and parse path. It contains no I/O.

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Observation date column in `/data/timeseries/{lakeId}.csv`.
pub const COL_DATE: &str = "dt64";

/// Lake ice cover column (percent, 0–100).
pub const COL_LIC: &str = "lic";

/// Sensor name column.
pub const COL_SENSOR: &str = "sensor";

/// Ice-year label column in `/data/phenology/{lakeId}.csv`.
pub const COL_LIP_YEAR: &str = "lip_year";

pub const COL_FUS: &str = "FUS";
pub const COL_FUE: &str = "FUE";
pub const COL_BUS: &str = "BUS";
pub const COL_BUE: &str = "BUE";
pub const COL_ICD: &str = "ICD";
pub const COL_CFD: &str = "CFD";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A single lake ice cover observation.
///
/// One row per observation date per lake, as published in the per-lake
/// time-series CSV. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeseriesRow {
    pub dt64: NaiveDate,
    pub lic: f64,      // percent, 0–100
    pub sensor: String, // e.g. "Sentinel-1", "Sentinel-2", "Landsat"
}

/// Ice phenology for one ice year.
///
/// Event dates are optional: incomplete seasons leave some of them empty.
/// Dates are kept as the raw `YYYY-MM-DD` text from the CSV so the table
/// view can show exactly what was published; the interval deriver parses
/// them on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenologyRow {
    pub lip_year: i32,
    /// Freeze-up start.
    #[serde(rename = "FUS")]
    pub fus: Option<String>,
    /// Freeze-up end.
    #[serde(rename = "FUE")]
    pub fue: Option<String>,
    /// Break-up start.
    #[serde(rename = "BUS")]
    pub bus: Option<String>,
    /// Break-up end.
    #[serde(rename = "BUE")]
    pub bue: Option<String>,
    /// Incomplete freeze duration, in days.
    #[serde(rename = "ICD")]
    pub icd: Option<i64>,
    /// Complete freeze duration, in days.
    #[serde(rename = "CFD")]
    pub cfd: Option<i64>,
}

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

/// Statistics for one calendar day-of-year, merged across all years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStat {
    pub doy: u32, // 1..=366
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p5: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or parsing lake data.
#[derive(Debug, PartialEq)]
pub enum DataError {
    /// Non-2xx HTTP response from the data host.
    HttpError { url: String, status: u16 },
    /// The request never produced a response (DNS, connect, timeout).
    RequestFailed { url: String, message: String },
    /// A local data file could not be read.
    Io {
        path: String,
        kind: std::io::ErrorKind,
        message: String,
    },
    /// The body could not be parsed (CSV, JSON, GeoJSON, dates, numbers).
    ParseError(String),
    /// The CSV had no header row at all.
    EmptyHeader,
    /// A column required by the typed reader is absent from the header.
    MissingColumn(String),
    /// The resource parsed but contained no usable rows.
    NoDataAvailable(String),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::HttpError { url, status } => write!(f, "HTTP error: {}: {}", url, status),
            DataError::RequestFailed { url, message } => {
                write!(f, "Request failed: {}: {}", url, message)
            }
            DataError::Io { path, message, .. } => write!(f, "IO error: {}: {}", path, message),
            DataError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataError::EmptyHeader => write!(f, "Parse error: CSV header is empty"),
            DataError::MissingColumn(col) => write!(f, "Parse error: missing column '{}'", col),
            DataError::NoDataAvailable(what) => write!(f, "No data available: {}", what),
        }
    }
}

impl std::error::Error for DataError {}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_carries_url_and_status() {
        let err = DataError::HttpError {
            url: "/data/timeseries/42.csv".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP error: /data/timeseries/42.csv: 404");
    }

    #[test]
    fn test_phenology_row_serializes_with_csv_column_names() {
        let row = PhenologyRow {
            lip_year: 2021,
            fus: Some("2020-12-01".to_string()),
            fue: None,
            bus: None,
            bue: None,
            icd: Some(10),
            cfd: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["FUS"], "2020-12-01");
        assert!(json["FUE"].is_null());
        assert_eq!(json["ICD"], 10);
    }
}
