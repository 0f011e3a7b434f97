/// Typed reader for the per-lake ice cover time series.
///
/// File: `/data/timeseries/{lakeId}.csv`, columns `dt64, lic, sensor`.
/// Rows whose date or ice cover value cannot be parsed are skipped rather
/// than failing the whole file; the count of skipped rows is logged.

use crate::config::DataPaths;
use crate::csv::CsvTable;
use crate::ingest::{DataSource, fetch_csv, parse_date};
use crate::logging::{self, DataSource as LogSource};
use crate::model::{COL_DATE, COL_LIC, COL_SENSOR, DataError, TimeseriesRow};

/// Converts a parsed CSV table into observation rows.
///
/// `dt64` and `lic` are required columns; `sensor` may be absent, in which
/// case every row gets an empty sensor name.
pub fn parse_timeseries(table: &CsvTable) -> Result<Vec<TimeseriesRow>, DataError> {
    if table.is_empty_header() {
        return Err(DataError::EmptyHeader);
    }
    for col in [COL_DATE, COL_LIC] {
        if !table.has_column(col) {
            return Err(DataError::MissingColumn(col.to_string()));
        }
    }

    let mut rows = Vec::with_capacity(table.records.len());
    let mut skipped = 0usize;

    for record in &table.records {
        let date = record.get(COL_DATE).and_then(parse_date);
        let lic = record
            .get(COL_LIC)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());

        match (date, lic) {
            (Some(dt64), Some(lic)) => rows.push(TimeseriesRow {
                dt64,
                lic,
                sensor: record.get(COL_SENSOR).unwrap_or("").trim().to_string(),
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        logging::debug(
            LogSource::Timeseries,
            None,
            &format!("skipped {} unparseable row(s) of {}", skipped, table.records.len()),
        );
    }

    Ok(rows)
}

/// Fetches and parses the time series for one lake.
pub fn fetch_timeseries(
    source: &dyn DataSource,
    paths: &DataPaths,
    lake_id: &str,
) -> Result<Vec<TimeseriesRow>, DataError> {
    let path = paths.timeseries_for(lake_id);
    let table = fetch_csv(source, &path)?;
    parse_timeseries(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_csv;
    use chrono::NaiveDate;

    #[test]
    fn test_parses_rows_in_file_order() {
        let table = parse_csv(
            "dt64,lic,sensor\n\
             2020-01-02,80.5,Sentinel-1\n\
             2020-01-01,100,Landsat\n",
        );
        let rows = parse_timeseries(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dt64, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(rows[0].lic, 80.5);
        assert_eq!(rows[0].sensor, "Sentinel-1");
        assert_eq!(rows[1].lic, 100.0);
    }

    #[test]
    fn test_unparseable_rows_are_skipped() {
        let table = parse_csv(
            "dt64,lic,sensor\n\
             not-a-date,50,Landsat\n\
             2020-01-01,,Landsat\n\
             2020-01-03,NaN,Landsat\n\
             2020-01-04,12,Sentinel-2\n",
        );
        let rows = parse_timeseries(&table).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sensor, "Sentinel-2");
    }

    #[test]
    fn test_missing_required_column_is_error() {
        let table = parse_csv("dt64,sensor\n2020-01-01,Landsat");
        assert_eq!(
            parse_timeseries(&table),
            Err(DataError::MissingColumn("lic".to_string()))
        );
    }

    #[test]
    fn test_missing_sensor_column_gives_empty_sensor() {
        let table = parse_csv("dt64,lic\n2020-01-01,3");
        let rows = parse_timeseries(&table).unwrap();
        assert_eq!(rows[0].sensor, "");
    }

    #[test]
    fn test_empty_text_is_empty_header_error() {
        let table = parse_csv("");
        assert_eq!(parse_timeseries(&table), Err(DataError::EmptyHeader));
    }
}
