/// Typed reader for the per-lake ice phenology table.
///
/// File: `/data/phenology/{lakeId}.csv`, columns
/// `lip_year, FUS, FUE, BUS, BUE, ICD, CFD`. Event dates are optional and
/// kept as text; durations are whole days.

use crate::config::DataPaths;
use crate::csv::{CsvRecord, CsvTable};
use crate::ingest::{DataSource, fetch_csv};
use crate::logging::{self, DataSource as LogSource};
use crate::model::{
    COL_BUE, COL_BUS, COL_CFD, COL_FUE, COL_FUS, COL_ICD, COL_LIP_YEAR, DataError, PhenologyRow,
};

fn optional_text(record: &CsvRecord, column: &str) -> Option<String> {
    record
        .get(column)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Parses a leading integer the way a lenient reader would: `"12"`,
/// `"12.0"` and `" 12 "` are all 12; empty or non-numeric text is `None`.
pub fn parse_whole_days(text: &str) -> Option<i64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

/// Converts a parsed CSV table into phenology rows, in file order.
///
/// Only `lip_year` is required. Rows whose year does not parse are skipped.
pub fn parse_phenology(table: &CsvTable) -> Result<Vec<PhenologyRow>, DataError> {
    if table.is_empty_header() {
        return Err(DataError::EmptyHeader);
    }
    if !table.has_column(COL_LIP_YEAR) {
        return Err(DataError::MissingColumn(COL_LIP_YEAR.to_string()));
    }

    let mut rows = Vec::with_capacity(table.records.len());
    let mut skipped = 0usize;

    for record in &table.records {
        let Some(lip_year) = record
            .get(COL_LIP_YEAR)
            .and_then(parse_whole_days)
            .and_then(|y| i32::try_from(y).ok())
        else {
            skipped += 1;
            continue;
        };

        rows.push(PhenologyRow {
            lip_year,
            fus: optional_text(record, COL_FUS),
            fue: optional_text(record, COL_FUE),
            bus: optional_text(record, COL_BUS),
            bue: optional_text(record, COL_BUE),
            icd: record.get(COL_ICD).and_then(parse_whole_days),
            cfd: record.get(COL_CFD).and_then(parse_whole_days),
        });
    }

    if skipped > 0 {
        logging::debug(
            LogSource::Phenology,
            None,
            &format!("skipped {} row(s) without a valid lip_year", skipped),
        );
    }

    Ok(rows)
}

/// Fetches and parses the phenology table for one lake.
pub fn fetch_phenology(
    source: &dyn DataSource,
    paths: &DataPaths,
    lake_id: &str,
) -> Result<Vec<PhenologyRow>, DataError> {
    let path = paths.phenology_for(lake_id);
    let table = fetch_csv(source, &path)?;
    parse_phenology(&table)
}
