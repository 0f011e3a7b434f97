//! Lake data availability check.
//!
//! Walks the lookup table and fetches each lake's time series and phenology
//! files to see which lakes actually have data behind them. Useful after
//! publishing a new data release, or before pointing the service at a new
//! host or mirror.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DataPaths;
use crate::ingest::DataSource;
use crate::ingest::phenology::fetch_phenology;
use crate::ingest::timeseries::fetch_timeseries;
use crate::lakes::{LakeLookup, LookupEntry};
use crate::logging;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<LakeVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub complete: usize,
    pub partial: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LakeVerification {
    pub lake_id: String,
    pub name: String,
    pub status: VerificationStatus,
    pub timeseries_rows: usize,
    /// First and last observation year.
    pub timeseries_years: Option<(i32, i32)>,
    pub phenology_rows: usize,
    /// First and last ice year.
    pub phenology_years: Option<(i32, i32)>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    /// Both files load and have rows.
    Success,
    /// Only one of the two files is usable.
    PartialSuccess,
    Failed,
}

fn year_span(years: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    years.fold(None, |span, y| match span {
        None => Some((y, y)),
        Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
    })
}

// ============================================================================
// Per-lake check
// ============================================================================

pub fn verify_lake(source: &dyn DataSource, paths: &DataPaths, lake: &LookupEntry) -> LakeVerification {
    let mut result = LakeVerification {
        lake_id: lake.object_id.clone(),
        name: lake.name.clone(),
        status: VerificationStatus::Failed,
        timeseries_rows: 0,
        timeseries_years: None,
        phenology_rows: 0,
        phenology_years: None,
        errors: Vec::new(),
    };

    match fetch_timeseries(source, paths, &lake.object_id) {
        Ok(rows) if rows.is_empty() => result.errors.push("Timeseries has no rows".to_string()),
        Ok(rows) => {
            result.timeseries_rows = rows.len();
            result.timeseries_years = year_span(rows.iter().map(|r| r.dt64.year()));
        }
        Err(e) => result.errors.push(format!("Timeseries: {}", e)),
    }

    match fetch_phenology(source, paths, &lake.object_id) {
        Ok(rows) if rows.is_empty() => result.errors.push("Phenology has no rows".to_string()),
        Ok(rows) => {
            result.phenology_rows = rows.len();
            result.phenology_years = year_span(rows.iter().map(|r| r.lip_year));
        }
        Err(e) => result.errors.push(format!("Phenology: {}", e)),
    }

    let usable = [result.timeseries_rows > 0, result.phenology_rows > 0]
        .iter()
        .filter(|ok| **ok)
        .count();
    result.status = match usable {
        2 => VerificationStatus::Success,
        1 => VerificationStatus::PartialSuccess,
        _ => VerificationStatus::Failed,
    };

    result
}

// ============================================================================
// Full run
// ============================================================================

pub fn run_verification(source: &dyn DataSource, paths: &DataPaths, lookup: &LakeLookup) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results: Vec::new(),
        summary: VerificationSummary {
            total: lookup.len(),
            ..Default::default()
        },
    };

    println!("Verifying {} lakes against {}", lookup.len(), source.locate("/"));

    for lake in &lookup.entries {
        print!("  {} ({}) ... ", lake.name, lake.object_id);
        let result = verify_lake(source, paths, lake);

        match result.status {
            VerificationStatus::Success => {
                println!(
                    "✓ OK ({} observations, {} ice years)",
                    result.timeseries_rows, result.phenology_rows
                );
                report.summary.complete += 1;
            }
            VerificationStatus::PartialSuccess => {
                println!("⚠ Partial ({})", result.errors.join("; "));
                report.summary.partial += 1;
            }
            VerificationStatus::Failed => {
                println!("✗ FAILED: {}", result.errors.join("; "));
                report.summary.failed += 1;
            }
        }

        report.results.push(result);
    }

    logging::log_verification_summary(
        report.summary.total,
        report.summary.complete,
        report.summary.failed,
    );

    report
}

pub fn print_summary(report: &VerificationReport) {
    let rule = "═".repeat(60);
    println!("\n{}", rule);
    println!("VERIFICATION SUMMARY");
    println!("{}", rule);
    println!();
    println!("Complete:  {}/{}", report.summary.complete, report.summary.total);
    println!("Partial:   {}/{}", report.summary.partial, report.summary.total);
    println!("Failed:    {}/{}", report.summary.failed, report.summary.total);
    println!();

    let usable = report.summary.complete + report.summary.partial;
    let success_rate = if report.summary.total > 0 {
        (usable as f64 / report.summary.total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Lakes with data: {:.1}% ({}/{})",
        success_rate, usable, report.summary.total
    );
    println!("{}", rule);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::DirSource;
    use std::fs;

    fn write(root: &std::path::Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn entry(id: &str) -> LookupEntry {
        LookupEntry {
            name: format!("Lake {id}"),
            object_id: id.to_string(),
        }
    }

    #[test]
    fn test_year_span() {
        assert_eq!(year_span([2019, 2015, 2021].into_iter()), Some((2015, 2021)));
        assert_eq!(year_span(std::iter::empty()), None);
    }

    #[test]
    fn test_verify_lake_statuses() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "data/timeseries/A.csv",
            "dt64,lic,sensor\n2019-01-01,10,Landsat\n2021-02-01,90,Sentinel-1\n",
        );
        write(
            dir.path(),
            "data/phenology/A.csv",
            "lip_year,FUS,FUE,BUS,BUE,ICD,CFD\n2021,,,,,,\n",
        );
        write(dir.path(), "data/timeseries/B.csv", "dt64,lic,sensor\n2020-01-01,5,Landsat\n");

        let source = DirSource::new(dir.path());
        let paths = DataPaths::default();

        let a = verify_lake(&source, &paths, &entry("A"));
        assert_eq!(a.status, VerificationStatus::Success);
        assert_eq!(a.timeseries_rows, 2);
        assert_eq!(a.timeseries_years, Some((2019, 2021)));
        assert_eq!(a.phenology_years, Some((2021, 2021)));
        assert!(a.errors.is_empty());

        let b = verify_lake(&source, &paths, &entry("B"));
        assert_eq!(b.status, VerificationStatus::PartialSuccess);
        assert_eq!(b.errors.len(), 1);
        assert!(b.errors[0].starts_with("Phenology:"));

        let c = verify_lake(&source, &paths, &entry("C"));
        assert_eq!(c.status, VerificationStatus::Failed);
        assert_eq!(c.errors.len(), 2);
    }

    #[test]
    fn test_run_verification_summary_counts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "data/timeseries/A.csv", "dt64,lic,sensor\n2020-01-01,5,Landsat\n");

        let lookup = LakeLookup {
            entries: vec![entry("A"), entry("B")],
        };
        let report = run_verification(&DirSource::new(dir.path()), &DataPaths::default(), &lookup);
        assert_eq!(
            report.summary,
            VerificationSummary {
                total: 2,
                complete: 0,
                partial: 1,
                failed: 1,
            }
        );
        assert_eq!(report.results.len(), 2);
    }
}
