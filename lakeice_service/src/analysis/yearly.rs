//! Day-of-year percentile aggregation ("average ice year").
//!
//! Observations from all years are merged by calendar day-of-year, reduced
//! to min/max/mean and nearest-rank percentiles, then laid out on a display
//! axis that starts on August 1 so a whole winter reads left to right.
//!
//! Days without any observation are omitted, never interpolated or
//! zero-filled, so the output is sparse.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::model::{TimeseriesRow, YearlyStat};

/// Day-of-year of August 1 in a leap year.
pub const AUGUST_FIRST_LEAP_DOY: u32 = 214;

/// Reference year for the display axis. A leap year, so every doy in
/// 1..=366 has a date.
pub const REFERENCE_YEAR: i32 = 2000;

const Q5: f64 = 0.05;
const Q25: f64 = 0.25;
const Q75: f64 = 0.75;
const Q95: f64 = 0.95;

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Calendar day-of-year, 1 for Jan 1; leap years reach 366.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Nearest-rank percentile: the element at `floor(q * n)` of an ascending
/// slice. No interpolation. `None` for an empty slice.
pub fn nearest_rank(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = (q * sorted.len() as f64).floor() as usize;
    sorted.get(idx.min(sorted.len() - 1)).copied()
}

/// Display date for a day-of-year.
///
/// Jan 1 2000 plus `doy - 1` days; days before August 1 (doy < 214) are
/// pushed 365 days later so they land after the autumn days of the same
/// ice season. Out-of-range doy yields `None`.
pub fn representative_date(doy: u32) -> Option<NaiveDate> {
    if !(1..=366).contains(&doy) {
        return None;
    }
    let jan1 = NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1)?;
    let shift = if doy < AUGUST_FIRST_LEAP_DOY { 365 } else { 0 };
    jan1.checked_add_days(Days::new(u64::from(doy - 1) + shift))
}

/// Index of the first August 1 in `dates`, if any.
pub fn august_first_index(dates: &[NaiveDate]) -> Option<usize> {
    dates.iter().position(|d| d.month() == 8 && d.day() == 1)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Groups values by day-of-year across all years and reduces each group.
///
/// Output is ordered by doy ascending and contains only days that had at
/// least one observation.
pub fn compute_yearly_stats(rows: &[TimeseriesRow]) -> Vec<YearlyStat> {
    let mut by_day: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.lic.is_finite()) {
        by_day.entry(day_of_year(row.dt64)).or_default().push(row.lic);
    }

    by_day
        .into_iter()
        .filter_map(|(doy, mut vals)| {
            vals.sort_by(f64::total_cmp);
            let n = vals.len() as f64;
            Some(YearlyStat {
                doy,
                mean: vals.iter().sum::<f64>() / n,
                min: *vals.first()?,
                max: *vals.last()?,
                p5: nearest_rank(&vals, Q5)?,
                p25: nearest_rank(&vals, Q25)?,
                p75: nearest_rank(&vals, Q75)?,
                p95: nearest_rank(&vals, Q95)?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Display profile
// ---------------------------------------------------------------------------

/// The yearly statistics laid out for plotting: one date axis and seven
/// parallel value arrays, all index-aligned and starting at August 1 when
/// that day is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyProfile {
    pub dates: Vec<NaiveDate>,
    pub mean: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub p5: Vec<f64>,
    pub p25: Vec<f64>,
    pub p75: Vec<f64>,
    pub p95: Vec<f64>,
    /// First and last calendar year present in the input.
    pub years: (i32, i32),
}

impl YearlyProfile {
    /// Builds the rotated profile. `None` when there is nothing to plot;
    /// callers skip the chart in that case rather than treating it as an
    /// error.
    pub fn from_rows(rows: &[TimeseriesRow]) -> Option<Self> {
        let stats = compute_yearly_stats(rows);
        if stats.is_empty() {
            return None;
        }

        let first_year = rows.iter().map(|r| r.dt64.year()).min()?;
        let last_year = rows.iter().map(|r| r.dt64.year()).max()?;

        let mut profile = YearlyProfile {
            dates: stats.iter().filter_map(|s| representative_date(s.doy)).collect(),
            mean: stats.iter().map(|s| s.mean).collect(),
            min: stats.iter().map(|s| s.min).collect(),
            max: stats.iter().map(|s| s.max).collect(),
            p5: stats.iter().map(|s| s.p5).collect(),
            p25: stats.iter().map(|s| s.p25).collect(),
            p75: stats.iter().map(|s| s.p75).collect(),
            p95: stats.iter().map(|s| s.p95).collect(),
            years: (first_year, last_year),
        };
        profile.rotate_to_august();
        Some(profile)
    }

    /// Rotates every parallel array left by the index of the first
    /// August 1. One index, computed once, applied to all arrays.
    pub fn rotate_to_august(&mut self) {
        let Some(k) = august_first_index(&self.dates) else {
            return;
        };
        if k == 0 {
            return;
        }
        self.dates.rotate_left(k);
        for series in [
            &mut self.mean,
            &mut self.min,
            &mut self.max,
            &mut self.p5,
            &mut self.p25,
            &mut self.p75,
            &mut self.p95,
        ] {
            series.rotate_left(k);
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn title(&self) -> String {
        format!("Average Ice Year ({}–{})", self.years.0, self.years.1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
