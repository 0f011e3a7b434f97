//! The raw ice cover series, as plotted over time.
//!
//! Observations come from several satellites. Radar (Sentinel-1) sees
//! through clouds and is shown with its own marker; every other sensor is
//! grouped as optical/thermal.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::TimeseriesRow;

/// Sensor name that identifies radar observations.
pub const RADAR_SENSOR: &str = "Sentinel-1";

/// Years shown in the initial zoom window, counting back from the latest.
pub const INITIAL_ZOOM_YEARS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorClass {
    #[serde(rename = "radar")]
    Radar,
    #[serde(rename = "optical/thermal")]
    OpticalThermal,
}

pub fn classify_sensor(sensor: &str) -> SensorClass {
    if sensor == RADAR_SENSOR {
        SensorClass::Radar
    } else {
        SensorClass::OpticalThermal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoveragePoint {
    pub date: NaiveDate,
    pub lic: f64,
    pub sensor: String,
    pub class: SensorClass,
}

/// Time-ordered ice cover observations with the initial zoom window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IceCoverSeries {
    pub points: Vec<CoveragePoint>,
    /// First and last date of the initial view.
    pub zoom: (NaiveDate, NaiveDate),
    /// First and last calendar year present.
    pub years: (i32, i32),
}

impl IceCoverSeries {
    /// Builds the series. Non-finite values are dropped; points are sorted
    /// by date (stable, so same-day observations keep file order). `None`
    /// when nothing remains.
    pub fn from_rows(rows: &[TimeseriesRow]) -> Option<Self> {
        let mut points: Vec<CoveragePoint> = rows
            .iter()
            .filter(|r| r.lic.is_finite())
            .map(|r| CoveragePoint {
                date: r.dt64,
                lic: r.lic,
                sensor: r.sensor.clone(),
                class: classify_sensor(&r.sensor),
            })
            .collect();
        points.sort_by_key(|p| p.date);

        let first = points.first()?.date;
        let last = points.last()?.date;

        let zoom_from_year = last.year() - INITIAL_ZOOM_YEARS;
        let zoom_start = points
            .iter()
            .map(|p| p.date)
            .find(|d| d.year() >= zoom_from_year)
            .unwrap_or(first);

        Some(Self {
            zoom: (zoom_start, last),
            years: (first.year(), last.year()),
            points,
        })
    }

    pub fn by_class(&self, class: SensorClass) -> impl Iterator<Item = &CoveragePoint> {
        self.points.iter().filter(move |p| p.class == class)
    }

    pub fn title(&self) -> String {
        format!("Lake Ice Coverage ({}–{})", self.years.0, self.years.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(y: i32, m: u32, d: u32, lic: f64, sensor: &str) -> TimeseriesRow {
        TimeseriesRow {
            dt64: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            lic,
            sensor: sensor.to_string(),
        }
    }

    #[test]
    fn test_only_sentinel_1_is_radar() {
        assert_eq!(classify_sensor("Sentinel-1"), SensorClass::Radar);
        assert_eq!(classify_sensor("Sentinel-2"), SensorClass::OpticalThermal);
        assert_eq!(classify_sensor("Landsat"), SensorClass::OpticalThermal);
        assert_eq!(classify_sensor(""), SensorClass::OpticalThermal);
        assert_eq!(classify_sensor("sentinel-1"), SensorClass::OpticalThermal);
    }

    #[test]
    fn test_points_are_sorted_and_non_finite_dropped() {
        let rows = vec![
            row(2021, 2, 1, 50.0, "Landsat"),
            row(2020, 1, 1, f64::NAN, "Landsat"),
            row(2019, 12, 1, 10.0, "Sentinel-1"),
        ];
        let series = IceCoverSeries::from_rows(&rows).unwrap();
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].date, NaiveDate::from_ymd_opt(2019, 12, 1).unwrap());
        assert_eq!(series.points[0].class, SensorClass::Radar);
        assert_eq!(series.by_class(SensorClass::OpticalThermal).count(), 1);
    }

    #[test]
    fn test_zoom_starts_at_first_point_within_last_three_years() {
        let rows = vec![
            row(2015, 1, 1, 1.0, "Landsat"),
            row(2019, 6, 1, 1.0, "Landsat"),
            row(2021, 3, 4, 1.0, "Landsat"),
            row(2022, 1, 9, 1.0, "Landsat"),
        ];
        let series = IceCoverSeries::from_rows(&rows).unwrap();
        assert_eq!(series.zoom.0, NaiveDate::from_ymd_opt(2021, 3, 4).unwrap());
        assert_eq!(series.zoom.1, NaiveDate::from_ymd_opt(2022, 1, 9).unwrap());
        assert_eq!(series.title(), "Lake Ice Coverage (2015–2022)");
    }

    #[test]
    fn test_short_record_zooms_to_everything() {
        let rows = vec![row(2022, 1, 1, 1.0, "Landsat"), row(2022, 2, 1, 1.0, "Landsat")];
        let series = IceCoverSeries::from_rows(&rows).unwrap();
        assert_eq!(series.zoom.0, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    }

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(IceCoverSeries::from_rows(&[]), None);
    }
}
