//! Ice phenology on a shared ice-year axis.
//!
//! Each ice year is a row of freeze-up / frozen / break-up bars. To overlay
//! many years on one chart, every event date is projected onto a fixed
//! 365-slot axis running Aug 1 – Jul 31 (reference season 2000/2001). Only
//! month and day survive the projection; the year is used solely to decide
//! which half of the season the date belongs to.
//!
//! Feb 29 has no slot on the axis and resolves to no index. That is the
//! accepted cost of a fixed-length axis, not an error.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::ingest::parse_date;
use crate::model::PhenologyRow;

/// Number of slots on the ice-year axis. Fixed; no leap day.
pub const ICE_YEAR_SLOTS: usize = 365;

/// Calendar year of the axis' Aug 1 start.
pub const AXIS_START_YEAR: i32 = 2000;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// The fixed Aug 1 – Jul 31 category axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceYearAxis {
    start: NaiveDate,
}

impl Default for IceYearAxis {
    fn default() -> Self {
        Self::new()
    }
}

impl IceYearAxis {
    pub fn new() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(AXIS_START_YEAR, 8, 1).unwrap_or(NaiveDate::MIN),
        }
    }

    /// Reference date of slot `index`.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= ICE_YEAR_SLOTS {
            return None;
        }
        self.start.checked_add_days(Days::new(index as u64))
    }

    /// All slot dates in axis order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..ICE_YEAR_SLOTS).filter_map(|i| self.date_at(i)).collect()
    }

    /// Slot index for an arbitrary calendar date.
    ///
    /// January–July belong to the second half of the season and are placed
    /// in `AXIS_START_YEAR + 1`; August–December stay in `AXIS_START_YEAR`.
    /// Feb 29 cannot be rebuilt in the (common) second year and yields
    /// `None`.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let ref_year = if date.month() < 8 {
            AXIS_START_YEAR + 1
        } else {
            AXIS_START_YEAR
        };
        let projected = NaiveDate::from_ymd_opt(ref_year, date.month(), date.day())?;
        let offset = (projected - self.start).num_days();
        usize::try_from(offset).ok().filter(|i| *i < ICE_YEAR_SLOTS)
    }

    /// Slot index for an optional date string; empty or unparseable text
    /// resolves to `None`.
    pub fn index_of_text(&self, text: Option<&str>) -> Option<usize> {
        text.and_then(parse_date).and_then(|d| self.index_of(d))
    }
}

// ---------------------------------------------------------------------------
// Intervals and events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[serde(rename = "Freeze-up")]
    FreezeUp,
    #[serde(rename = "Frozen")]
    Frozen,
    #[serde(rename = "Break-up")]
    BreakUp,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::FreezeUp => "Freeze-up",
            Phase::Frozen => "Frozen",
            Phase::BreakUp => "Break-up",
        }
    }
}

/// A drawable bar: year row plus start/end slots on the ice-year axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub year_index: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    #[serde(rename = "FUS")]
    FreezeUpStart,
    #[serde(rename = "FUE")]
    FreezeUpEnd,
    #[serde(rename = "BUS")]
    BreakUpStart,
    #[serde(rename = "BUE")]
    BreakUpEnd,
}

impl EventKind {
    pub fn code(&self) -> &'static str {
        match self {
            EventKind::FreezeUpStart => "FUS",
            EventKind::FreezeUpEnd => "FUE",
            EventKind::BreakUpStart => "BUS",
            EventKind::BreakUpEnd => "BUE",
        }
    }
}

/// A single event marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhenologyEvent {
    pub kind: EventKind,
    pub axis_index: usize,
    pub year_index: usize,
}

/// Everything the interval chart needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenologyChart {
    /// Slot dates of the x axis (always 365 entries).
    pub axis: Vec<NaiveDate>,
    /// Year categories of the y axis, in input order.
    pub years: Vec<i32>,
    pub freeze_up: Vec<Interval>,
    pub frozen: Vec<Interval>,
    pub break_up: Vec<Interval>,
    pub events: Vec<PhenologyEvent>,
}

impl PhenologyChart {
    pub fn intervals(&self, phase: Phase) -> &[Interval] {
        match phase {
            Phase::FreezeUp => &self.freeze_up,
            Phase::Frozen => &self.frozen,
            Phase::BreakUp => &self.break_up,
        }
    }

    /// Tooltip text for an event: code, ice year and axis date ("Mar 15").
    pub fn describe_event(&self, event: &PhenologyEvent) -> Option<String> {
        let year = self.years.get(event.year_index)?;
        let date = self.axis.get(event.axis_index)?;
        Some(format!("{} {} {}", event.kind.code(), year, date.format("%b %-d")))
    }
}

fn push_interval(bars: &mut Vec<Interval>, year_index: usize, start: Option<usize>, end: Option<usize>) {
    if let (Some(start), Some(end)) = (start, end) {
        // Reversed or zero-length intervals are dropped, not repaired.
        if start < end {
            bars.push(Interval { year_index, start, end });
        }
    }
}

/// Derives bars and event markers from phenology rows.
///
/// The year axis is the `lip_year` sequence as given; a row's `year_index`
/// is the first position of its year in that sequence. Point events are
/// emitted independently of interval validity, so a missing FUE still
/// leaves a valid FUS marker.
pub fn derive_phenology(rows: &[PhenologyRow]) -> PhenologyChart {
    let axis = IceYearAxis::new();
    let years: Vec<i32> = rows.iter().map(|r| r.lip_year).collect();

    let mut chart = PhenologyChart {
        axis: axis.dates(),
        years: years.clone(),
        freeze_up: Vec::new(),
        frozen: Vec::new(),
        break_up: Vec::new(),
        events: Vec::new(),
    };

    for row in rows {
        let year_index = years.iter().position(|y| *y == row.lip_year).unwrap_or_default();

        let fus = axis.index_of_text(row.fus.as_deref());
        let fue = axis.index_of_text(row.fue.as_deref());
        let bus = axis.index_of_text(row.bus.as_deref());
        let bue = axis.index_of_text(row.bue.as_deref());

        push_interval(&mut chart.freeze_up, year_index, fus, fue);
        push_interval(&mut chart.frozen, year_index, fue, bus);
        push_interval(&mut chart.break_up, year_index, bus, bue);

        for (kind, idx) in [
            (EventKind::FreezeUpStart, fus),
            (EventKind::FreezeUpEnd, fue),
            (EventKind::BreakUpStart, bus),
            (EventKind::BreakUpEnd, bue),
        ] {
            if let Some(axis_index) = idx {
                chart.events.push(PhenologyEvent {
                    kind,
                    axis_index,
                    year_index,
                });
            }
        }
    }

    chart
}

// ---------------------------------------------------------------------------
// Table view
// ---------------------------------------------------------------------------

/// A column of the phenology table with its header tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const TABLE_COLUMNS: [TableColumn; 7] = [
    TableColumn { key: "lip_year", label: "Year", description: "Year of observation" },
    TableColumn { key: "FUS", label: "FUS", description: "Freeze-up Start (YYYY-MM-DD)" },
    TableColumn { key: "FUE", label: "FUE", description: "Freeze-up End (YYYY-MM-DD)" },
    TableColumn { key: "BUS", label: "BUS", description: "Break-up Start (YYYY-MM-DD)" },
    TableColumn { key: "BUE", label: "BUE", description: "Break-up End (YYYY-MM-DD)" },
    TableColumn { key: "ICD", label: "ICD", description: "Incomplete Freeze Duration (days)" },
    TableColumn { key: "CFD", label: "CFD", description: "Complete Freeze Duration (days)" },
];

/// The phenology table: newest year first, one text cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenologyTable {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl PhenologyTable {
    pub fn from_rows(rows: &[PhenologyRow]) -> Self {
        let mut sorted: Vec<&PhenologyRow> = rows.iter().collect();
        // Stable, so rows sharing a year keep their file order.
        sorted.sort_by(|a, b| b.lip_year.cmp(&a.lip_year));

        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let days = |v: Option<i64>| v.map(|d| d.to_string()).unwrap_or_default();

        Self {
            columns: TABLE_COLUMNS.to_vec(),
            rows: sorted
                .into_iter()
                .map(|r| {
                    vec![
                        r.lip_year.to_string(),
                        text(&r.fus),
                        text(&r.fue),
                        text(&r.bus),
                        text(&r.bue),
                        days(r.icd),
                        days(r.cfd),
                    ]
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
