//! Calendar geometry for the heatmap.
//!
//! Two mutually exclusive layouts are produced per render call:
//!
//! - **Month layout** (portrait): twelve rows, one per month, each with one
//!   cell per day of that month.
//! - **Week layout** (landscape): the whole year as columns of seven cells,
//!   Monday on top, with blank cells before Jan 1 and after Dec 31 so every
//!   column is full.
//!
//! Both are lazy iterators that consume themselves. Day lookups use the
//! same local-midnight day keys the heatmap builder stores.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::heatmap::Level;

/// Proleptic Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Number of days in `month` (1-12). Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Blank cells before Jan 1 in a Monday-first week grid.
///
/// Weekdays are numbered Sunday=1 .. Saturday=7, so Monday yields 0 and
/// Sunday yields 6.
pub fn leading_blanks(year: i32) -> u32 {
    let Some(jan1) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return 0;
    };
    (jan1.weekday().number_from_sunday() + 5) % 7
}

/// Instant of local midnight starting `date` in `tz`.
///
/// If midnight does not exist locally (a DST jump at 00:00) the first
/// instant of the day is one hour later.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::default());
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Unix seconds of local midnight for `date`.
pub fn day_key<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    local_midnight(tz, date).timestamp()
}

/// Which layout a render call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Month rows
    #[default]
    Portrait,
    /// Week columns
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("portrait"),
            Orientation::Landscape => f.write_str("landscape"),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" | "month" => Ok(Orientation::Portrait),
            "landscape" | "week" => Ok(Orientation::Landscape),
            other => Err(format!("unknown orientation: {other}")),
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Cell {
    Blank,
    Day {
        date: NaiveDate,
        day_key: i64,
        level: Level,
    },
}

impl Cell {
    /// Level to paint; blanks are unclassed.
    pub fn level(&self) -> Option<Level> {
        match self {
            Cell::Blank => None,
            Cell::Day { level, .. } => Some(*level),
        }
    }
}

fn day_cell<Tz: TimeZone>(tz: &Tz, days: &BTreeMap<i64, Level>, date: NaiveDate) -> Cell {
    let key = day_key(tz, date);
    Cell::Day {
        date,
        day_key: key,
        level: days.get(&key).copied().unwrap_or(0),
    }
}

/// A month row of the portrait layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthRow {
    pub month: u32,
    /// Grid column count; equals the month's day count.
    pub columns: u32,
    pub cells: Vec<Cell>,
}

/// Portrait layout: yields twelve [`MonthRow`]s.
pub struct MonthLayout<'a, Tz: TimeZone> {
    year: i32,
    next_month: u32,
    days: &'a BTreeMap<i64, Level>,
    tz: &'a Tz,
}

impl<'a, Tz: TimeZone> MonthLayout<'a, Tz> {
    pub fn new(year: i32, days: &'a BTreeMap<i64, Level>, tz: &'a Tz) -> Self {
        Self {
            year,
            next_month: 1,
            days,
            tz,
        }
    }
}

impl<Tz: TimeZone> Iterator for MonthLayout<'_, Tz> {
    type Item = MonthRow;

    fn next(&mut self) -> Option<MonthRow> {
        if self.next_month > 12 {
            return None;
        }
        let month = self.next_month;
        self.next_month += 1;

        let columns = days_in_month(self.year, month);
        let cells = (1..=columns)
            .filter_map(|day| NaiveDate::from_ymd_opt(self.year, month, day))
            .map(|date| day_cell(self.tz, self.days, date))
            .collect();
        Some(MonthRow {
            month,
            columns,
            cells,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = 13usize.saturating_sub(self.next_month as usize);
        (left, Some(left))
    }
}

/// A week column of the landscape layout, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekColumn(pub [Cell; 7]);

/// Landscape layout: yields [`WeekColumn`]s covering the whole year.
pub struct WeekLayout<'a, Tz: TimeZone> {
    year: i32,
    blanks: u32,
    pending_blanks: u32,
    cursor: Option<NaiveDate>,
    days: &'a BTreeMap<i64, Level>,
    tz: &'a Tz,
}

impl<'a, Tz: TimeZone> WeekLayout<'a, Tz> {
    pub fn new(year: i32, days: &'a BTreeMap<i64, Level>, tz: &'a Tz) -> Self {
        let blanks = leading_blanks(year);
        Self {
            year,
            blanks,
            pending_blanks: blanks,
            cursor: NaiveDate::from_ymd_opt(year, 1, 1),
            days,
            tz,
        }
    }

    /// Blank cells placed before Jan 1.
    pub fn leading_blanks(&self) -> u32 {
        self.blanks
    }
}

impl<Tz: TimeZone> Iterator for WeekLayout<'_, Tz> {
    type Item = WeekColumn;

    fn next(&mut self) -> Option<WeekColumn> {
        self.cursor?;

        let mut column = [Cell::Blank; 7];
        for slot in column.iter_mut() {
            if self.pending_blanks > 0 {
                self.pending_blanks -= 1;
                continue;
            }
            let Some(date) = self.cursor else {
                break;
            };
            *slot = day_cell(self.tz, self.days, date);
            self.cursor = date.succ_opt().filter(|next| next.year() == self.year);
        }
        Some(WeekColumn(column))
    }
}

/// The layout chosen for one render call.
pub enum CalendarLayout<'a, Tz: TimeZone> {
    Month(MonthLayout<'a, Tz>),
    Week(WeekLayout<'a, Tz>),
}

impl<'a, Tz: TimeZone> CalendarLayout<'a, Tz> {
    pub fn for_orientation(
        orientation: Orientation,
        year: i32,
        days: &'a BTreeMap<i64, Level>,
        tz: &'a Tz,
    ) -> Self {
        match orientation {
            Orientation::Portrait => CalendarLayout::Month(MonthLayout::new(year, days, tz)),
            Orientation::Landscape => CalendarLayout::Week(WeekLayout::new(year, days, tz)),
        }
    }
}
