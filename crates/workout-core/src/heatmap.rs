//! Activity heatmap construction.
//!
//! Workouts are bucketed by the local calendar day they start on. Each
//! stored day carries one level (1-5) derived from the activity type
//! through a [`LevelMap`]; days with no workout are not stored and render
//! as level 0. When several workouts fall on the same day the one
//! processed last decides the level.

use chrono::{Datelike, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::activity::ActivityType;
use crate::calendar::{day_key, days_in_year};
use crate::error::{CoreError, Result, ValidationError};
use crate::record::{DateRange, WorkoutRecord};
use crate::source::WorkoutSource;

/// Heatmap intensity/category code. 0 means "no workout".
pub type Level = u8;

/// Highest level a day can carry.
pub const MAX_LEVEL: Level = 5;

/// Activity label to level mapping with a fallback for everything else.
///
/// A year may carry its own table, which replaces the base table for
/// workouts starting in that year. The fallback is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelMap {
    levels: BTreeMap<String, Level>,
    fallback: Level,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    years: BTreeMap<i32, BTreeMap<String, Level>>,
}

impl Default for LevelMap {
    fn default() -> Self {
        let levels = [
            (ActivityType::HighIntensityIntervalTraining, 1),
            (ActivityType::Swimming, 2),
            (ActivityType::Soccer, 3),
            (ActivityType::SkatingSports, 4),
        ]
        .into_iter()
        .map(|(kind, level)| (kind.label().to_string(), level))
        .collect();
        Self {
            levels,
            fallback: MAX_LEVEL,
            years: BTreeMap::new(),
        }
    }
}

fn check_level(label: &str, level: Level) -> Result<Level> {
    if (1..=MAX_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(ValidationError::LevelOutOfRange {
            label: label.to_string(),
            level,
            max: MAX_LEVEL,
        }
        .into())
    }
}

fn level_table<I, S>(levels: I) -> Result<BTreeMap<String, Level>>
where
    I: IntoIterator<Item = (S, Level)>,
    S: AsRef<str>,
{
    let mut map = BTreeMap::new();
    for (label, level) in levels {
        let label = label.as_ref();
        let kind = ActivityType::from_label(label);
        if kind == ActivityType::Other && !label.trim().eq_ignore_ascii_case(kind.label()) {
            return Err(ValidationError::InvalidValue {
                field: format!("heatmap.levels.{label}"),
                message: "not a known activity type".into(),
            }
            .into());
        }
        map.insert(kind.label().to_string(), check_level(label, level)?);
    }
    Ok(map)
}

impl LevelMap {
    /// Build a mapping from activity labels. Labels are matched
    /// case-insensitively and stored in canonical form.
    ///
    /// # Errors
    ///
    /// Fails if a label is not a known activity type or a level lies
    /// outside `1..=5`.
    pub fn new<I, S>(levels: I, fallback: Level) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Level)>,
        S: AsRef<str>,
    {
        Ok(Self {
            levels: level_table(levels)?,
            fallback: check_level("fallback", fallback)?,
            years: BTreeMap::new(),
        })
    }

    /// Use a separate table for workouts starting in `year`.
    ///
    /// # Errors
    ///
    /// Same checks as [`LevelMap::new`].
    pub fn with_year<I, S>(mut self, year: i32, levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Level)>,
        S: AsRef<str>,
    {
        self.years.insert(year, level_table(levels)?);
        Ok(self)
    }

    /// Level from the base table.
    pub fn level_for(&self, kind: ActivityType) -> Level {
        self.levels.get(kind.label()).copied().unwrap_or(self.fallback)
    }

    /// Level for a workout starting in `year`.
    pub fn level_in(&self, year: i32, kind: ActivityType) -> Level {
        let table = self.years.get(&year).unwrap_or(&self.levels);
        table.get(kind.label()).copied().unwrap_or(self.fallback)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Level)> {
        self.levels.iter().map(|(label, level)| (label.as_str(), *level))
    }
}

/// Ordered labels for levels 1..N, optionally replaced for single years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    labels: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    years: BTreeMap<i32, Vec<String>>,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            labels: ["hiit", "swim", "soccer", "surfskate", "other"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            years: BTreeMap::new(),
        }
    }
}

/// One legend line as rendered under a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub level: Level,
    pub label: String,
    pub count: usize,
}

fn check_labels(field: &str, labels: &[String]) -> Result<()> {
    if labels.len() > MAX_LEVEL as usize {
        return Err(ValidationError::InvalidValue {
            field: field.into(),
            message: format!("at most {MAX_LEVEL} labels, got {}", labels.len()),
        }
        .into());
    }
    Ok(())
}

impl Legend {
    /// # Errors
    ///
    /// Fails if there are more labels than levels.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        check_labels("heatmap.legend", &labels)?;
        Ok(Self {
            labels,
            years: BTreeMap::new(),
        })
    }

    /// Use separate labels for `year`.
    ///
    /// # Errors
    ///
    /// Fails if there are more labels than levels.
    pub fn with_year(mut self, year: i32, labels: Vec<String>) -> Result<Self> {
        check_labels(&format!("heatmap.years.{year}.legend"), &labels)?;
        self.years.insert(year, labels);
        Ok(self)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels in effect for `year`.
    pub fn labels_in(&self, year: i32) -> &[String] {
        self.years.get(&year).unwrap_or(&self.labels)
    }

    /// Pair each of `year`'s labels with its level and that level's day
    /// count.
    pub fn entries(&self, year: i32, counts: &BTreeMap<Level, usize>) -> Vec<LegendEntry> {
        self.labels_in(year)
            .iter()
            .zip(1..=MAX_LEVEL)
            .map(|(label, level)| LegendEntry {
                level,
                label: label.clone(),
                count: counts.get(&level).copied().unwrap_or(0),
            })
            .collect()
    }
}

/// Year → day key → level.
///
/// Serialises with string keys: `{"2023": {"1672704000": 2}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeatmapIndex {
    years: BTreeMap<i32, BTreeMap<i64, Level>>,
}

impl HeatmapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a day's level, replacing any earlier one. Returns the replaced
    /// level.
    pub fn insert(&mut self, year: i32, day_key: i64, level: Level) -> Option<Level> {
        self.years.entry(year).or_default().insert(day_key, level)
    }

    pub fn year(&self, year: i32) -> Option<&BTreeMap<i64, Level>> {
        self.years.get(&year)
    }

    pub fn level(&self, year: i32, day_key: i64) -> Level {
        self.year(year)
            .and_then(|days| days.get(&day_key))
            .copied()
            .unwrap_or(0)
    }

    /// Years, newest first.
    pub fn years_descending(&self) -> impl Iterator<Item = (i32, &BTreeMap<i64, Level>)> {
        self.years.iter().rev().map(|(year, days)| (*year, days))
    }

    pub fn summaries(&self) -> Vec<YearSummary> {
        self.years_descending()
            .map(|(year, days)| YearSummary::new(year, days))
            .collect()
    }
}

/// Per-year statistics shown in the heatmap title and legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub recorded_days: usize,
    pub total_days: u32,
    pub percentage: f64,
    /// Level → number of days at that level
    pub legend_counts: BTreeMap<Level, usize>,
}

impl YearSummary {
    pub fn new(year: i32, days: &BTreeMap<i64, Level>) -> Self {
        let total_days = days_in_year(year);
        let mut legend_counts = BTreeMap::new();
        for level in days.values() {
            *legend_counts.entry(*level).or_insert(0) += 1;
        }
        Self {
            year,
            recorded_days: days.len(),
            total_days,
            percentage: days.len() as f64 / f64::from(total_days) * 100.0,
            legend_counts,
        }
    }
}

/// Buckets records into a [`HeatmapIndex`] using local days in `Tz`.
pub struct HeatmapBuilder<'a, Tz: TimeZone> {
    level_map: &'a LevelMap,
    tz: &'a Tz,
}

impl<'a, Tz: TimeZone> HeatmapBuilder<'a, Tz> {
    pub fn new(level_map: &'a LevelMap, tz: &'a Tz) -> Self {
        Self { level_map, tz }
    }

    /// Add one record; later calls overwrite the level of the same day.
    pub fn add(&self, index: &mut HeatmapIndex, record: &WorkoutRecord) {
        let date = record.start.with_timezone(self.tz).date_naive();
        let key = day_key(self.tz, date);
        let level = self.level_map.level_in(date.year(), record.activity_type);
        if let Some(previous) = index.insert(date.year(), key, level) {
            tracing::trace!(%date, previous, level, "day level overwritten");
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::NoRecordsFound`] for an empty slice.
    pub fn build(&self, records: &[WorkoutRecord]) -> Result<HeatmapIndex> {
        if records.is_empty() {
            return Err(CoreError::NoRecordsFound);
        }
        let mut index = HeatmapIndex::new();
        for record in records {
            self.add(&mut index, record);
        }
        tracing::debug!(
            records = records.len(),
            years = index.years.len(),
            "heatmap built"
        );
        Ok(index)
    }
}

/// Fetch from `source` and build the heatmap.
///
/// # Errors
///
/// Propagates fetch errors; returns [`CoreError::NoRecordsFound`] when the
/// fetch is empty.
pub fn build_heatmap<Tz: TimeZone>(
    source: &dyn WorkoutSource,
    range: Option<&DateRange>,
    level_map: &LevelMap,
    tz: &Tz,
) -> Result<HeatmapIndex> {
    let records = source.fetch(range)?;
    HeatmapBuilder::new(level_map, tz).build(&records)
}
