//! Workout records and fetch ranges.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityType;
use crate::error::{Result, ValidationError};

/// A single exercise session as reported by the health store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub activity_type: ActivityType,
    /// Active energy burned in kilocalories, if the store has samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_burned_kcal: Option<f64>,
    /// Distance in meters, if the store has samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

impl WorkoutRecord {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, activity_type: ActivityType) -> Self {
        Self {
            start,
            end,
            activity_type,
            energy_burned_kcal: None,
            distance_m: None,
        }
    }

    pub fn with_energy(mut self, kcal: f64) -> Self {
        self.energy_burned_kcal = Some(kcal);
        self
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance_m = Some(meters);
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Duration in minutes, fractional.
    pub fn duration_minutes(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 60_000.0
    }

    /// Stored cumulative value for a metric.
    pub fn metric(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::ActiveEnergy => self.energy_burned_kcal,
            MetricKind::Distance => self.distance_m,
        }
    }
}

/// Quantity aggregated per workout for the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    /// Kilocalories
    ActiveEnergy,
    /// Meters
    Distance,
}

/// Inclusive fetch window over workout start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDateRange`] when `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end }.into());
        }
        Ok(Self { start, end })
    }

    /// Whole calendar days in `tz`: from midnight of `first` up to the last
    /// instant of `last`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDateRange`] when `first > last`.
    pub fn from_days<Tz: TimeZone>(tz: &Tz, first: NaiveDate, last: NaiveDate) -> Result<Self> {
        let start = crate::calendar::local_midnight(tz, first);
        let next = last.succ_opt().ok_or_else(|| ValidationError::InvalidValue {
            field: "end date".into(),
            message: format!("{last} is the last representable date"),
        })?;
        let end = crate::calendar::local_midnight(tz, next) - Duration::nanoseconds(1);
        Self::new(start, end)
    }

    /// Start-date-inclusive membership test.
    pub fn contains(&self, record: &WorkoutRecord) -> bool {
        record.start >= self.start && record.start <= self.end
    }
}
