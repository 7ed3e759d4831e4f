//! CSV export of workout records.
//!
//! Each record becomes one [`ExportRow`]. Energy and distance come from
//! per-record aggregate queries against the source; those run as one
//! blocking task per record and every task owns its result slot, so rows
//! are assembled only after all lookups have finished. A failed or panicked
//! lookup yields zero for that field instead of failing the export.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;

use crate::artifact;
use crate::error::{CoreError, Result};
use crate::record::{DateRange, MetricKind, WorkoutRecord};
use crate::source::WorkoutSource;

/// Fixed CSV header.
pub const CSV_HEADER: [&str; 7] = [
    "start time",
    "end time",
    "duration(minutes)",
    "activity type",
    "calories(kcal)",
    "distance(meters)",
    "avg heart rate",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Aggregate values resolved for one record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregates {
    pub energy_kcal: Option<f64>,
    pub distance_m: Option<f64>,
}

impl Aggregates {
    /// Query both metrics. Errors are logged and treated as missing.
    pub fn lookup(source: &dyn WorkoutSource, record: &WorkoutRecord) -> Self {
        let query = |metric| match source.aggregate(record, metric) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(start = %record.start, ?metric, "aggregate lookup failed: {e}");
                None
            }
        };
        let energy_kcal = query(MetricKind::ActiveEnergy);
        let distance_m = query(MetricKind::Distance);
        Self {
            energy_kcal,
            distance_m,
        }
    }
}

/// One CSV line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(skip)]
    pub started_at: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: f64,
    pub activity_type: &'static str,
    pub calories: i64,
    pub distance_meters: i64,
    /// Not computed yet; always 0.
    pub avg_heart_rate: i64,
}

impl ExportRow {
    pub fn new<Tz>(record: &WorkoutRecord, aggregates: Aggregates, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            started_at: record.start,
            start_time: format_timestamp(record.start, tz),
            end_time: format_timestamp(record.end, tz),
            duration_minutes: record.duration_minutes(),
            activity_type: record.activity_type.label(),
            calories: round_or_zero(aggregates.energy_kcal),
            distance_meters: round_or_zero(aggregates.distance_m),
            avg_heart_rate: 0,
        }
    }

    fn fields(&self) -> [String; 7] {
        [
            self.start_time.clone(),
            self.end_time.clone(),
            format!("{:.1}", self.duration_minutes),
            self.activity_type.to_string(),
            self.calories.to_string(),
            self.distance_meters.to_string(),
            self.avg_heart_rate.to_string(),
        ]
    }
}

/// Nearest integer, halves to even (`200.5` → `200`), missing → 0.
fn round_or_zero(value: Option<f64>) -> i64 {
    value.map_or(0, |v| v.round_ties_even() as i64)
}

/// `YYYY-MM-DD HH:MM:SS` in `tz`.
pub fn format_timestamp<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Resolve aggregates for every record concurrently and build the rows,
/// newest start first.
///
/// # Errors
///
/// Returns [`CoreError::NoRecordsFound`] for an empty record set.
pub async fn build_rows<Tz>(
    source: Arc<dyn WorkoutSource>,
    records: Vec<WorkoutRecord>,
    tz: &Tz,
) -> Result<Vec<ExportRow>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if records.is_empty() {
        return Err(CoreError::NoRecordsFound);
    }

    let lookups: Vec<_> = records
        .into_iter()
        .map(|record| {
            let source = Arc::clone(&source);
            let probe = record.clone();
            let handle =
                tokio::task::spawn_blocking(move || Aggregates::lookup(source.as_ref(), &probe));
            (record, handle)
        })
        .collect();

    let mut rows = Vec::with_capacity(lookups.len());
    for (record, handle) in lookups {
        let aggregates = handle.await.unwrap_or_else(|e| {
            tracing::warn!(start = %record.start, "aggregate task failed: {e}");
            Aggregates::default()
        });
        rows.push(ExportRow::new(&record, aggregates, tz));
    }

    rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Ok(rows)
}

/// Header plus rows, newline-joined, without a trailing newline.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn render_csv(rows: &[ExportRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Io(e.into_error()))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| CoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

/// A finished CSV document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvExport {
    pub fetched_at: DateTime<Utc>,
    pub row_count: usize,
    pub csv: String,
}

impl CsvExport {
    /// `workout_export_<fetch seconds>.csv`
    pub fn file_name(&self) -> String {
        artifact::export_file_name(self.fetched_at)
    }
}

/// Fetch from `source` and produce the CSV document.
///
/// # Errors
///
/// Propagates fetch errors and returns [`CoreError::NoRecordsFound`] when
/// nothing matches.
pub async fn export_workouts<Tz>(
    source: Arc<dyn WorkoutSource>,
    range: Option<DateRange>,
    tz: &Tz,
) -> Result<CsvExport>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let fetched_at = Utc::now();
    let fetcher = Arc::clone(&source);
    let records = tokio::task::spawn_blocking(move || fetcher.fetch(range.as_ref()))
        .await
        .map_err(CoreError::fetch_failed)??;
    tracing::debug!(records = records.len(), "exporting workouts");

    let rows = build_rows(source, records, tz).await?;
    Ok(CsvExport {
        fetched_at,
        row_count: rows.len(),
        csv: render_csv(&rows)?,
    })
}
