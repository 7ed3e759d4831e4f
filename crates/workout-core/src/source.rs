//! Workout record sources.
//!
//! A [`WorkoutSource`] stands in for the platform health store: it hands
//! out workout records and answers per-workout cumulative metric queries.
//! Sources are stateless between calls and shared read-only across the
//! export fan-out, so they must be `Send + Sync`.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::record::{DateRange, MetricKind, WorkoutRecord};

/// Every record provider implements this trait.
pub trait WorkoutSource: Send + Sync {
    /// Records with a positive duration, newest end time first. With a
    /// range, only records starting inside it are returned.
    fn fetch(&self, range: Option<&DateRange>) -> Result<Vec<WorkoutRecord>>;

    /// Cumulative sum of `metric` samples recorded during `record`, or
    /// `None` if the store has no samples.
    fn aggregate(&self, record: &WorkoutRecord, metric: MetricKind) -> Result<Option<f64>> {
        Ok(record.metric(metric))
    }
}

/// Apply the fetch contract to raw records: drop empty or negative
/// durations, filter by start time, order by end time descending.
pub fn select_records<I>(records: I, range: Option<&DateRange>) -> Vec<WorkoutRecord>
where
    I: IntoIterator<Item = WorkoutRecord>,
{
    let mut selected: Vec<WorkoutRecord> = records
        .into_iter()
        .filter(|r| r.end > r.start)
        .filter(|r| range.map_or(true, |range| range.contains(r)))
        .collect();
    selected.sort_by(|a, b| b.end.cmp(&a.end));
    selected
}

/// Access state of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Granted,
    Denied,
    Unavailable,
}

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<WorkoutRecord>,
    access: Access,
}

impl MemorySource {
    pub fn new(records: Vec<WorkoutRecord>) -> Self {
        Self {
            records,
            access: Access::Granted,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
}

impl WorkoutSource for MemorySource {
    fn fetch(&self, range: Option<&DateRange>) -> Result<Vec<WorkoutRecord>> {
        match self.access {
            Access::Granted => {}
            Access::Denied => return Err(CoreError::AuthorizationRequired),
            Access::Unavailable => {
                return Err(CoreError::DataSourceUnavailable(
                    "health data is not available on this device".into(),
                ))
            }
        }
        let records = select_records(self.records.iter().cloned(), range);
        tracing::debug!(
            total = self.records.len(),
            selected = records.len(),
            "fetched workouts from memory"
        );
        Ok(records)
    }
}

/// Map a failure to open a record file onto the store error kinds.
pub(crate) fn open_error(path: &Path, e: std::io::Error) -> CoreError {
    match e.kind() {
        std::io::ErrorKind::NotFound => {
            CoreError::DataSourceUnavailable(format!("{} does not exist", path.display()))
        }
        std::io::ErrorKind::PermissionDenied => CoreError::AuthorizationRequired,
        _ => CoreError::fetch_failed(format!("{}: {e}", path.display())),
    }
}

/// Records dumped by the host platform as a JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<WorkoutRecord>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| open_error(&self.path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::fetch_failed(format!("{}: {e}", self.path.display())))
    }
}

impl WorkoutSource for JsonFileSource {
    fn fetch(&self, range: Option<&DateRange>) -> Result<Vec<WorkoutRecord>> {
        let raw = self.load()?;
        let total = raw.len();
        let records = select_records(raw, range);
        tracing::debug!(
            path = %self.path.display(),
            total,
            selected = records.len(),
            "fetched workouts from file"
        );
        Ok(records)
    }
}
