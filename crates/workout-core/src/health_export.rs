//! Reader for the Apple Health `export.xml` archive.
//!
//! Only `<Workout>` elements are read. Each one carries its activity as an
//! `HKWorkoutActivityType*` name and its bounds as `yyyy-MM-dd HH:mm:ss Z`
//! timestamps. Energy and distance come from the element's `totalEnergyBurned`
//! / `totalDistance` attributes (older exports) or from nested
//! `<WorkoutStatistics>` sums (newer ones). The file is streamed, so exports
//! of several hundred megabytes do not have to fit in memory.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::activity::ActivityType;
use crate::error::{CoreError, Result};
use crate::record::{DateRange, WorkoutRecord};
use crate::source::{open_error, select_records, WorkoutSource};

const ACTIVITY_PREFIX: &str = "HKWorkoutActivityType";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
const ENERGY_STATISTIC: &str = "HKQuantityTypeIdentifierActiveEnergyBurned";
const DISTANCE_STATISTIC: &str = "HKQuantityTypeIdentifierDistance";

/// Workouts read from a Health app `export.xml`.
#[derive(Debug, Clone)]
pub struct XmlExportSource {
    path: PathBuf,
}

impl XmlExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<WorkoutRecord>> {
        let file = File::open(&self.path).map_err(|e| open_error(&self.path, e))?;
        parse_workouts(BufReader::new(file))
            .map_err(|e| CoreError::fetch_failed(format!("{}: {e}", self.path.display())))
    }
}

impl WorkoutSource for XmlExportSource {
    fn fetch(&self, range: Option<&DateRange>) -> Result<Vec<WorkoutRecord>> {
        let raw = self.load()?;
        let total = raw.len();
        let records = select_records(raw, range);
        tracing::debug!(
            path = %self.path.display(),
            total,
            selected = records.len(),
            "fetched workouts from health export"
        );
        Ok(records)
    }
}

/// Map `HKWorkoutActivityTypeRunning` (or a bare `running`) onto the table.
pub fn activity_from_name(name: &str) -> ActivityType {
    ActivityType::from_label(name.strip_prefix(ACTIVITY_PREFIX).unwrap_or(name))
}

/// Parse every `<Workout>` element in `input`.
///
/// # Errors
///
/// Fails on malformed XML or on a workout whose type or dates are missing
/// or unreadable. The message carries the byte offset of the problem.
pub fn parse_workouts<R: BufRead>(input: R) -> std::result::Result<Vec<WorkoutRecord>, String> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut records = Vec::new();
    let mut open: Option<WorkoutRecord> = None;

    loop {
        let at = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("malformed XML at byte {at}: {e}"))?;
        match event {
            Event::Start(e) if e.name().as_ref() == b"Workout" => {
                open = Some(workout(&e).map_err(|e| format!("workout at byte {at}: {e}"))?);
            }
            Event::Empty(e) if e.name().as_ref() == b"Workout" => {
                records.push(workout(&e).map_err(|e| format!("workout at byte {at}: {e}"))?);
            }
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"WorkoutStatistics" => {
                if let Some(record) = open.as_mut() {
                    apply_statistic(record, &e)?;
                }
            }
            Event::End(e) if e.name().as_ref() == b"Workout" => {
                records.extend(open.take());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    tracing::trace!(workouts = records.len(), "parsed health export");
    Ok(records)
}

fn attribute(e: &BytesStart<'_>, name: &str) -> std::result::Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required(e: &BytesStart<'_>, name: &str) -> std::result::Result<String, String> {
    attribute(e, name)?.ok_or_else(|| format!("missing {name}"))
}

fn timestamp(e: &BytesStart<'_>, name: &str) -> std::result::Result<DateTime<Utc>, String> {
    let text = required(e, name)?;
    DateTime::parse_from_str(&text, DATE_FORMAT)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|err| format!("{name} {text:?}: {err}"))
}

fn number(e: &BytesStart<'_>, name: &str) -> std::result::Result<Option<f64>, String> {
    attribute(e, name)?
        .map(|text| text.trim().parse().map_err(|_| format!("{name} {text:?} is not a number")))
        .transpose()
}

fn workout(e: &BytesStart<'_>) -> std::result::Result<WorkoutRecord, String> {
    let kind = activity_from_name(&required(e, "workoutActivityType")?);
    let mut record = WorkoutRecord::new(timestamp(e, "startDate")?, timestamp(e, "endDate")?, kind);

    let energy_unit = attribute(e, "totalEnergyBurnedUnit")?;
    let energy = number(e, "totalEnergyBurned")?.and_then(|v| kcal(v, energy_unit.as_deref()));
    if let Some(value) = energy {
        record = record.with_energy(value);
    }
    let distance_unit = attribute(e, "totalDistanceUnit")?;
    let distance = number(e, "totalDistance")?.and_then(|v| meters(v, distance_unit.as_deref()));
    if let Some(value) = distance {
        record = record.with_distance(value);
    }
    Ok(record)
}

fn apply_statistic(
    record: &mut WorkoutRecord,
    e: &BytesStart<'_>,
) -> std::result::Result<(), String> {
    let Some(kind) = attribute(e, "type")? else {
        return Ok(());
    };
    let Some(sum) = number(e, "sum")? else {
        return Ok(());
    };
    let unit = attribute(e, "unit")?;
    if kind == ENERGY_STATISTIC {
        if let Some(value) = kcal(sum, unit.as_deref()) {
            record.energy_burned_kcal = Some(value);
        }
    } else if kind.starts_with(DISTANCE_STATISTIC) {
        if let Some(value) = meters(sum, unit.as_deref()) {
            record.distance_m = Some(value);
        }
    }
    Ok(())
}

fn kcal(value: f64, unit: Option<&str>) -> Option<f64> {
    match unit.unwrap_or("kcal") {
        "kcal" | "Cal" => Some(value),
        "kJ" => Some(value / 4.184),
        "cal" => Some(value / 1000.0),
        other => {
            tracing::warn!(unit = other, "unsupported energy unit, value dropped");
            None
        }
    }
}

fn meters(value: f64, unit: Option<&str>) -> Option<f64> {
    let factor = match unit.unwrap_or("m") {
        "m" => 1.0,
        "km" => 1000.0,
        "mi" => 1609.344,
        "yd" => 0.9144,
        "ft" => 0.3048,
        other => {
            tracing::warn!(unit = other, "unsupported distance unit, value dropped");
            return None;
        }
    };
    Some(value * factor)
}
