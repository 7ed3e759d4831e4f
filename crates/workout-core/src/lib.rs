//! # Workout Exporter Core Library
//!
//! This library turns workout records from a health store into two
//! artifacts: a CSV export and a calendar heatmap of training days. The
//! CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Sources**: the [`WorkoutSource`] trait models the health store
//!   (fetch with an optional start-inclusive date range, per-workout metric
//!   aggregates); [`XmlExportSource`] reads a Health app `export.xml`
//! - **Export**: concurrent per-record aggregate lookups joined into a CSV
//!   document, newest workout first
//! - **Heatmap**: workouts bucketed by local day into year → day → level
//! - **Calendar**: month and week grid geometry for rendering
//! - **Render**: HTML document for the heatmap
//!
//! ## Key Components
//!
//! - [`export_workouts`]: fetch and produce a [`CsvExport`]
//! - [`build_heatmap`]: fetch and produce a [`HeatmapIndex`]
//! - [`CalendarLayout`]: orientation-selected grid
//! - [`Config`]: application configuration management

pub mod activity;
pub mod artifact;
pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod health_export;
pub mod heatmap;
pub mod record;
pub mod render;
pub mod source;

pub use activity::{classify, ActivityType};
pub use artifact::{export_file_name, write_artifact};
pub use calendar::{
    days_in_month, days_in_year, is_leap_year, leading_blanks, CalendarLayout, Cell, MonthLayout,
    MonthRow, Orientation, WeekColumn, WeekLayout,
};
pub use config::Config;
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use export::{build_rows, export_workouts, render_csv, CsvExport, ExportRow, CSV_HEADER};
pub use heatmap::{
    build_heatmap, HeatmapBuilder, HeatmapIndex, Legend, LegendEntry, Level, LevelMap,
    YearSummary, MAX_LEVEL,
};
pub use health_export::XmlExportSource;
pub use record::{DateRange, MetricKind, WorkoutRecord};
pub use render::render_html;
pub use source::{Access, JsonFileSource, MemorySource, WorkoutSource};
