pub mod classify;
pub mod config;
pub mod export;
pub mod heatmap;

use chrono::{FixedOffset, NaiveDate, TimeZone};
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use workout_core::config::parse_utc_offset;
use workout_core::{Config, DateRange, JsonFileSource, WorkoutSource, XmlExportSource};

/// `.xml` files are read as a Health app export, anything else as a JSON
/// array of records.
pub fn open_source(path: &Path) -> Arc<dyn WorkoutSource> {
    let is_xml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    if is_xml {
        Arc::new(XmlExportSource::new(path))
    } else {
        Arc::new(JsonFileSource::new(path))
    }
}

/// Inclusive calendar-day window shared by `export` and `heatmap`.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> workout_core::Result<Option<DateRange>> {
        match (self.from, self.to) {
            (Some(first), Some(last)) => DateRange::from_days(tz, first, last).map(Some),
            _ => Ok(None),
        }
    }
}

/// Time zone for a run: the `--utc-offset` flag wins over the config.
pub enum Zone {
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn resolve(flag: Option<&str>, config: &Config) -> workout_core::Result<Self> {
        let fixed = match flag {
            Some(text) => Some(parse_utc_offset(text)?),
            None => config.fixed_offset()?,
        };
        Ok(fixed.map_or(Zone::Local, Zone::Fixed))
    }
}
