//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Time zone used for day boundaries and CSV timestamps
//! - Export output directory
//! - Heatmap level mapping and legend labels
//! - Default heatmap orientation
//!
//! Configuration is stored at `~/.config/workout-exporter/config.toml`.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::calendar::Orientation;
use crate::error::{ConfigError, Result, ValidationError};
use crate::heatmap::{Legend, Level, LevelMap, MAX_LEVEL};

/// Returns `~/.config/workout-exporter[-dev]/` based on WORKOUT_EXPORTER_ENV.
///
/// Set WORKOUT_EXPORTER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WORKOUT_EXPORTER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("workout-exporter-dev")
    } else {
        base_dir.join("workout-exporter")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Where CSV files are written. Defaults to `<data_dir>/exports`.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Heatmap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default)]
    pub orientation: Orientation,
    /// Labels for levels 1..N.
    #[serde(default = "default_legend")]
    pub legend: Vec<String>,
    /// Level for activities missing from `levels`.
    #[serde(default = "default_fallback_level")]
    pub fallback_level: Level,
    #[serde(default = "default_title")]
    pub title: String,
    /// Activity label → level.
    #[serde(default = "default_levels")]
    pub levels: BTreeMap<String, Level>,
    /// Per-year replacements for `levels` and `legend`, keyed by year.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub years: BTreeMap<String, YearOverride>,
}

/// Level table and legend used for a single year instead of the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<BTreeMap<String, Level>>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/workout-exporter/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `"local"` or a fixed offset such as `"+08:00"`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
}

// Default functions
fn default_timezone() -> String {
    "local".into()
}
fn default_legend() -> Vec<String> {
    Legend::default().labels().to_vec()
}
fn default_levels() -> BTreeMap<String, Level> {
    LevelMap::default()
        .entries()
        .map(|(label, level)| (label.to_string(), level))
        .collect()
}
fn default_fallback_level() -> Level {
    MAX_LEVEL
}
fn default_title() -> String {
    "Workout heatmap".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { output_dir: None }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            legend: default_legend(),
            fallback_level: default_fallback_level(),
            title: default_title(),
            levels: default_levels(),
            years: BTreeMap::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            export: ExportConfig::default(),
            heatmap: HeatmapConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                // level entries are open-ended; every other key must exist
                let existing = match obj.get(part) {
                    Some(existing) => existing.clone(),
                    None if key.starts_with("heatmap.levels.") => serde_json::Value::from(0u8),
                    None => return Err(unknown()),
                };

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|e| invalid(e.to_string()))?
                            .into(),
                    ),
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    /// Load from an explicit path; a missing file yields the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, validating the result.
    /// Does not persist; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check every derived setting.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.level_map()?;
        self.legend()?;
        self.fixed_offset()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails on unknown activity labels or out-of-range levels.
    pub fn level_map(&self) -> Result<LevelMap> {
        let mut map = LevelMap::new(
            self.heatmap.levels.iter().map(|(k, v)| (k.as_str(), *v)),
            self.heatmap.fallback_level,
        )?;
        for (key, year) in &self.heatmap.years {
            if let Some(levels) = &year.levels {
                map = map.with_year(
                    override_year(key)?,
                    levels.iter().map(|(k, v)| (k.as_str(), *v)),
                )?;
            }
        }
        Ok(map)
    }

    /// # Errors
    ///
    /// Fails when more labels than levels are configured.
    pub fn legend(&self) -> Result<Legend> {
        let mut legend = Legend::new(self.heatmap.legend.clone())?;
        for (key, year) in &self.heatmap.years {
            if let Some(labels) = &year.legend {
                legend = legend.with_year(override_year(key)?, labels.clone())?;
            }
        }
        Ok(legend)
    }

    /// Configured output directory or `<data_dir>/exports`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn export_dir(&self) -> Result<PathBuf> {
        match &self.export.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("exports")),
        }
    }

    /// Fixed offset from `timezone`, or `None` for the local zone.
    ///
    /// # Errors
    ///
    /// Fails if `timezone` is neither `"local"` nor a valid offset.
    pub fn fixed_offset(&self) -> Result<Option<FixedOffset>> {
        if self.timezone.eq_ignore_ascii_case("local") {
            Ok(None)
        } else {
            parse_utc_offset(&self.timezone).map(Some)
        }
    }
}

fn override_year(key: &str) -> Result<i32> {
    key.trim().parse().map_err(|_| {
        ValidationError::InvalidValue {
            field: format!("heatmap.years.{key}"),
            message: "expected a year such as 2021".into(),
        }
        .into()
    })
}

/// Parse `+HH:MM`, `-HH:MM` (colon optional), `Z` or `UTC`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything else.
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: "timezone".into(),
        message: format!("expected \"local\" or an offset like +08:00, got {text:?}: {reason}"),
    };
    let text = text.trim();
    if text.eq_ignore_ascii_case("z") || text.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| invalid("out of range".into()).into());
    }

    // format::parse rejects trailing input, unlike FixedOffset's FromStr
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, text, StrftimeItems::new("%:z"))
        .and_then(|()| parsed.to_fixed_offset())
        .map_err(|e| invalid(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityType;
    use crate::error::CoreError;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.heatmap.legend.len(), 5);
        assert_eq!(parsed.heatmap.fallback_level, 5);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            timezone = "+08:00"

            [heatmap.levels]
            running = 1
            "#,
        )
        .unwrap();
        assert_eq!(parsed.heatmap.legend, Config::default().heatmap.legend);
        let map = parsed.level_map().unwrap();
        assert_eq!(map.level_for(ActivityType::Running), 1);
        assert_eq!(map.level_for(ActivityType::Swimming), 5);
        assert_eq!(
            parsed.fixed_offset().unwrap(),
            FixedOffset::east_opt(8 * 3600)
        );
    }

    #[test]
    fn get_and_set_by_path() {
        let mut cfg = Config::default();
        assert_eq!(cfg.get("heatmap.fallback_level").as_deref(), Some("5"));
        assert_eq!(cfg.get("heatmap.orientation").as_deref(), Some("portrait"));

        cfg.set("heatmap.orientation", "landscape").unwrap();
        assert_eq!(cfg.heatmap.orientation, Orientation::Landscape);

        cfg.set("heatmap.levels.running", "3").unwrap();
        assert_eq!(cfg.heatmap.levels.get("running"), Some(&3));

        assert!(cfg.set("heatmap.levels.running", "9").is_err());
        assert_eq!(cfg.heatmap.levels.get("running"), Some(&3));
        assert!(cfg.set("heatmap.nope", "1").is_err());
        assert!(cfg.set("timezone", "mars").is_err());
    }

    #[test]
    fn save_and_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let mut cfg = Config::default();
        cfg.timezone = "-05:00".into();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timezone, "-05:00");

        std::fs::write(&path, "timezone = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn utc_offsets() {
        assert_eq!(parse_utc_offset("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -(5 * 3600 + 1800));
        assert_eq!(parse_utc_offset("+0930").unwrap().local_minus_utc(), 9 * 3600 + 1800);
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("08:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(parse_utc_offset("+01:75").is_err());
        assert!(parse_utc_offset("+08:00 extra").is_err());
    }

    #[test]
    fn utc_offset_rejects_malformed_input_without_panicking() {
        for text in ["+999999:00", "-99999999999", "+-05:00", "--05:00", "+", ""] {
            match parse_utc_offset(text) {
                Err(CoreError::Config(ConfigError::InvalidValue { key, .. })) => {
                    assert_eq!(key, "timezone")
                }
                other => panic!("{text:?} gave {other:?}"),
            }
        }

        let mut cfg = Config::default();
        assert!(cfg.set("timezone", "+999999:00").is_err());
        assert_eq!(cfg.timezone, "local");
    }

    #[test]
    fn year_overrides() {
        let parsed: Config = toml::from_str(
            r#"
            [heatmap.years.2021]
            legend = ["hiit", "swim", "soccer", "walk", "other"]

            [heatmap.years.2021.levels]
            swimming = 2
            walking = 4
            "#,
        )
        .unwrap();
        let map = parsed.level_map().unwrap();
        assert_eq!(map.level_in(2021, ActivityType::Walking), 4);
        assert_eq!(map.level_in(2021, ActivityType::SkatingSports), 5);
        assert_eq!(map.level_in(2022, ActivityType::SkatingSports), 4);
        let legend = parsed.legend().unwrap();
        assert_eq!(legend.labels_in(2021)[3], "walk");
        assert_eq!(legend.labels_in(2022)[3], "surfskate");

        let text = toml::to_string_pretty(&parsed).unwrap();
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), parsed);

        let mut bad = parsed.clone();
        bad.heatmap.years.insert(
            "next".into(),
            YearOverride {
                legend: Some(vec!["hiit".into()]),
                levels: None,
            },
        );
        assert!(bad.validate().is_err());
    }
}
