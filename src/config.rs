//! Layered run configuration.
//!
//! Every `*.yml` / `*.yaml` file of the env directory is read with the `config`
//! crate into a [`SettingsLayer`] whose fields are all optional. Layers are
//! folded in file-name order with [`Merge`], then environment variables
//! (`COMFY__SECTION__KEY`) and finally command-line overrides are applied.
//! The folded layer is resolved against defaults and validated into
//! [`Settings`].

use crate::error::{ProcessingError, Result};
use crate::utils::constants::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

/// Fold another layer of the same schema into `self`.
///
/// Scalars are overwritten by `other`, sequences are concatenated and nested
/// sections merge field by field.
pub trait Merge {
    fn merge(&mut self, other: Self);
}

fn merge_scalar<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

fn merge_sequence<T>(base: &mut Option<Vec<T>>, other: Option<Vec<T>>) {
    match (base.as_mut(), other) {
        (Some(existing), Some(more)) => existing.extend(more),
        (None, Some(more)) => *base = Some(more),
        (_, None) => {}
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsLayer {
    pub log: LogLayer,
    pub input: InputLayer,
    pub spool: SpoolLayer,
    pub comfort: ComfortLayer,
    pub summary: SummaryLayer,
    pub run: RunLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogLayer {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputLayer {
    pub dir: Option<PathBuf>,
    pub file_globs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpoolLayer {
    pub dir: Option<PathBuf>,
    pub width: Option<usize>,
    pub indent: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComfortLayer {
    pub tmax_solo: TmaxSoloLayer,
    pub tmin_if_tmax_above_max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TmaxSoloLayer {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SummaryLayer {
    pub filename: Option<String>,
    pub sample_month: Option<u32>,
    pub sample_day: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunLayer {
    pub shard: Option<String>,
    pub overwrite: Option<bool>,
    pub max_workers: Option<usize>,
}

impl Merge for SettingsLayer {
    fn merge(&mut self, other: Self) {
        self.log.merge(other.log);
        self.input.merge(other.input);
        self.spool.merge(other.spool);
        self.comfort.merge(other.comfort);
        self.summary.merge(other.summary);
        self.run.merge(other.run);
    }
}

impl Merge for LogLayer {
    fn merge(&mut self, other: Self) {
        merge_scalar(&mut self.level, other.level);
    }
}

impl Merge for InputLayer {
    fn merge(&mut self, other: Self) {
        merge_scalar(&mut self.dir, other.dir);
        merge_sequence(&mut self.file_globs, other.file_globs);
    }
}

impl Merge for SpoolLayer {
    fn merge(&mut self, other: Self) {
        merge_scalar(&mut self.dir, other.dir);
        merge_scalar(&mut self.width, other.width);
        merge_scalar(&mut self.indent, other.indent);
    }
}

impl Merge for ComfortLayer {
    fn merge(&mut self, other: Self) {
        self.tmax_solo.merge(other.tmax_solo);
        merge_scalar(&mut self.tmin_if_tmax_above_max, other.tmin_if_tmax_above_max);
    }
}

impl Merge for TmaxSoloLayer {
    fn merge(&mut self, other: Self) {
        merge_scalar(&mut self.min, other.min);
        merge_scalar(&mut self.max, other.max);
    }
}

impl Merge for SummaryLayer {
    fn merge(&mut self, other: Self) {
        merge_scalar(&mut self.filename, other.filename);
        merge_scalar(&mut self.sample_month, other.sample_month);
        merge_scalar(&mut self.sample_day, other.sample_day);
    }
}

impl Merge for RunLayer {
    fn merge(&mut self, other: Self) {
        merge_scalar(&mut self.shard, other.shard);
        merge_scalar(&mut self.overwrite, other.overwrite);
        merge_scalar(&mut self.max_workers, other.max_workers);
    }
}

impl SettingsLayer {
    /// Read one YAML layer
    pub fn from_file(path: &Path) -> Result<Self> {
        let layer = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(layer)
    }

    /// Read the `COMFY__*` environment layer
    pub fn from_environment() -> Result<Self> {
        let layer = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("input.file_globs"),
            )
            .build()?
            .try_deserialize()?;
        Ok(layer)
    }

    /// Fold every YAML file of `env_dir` in sorted file-name order
    pub fn from_env_dir(env_dir: &Path) -> Result<Self> {
        let mut merged = Self::default();
        if !env_dir.is_dir() {
            debug!("No env directory at {}, using defaults", env_dir.display());
            return Ok(merged);
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(env_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("yml") | Some("yaml")
                )
            })
            .collect();
        files.sort();

        for file in files {
            debug!("Reading config layer {}", file.display());
            merged.merge(Self::from_file(&file)?);
        }

        Ok(merged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct TmaxSolo {
    #[validate(range(min = -90.0, max = 60.0))]
    pub min: f64,
    #[validate(range(min = -90.0, max = 60.0))]
    pub max: f64,
}

/// Thresholds of the comfortable-day rule, degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct ComfortThresholds {
    #[validate(nested)]
    pub tmax_solo: TmaxSolo,
    #[validate(range(min = -90.0, max = 60.0))]
    pub tmin_if_tmax_above_max: f64,
}

impl ComfortThresholds {
    pub fn new(tmax_min: f64, tmax_max: f64, tmin_if_tmax_above_max: f64) -> Self {
        Self {
            tmax_solo: TmaxSolo {
                min: tmax_min,
                max: tmax_max,
            },
            tmin_if_tmax_above_max,
        }
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if self.tmax_solo.min > self.tmax_solo.max {
            return Err(ProcessingError::Config(format!(
                "comfort.tmax_solo.min ({}) is above comfort.tmax_solo.max ({})",
                self.tmax_solo.min, self.tmax_solo.max
            )));
        }
        Ok(())
    }
}

impl Default for ComfortThresholds {
    fn default() -> Self {
        Self::new(
            DEFAULT_TMAX_SOLO_MIN,
            DEFAULT_TMAX_SOLO_MAX,
            DEFAULT_TMIN_IF_TMAX_ABOVE_MAX,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySettings {
    pub filename: String,
    pub sample_month: u32,
    pub sample_day: u32,
}

impl SummarySettings {
    /// Column prefix of the fixed-date sample, e.g. `aug_1`
    pub fn sample_label(&self) -> String {
        let month = crate::models::month_info(self.sample_month)
            .map(|info| info.name)
            .unwrap_or("day");
        format!("{}_{}", month, self.sample_day)
    }
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_level: String,
    pub input_dir: PathBuf,
    pub file_globs: Vec<String>,
    pub spool_dir: PathBuf,
    pub json_width: usize,
    pub json_indent: usize,
    pub thresholds: ComfortThresholds,
    pub summary: SummarySettings,
    pub shard: String,
    pub overwrite: bool,
    pub max_workers: usize,
}

impl Settings {
    /// Load env files, the environment layer and `overrides`, in that order
    pub fn load(env_dir: &Path, overrides: SettingsLayer) -> Result<Self> {
        let mut layer = SettingsLayer::from_env_dir(env_dir)?;
        layer.merge(SettingsLayer::from_environment()?);
        layer.merge(overrides);
        Self::resolve(layer)
    }

    pub fn resolve(layer: SettingsLayer) -> Result<Self> {
        let defaults = ComfortThresholds::default();
        let thresholds = ComfortThresholds::new(
            layer.comfort.tmax_solo.min.unwrap_or(defaults.tmax_solo.min),
            layer.comfort.tmax_solo.max.unwrap_or(defaults.tmax_solo.max),
            layer
                .comfort
                .tmin_if_tmax_above_max
                .unwrap_or(defaults.tmin_if_tmax_above_max),
        );
        thresholds.check()?;

        let summary = SummarySettings {
            filename: layer
                .summary
                .filename
                .unwrap_or_else(|| DEFAULT_SUMMARY_FILENAME.to_string()),
            sample_month: layer.summary.sample_month.unwrap_or(DEFAULT_SAMPLE_MONTH),
            sample_day: layer.summary.sample_day.unwrap_or(DEFAULT_SAMPLE_DAY),
        };
        if !crate::models::calendar::is_calendar_day(summary.sample_month, summary.sample_day) {
            return Err(ProcessingError::Config(format!(
                "summary sample date {}-{} is not a calendar day",
                summary.sample_month, summary.sample_day
            )));
        }

        let file_globs = match layer.input.file_globs {
            Some(globs) if !globs.is_empty() => globs,
            _ => vec![DEFAULT_FILE_GLOB.to_string()],
        };

        let json_indent = layer.spool.indent.unwrap_or(DEFAULT_JSON_INDENT);
        let max_workers = layer.run.max_workers.unwrap_or_else(num_cpus::get).max(1);

        Ok(Self {
            log_level: layer
                .log
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            input_dir: layer
                .input
                .dir
                .unwrap_or_else(|| PathBuf::from("input").join("queue")),
            file_globs,
            spool_dir: layer.spool.dir.unwrap_or_else(|| PathBuf::from("spool")),
            json_width: layer.spool.width.unwrap_or(DEFAULT_JSON_WIDTH),
            json_indent,
            thresholds,
            summary,
            shard: layer
                .run
                .shard
                .unwrap_or_else(|| DEFAULT_SHARD_PATTERN.to_string()),
            overwrite: layer.run.overwrite.unwrap_or(false),
            max_workers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_merge_rules() {
        let mut base = SettingsLayer::default();
        base.log.level = Some("info".to_string());
        base.input.file_globs = Some(vec!["US*.csv".to_string()]);
        base.comfort.tmax_solo.min = Some(17.0);

        let mut over = SettingsLayer::default();
        over.log.level = Some("debug".to_string());
        over.input.file_globs = Some(vec!["CA*.csv".to_string()]);
        over.comfort.tmax_solo.max = Some(30.0);

        base.merge(over);

        assert_eq!(base.log.level.as_deref(), Some("debug"));
        assert_eq!(
            base.input.file_globs,
            Some(vec!["US*.csv".to_string(), "CA*.csv".to_string()])
        );
        assert_eq!(base.comfort.tmax_solo.min, Some(17.0));
        assert_eq!(base.comfort.tmax_solo.max, Some(30.0));
    }

    #[test]
    fn test_defaults_resolve() {
        let settings = Settings::resolve(SettingsLayer::default()).unwrap();
        assert_eq!(settings.thresholds, ComfortThresholds::new(18.0, 28.0, 18.0));
        assert_eq!(settings.file_globs, vec!["*.csv".to_string()]);
        assert_eq!(settings.shard, "*");
        assert!(!settings.overwrite);
        assert_eq!(settings.summary.sample_label(), "aug_1");
        assert!(settings.max_workers >= 1);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut layer = SettingsLayer::default();
        layer.comfort.tmax_solo.min = Some(30.0);
        layer.comfort.tmax_solo.max = Some(20.0);
        assert!(matches!(
            Settings::resolve(layer),
            Err(ProcessingError::Config(_))
        ));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut layer = SettingsLayer::default();
        layer.comfort.tmin_if_tmax_above_max = Some(500.0);
        assert!(matches!(
            Settings::resolve(layer),
            Err(ProcessingError::Validation(_))
        ));
    }

    #[test]
    fn test_leap_day_sample_rejected() {
        let mut layer = SettingsLayer::default();
        layer.summary.sample_month = Some(2);
        layer.summary.sample_day = Some(29);
        assert!(Settings::resolve(layer).is_err());
    }

    #[test]
    fn test_env_dir_layers_in_order() -> Result<()> {
        let dir = TempDir::new()?;

        let mut first = std::fs::File::create(dir.path().join("00-base.yml"))?;
        writeln!(first, "log:\n  level: warn\ninput:\n  file_globs:\n    - \"US*.csv\"")?;
        writeln!(first, "comfort:\n  tmax_solo:\n    min: 16\n    max: 27")?;

        let mut second = std::fs::File::create(dir.path().join("10-local.yml"))?;
        writeln!(second, "log:\n  level: debug\ninput:\n  file_globs:\n    - \"CA*.csv\"")?;
        writeln!(second, "comfort:\n  tmax_solo:\n    max: 29.5")?;

        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let layer = SettingsLayer::from_env_dir(dir.path())?;
        let settings = Settings::resolve(layer)?;

        assert_eq!(settings.log_level, "debug");
        assert_eq!(
            settings.file_globs,
            vec!["US*.csv".to_string(), "CA*.csv".to_string()]
        );
        assert_eq!(settings.thresholds.tmax_solo.min, 16.0);
        assert_eq!(settings.thresholds.tmax_solo.max, 29.5);
        assert_eq!(settings.thresholds.tmin_if_tmax_above_max, 18.0);

        Ok(())
    }

    #[test]
    fn test_missing_env_dir_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let layer = SettingsLayer::from_env_dir(&dir.path().join("absent"))?;
        assert_eq!(layer, SettingsLayer::default());
        Ok(())
    }
}
