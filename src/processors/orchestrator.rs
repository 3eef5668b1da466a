use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::StationMeta;
use crate::processors::{ComfortClassifier, CompletenessChecker, ShardSelector};
use crate::readers::StationReader;
use crate::spool::{SpoolCache, Stage};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use validator::Validate;

/// What happened to one station file during a run
#[derive(Debug, Clone, PartialEq)]
pub enum StationOutcome {
    /// Already fully spooled, or spooled as ineligible by an earlier run
    Skipped,
    /// Not a station in the fifty US states
    Rejected,
    NoTemperatures,
    Incomplete,
    Summarized { total_comfy_days: u32 },
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub selected: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub no_temperatures: usize,
    pub incomplete: usize,
    pub summarized: usize,
    pub failures: Vec<(String, String)>,
}

impl RunReport {
    pub fn record(&mut self, filename: &str, outcome: StationOutcome) {
        self.selected += 1;
        match outcome {
            StationOutcome::Skipped => self.skipped += 1,
            StationOutcome::Rejected => self.rejected += 1,
            StationOutcome::NoTemperatures => self.no_temperatures += 1,
            StationOutcome::Incomplete => self.incomplete += 1,
            StationOutcome::Summarized { .. } => self.summarized += 1,
            StationOutcome::Failed(reason) => self.failures.push((filename.to_string(), reason)),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run Report ===")?;
        writeln!(f, "Selected stations: {}", self.selected)?;
        writeln!(f, "Already spooled:   {}", self.skipped)?;
        writeln!(f, "Non-US rejected:   {}", self.rejected)?;
        writeln!(f, "No temperatures:   {}", self.no_temperatures)?;
        writeln!(f, "Incomplete year:   {}", self.incomplete)?;
        writeln!(f, "Summarized:        {}", self.summarized)?;
        write!(f, "Failed:            {}", self.failed())?;
        for (filename, reason) in self.failures.iter().take(10) {
            write!(f, "\n  {}: {}", filename, reason)?;
        }
        Ok(())
    }
}

/// Drives one run over the station files of a shard
pub struct Orchestrator {
    input_dir: PathBuf,
    file_globs: Vec<String>,
    max_workers: usize,
    reader: StationReader,
    checker: CompletenessChecker,
    classifier: ComfortClassifier,
}

impl Orchestrator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            input_dir: settings.input_dir.clone(),
            file_globs: settings.file_globs.clone(),
            max_workers: settings.max_workers,
            reader: StationReader::new(),
            checker: CompletenessChecker::new(),
            classifier: ComfortClassifier::new(settings.thresholds),
        }
    }

    /// Every station file matched by the input globs, sorted and deduplicated
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        // An unreadable input directory aborts the run before any station is touched
        std::fs::read_dir(&self.input_dir)?;

        let mut files = BTreeSet::new();
        for file_glob in &self.file_globs {
            let pattern = self.input_dir.join(file_glob);
            let pattern = pattern.to_str().ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Input pattern is not valid UTF-8: {}",
                    pattern.display()
                ))
            })?;

            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(path) if path.is_file() => {
                        files.insert(path);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable input entry: {}", e),
                }
            }
        }

        Ok(files.into_iter().collect())
    }

    /// Process every selected station file not already spooled.
    ///
    /// A station that fails is recorded in the report and left out of the spool,
    /// so the next run picks it up again.
    pub fn run(
        &self,
        spool: &SpoolCache,
        shard: &ShardSelector,
        progress: Option<&ProgressReporter>,
    ) -> Result<RunReport> {
        let files: Vec<PathBuf> = self
            .input_files()?
            .into_iter()
            .filter(|path| file_name(path).is_some_and(|name| shard.selects(name)))
            .collect();

        info!(
            "Shard '{}' selected {} station files in {}",
            shard.pattern(),
            files.len(),
            self.input_dir.display()
        );
        if let Some(p) = progress {
            p.set_length(files.len() as u64);
            p.set_message(&format!("Processing {} stations...", files.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let outcomes: Vec<(String, StationOutcome)> = pool.install(|| {
            files
                .par_iter()
                .filter_map(|path| {
                    let filename = file_name(path)?.to_string();
                    let outcome = match self.process_station(path, &filename, spool) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!("Station {} failed: {}", filename, e);
                            StationOutcome::Failed(e.to_string())
                        }
                    };

                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    Some((filename, outcome))
                })
                .collect()
        });

        let mut report = RunReport::default();
        for (filename, outcome) in outcomes {
            report.record(&filename, outcome);
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Processed {} stations ({} summarized)",
                report.selected, report.summarized
            ));
        }
        info!(
            "Run complete: {} summarized, {} skipped, {} failed",
            report.summarized,
            report.skipped,
            report.failed()
        );

        Ok(report)
    }

    /// Run every stage for one station, honouring the spool snapshot
    pub fn process_station(
        &self,
        path: &Path,
        filename: &str,
        spool: &SpoolCache,
    ) -> Result<StationOutcome> {
        let have_meta = spool.exists(Stage::Meta, filename);
        let have_year = [Stage::Tmax, Stage::Tmin, Stage::Year]
            .iter()
            .all(|stage| spool.exists(*stage, filename));

        if have_meta {
            let meta: Option<StationMeta> = spool.read(Stage::Meta, filename)?;
            let eligible = meta.as_ref().is_some_and(StationMeta::is_eligible);
            if !eligible || have_year {
                debug!("{} already spooled", filename);
                return Ok(StationOutcome::Skipped);
            }
        }

        let Some(station) = self.reader.read_station(path)? else {
            if !have_meta {
                spool.write(Stage::Meta, filename, &None::<StationMeta>)?;
            }
            discard_aggregates(spool, filename)?;
            return Ok(StationOutcome::Rejected);
        };

        let completeness = self.checker.check(station.days());
        let meta = station.to_meta(completeness.complete);
        meta.validate()?;
        if !have_meta {
            spool.write(Stage::Meta, filename, &Some(&meta))?;
        }

        if !meta.has_temperature_data {
            discard_aggregates(spool, filename)?;
            return Ok(StationOutcome::NoTemperatures);
        }
        if !meta.has_complete_temperature_year {
            debug!(
                "{} covers only {} calendar days",
                filename, completeness.days_found
            );
            discard_aggregates(spool, filename)?;
            return Ok(StationOutcome::Incomplete);
        }

        let days = self.classifier.classify_days(station.days());
        let year = self.classifier.summarize(meta, &days);

        spool.write(Stage::Tmax, filename, &ComfortClassifier::tmax_means(&days))?;
        spool.write(Stage::Tmin, filename, &ComfortClassifier::tmin_means(&days))?;
        // The year document goes last: it marks the station as complete
        spool.write(Stage::Year, filename, &year)?;

        Ok(StationOutcome::Summarized {
            total_comfy_days: year.total_comfy_days,
        })
    }
}

/// Drop aggregates left over from a run where the station was still eligible
fn discard_aggregates(spool: &SpoolCache, filename: &str) -> Result<()> {
    for stage in [Stage::Year, Stage::Tmin, Stage::Tmax] {
        spool.remove(stage, filename)?;
    }
    Ok(())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
