use crate::config::SummarySettings;
use crate::error::Result;
use crate::models::YearSummary;
use crate::spool::{SpoolCache, Stage};
use crate::writers::{SummaryRow, SummaryWriter};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    /// The table was already spooled and overwrite was not requested
    AlreadyPresent(PathBuf),
    Written { path: PathBuf, stations: usize },
}

/// Folds every spooled year document into the cross-station summary table
pub struct SummaryBuilder {
    settings: SummarySettings,
    writer: SummaryWriter,
}

impl SummaryBuilder {
    pub fn new(settings: SummarySettings) -> Self {
        let writer = SummaryWriter::new(&settings.sample_label());
        Self { settings, writer }
    }

    pub fn row(&self, year: &YearSummary) -> SummaryRow {
        let sample = year.day(self.settings.sample_month, self.settings.sample_day);
        let mut month_percent_comfy = [0.0; 12];
        for (slot, month) in month_percent_comfy.iter_mut().zip(&year.months) {
            *slot = month.percent_comfy();
        }

        SummaryRow {
            id: year.meta.id.clone(),
            state: year.meta.state_code.clone(),
            start_date: year.meta.start_date,
            end_date: year.meta.end_date,
            lat: year.meta.latitude,
            lon: year.meta.longitude,
            elev_m: year.meta.elevation_m,
            total_comfy_days: year.total_comfy_days,
            average_comfy_days: year.average_comfy_days,
            sample_tmin: sample.map(|d| d.tmin_mean),
            sample_tmax: sample.map(|d| d.tmax_mean),
            month_percent_comfy,
            name: year.meta.name.clone(),
        }
    }

    /// Rows for every year document, sorted by state then ascending average comfy days
    pub fn build(&self, spool: &SpoolCache) -> Result<Vec<SummaryRow>> {
        let mut rows = Vec::new();
        for filename in spool.list(Stage::Year)? {
            match spool.read::<YearSummary>(Stage::Year, &filename) {
                Ok(year) => rows.push(self.row(&year)),
                Err(e) => warn!("Leaving {} out of the summary: {}", filename, e),
            }
        }

        rows.sort_by(|a, b| {
            a.state
                .cmp(&b.state)
                .then(a.average_comfy_days.total_cmp(&b.average_comfy_days))
        });
        Ok(rows)
    }

    pub fn finalize(&self, spool: &SpoolCache, overwrite: bool) -> Result<FinalizeOutcome> {
        let filename = &self.settings.filename;
        let path = spool.path(Stage::Comfy, filename);

        if !overwrite && spool.exists(Stage::Comfy, filename) {
            info!("Summary {} already present", path.display());
            return Ok(FinalizeOutcome::AlreadyPresent(path));
        }

        let rows = self.build(spool)?;
        self.writer.write_to_spool(spool, filename, &rows)?;
        info!("Wrote {} stations to {}", rows.len(), path.display());

        Ok(FinalizeOutcome::Written {
            path,
            stations: rows.len(),
        })
    }
}
