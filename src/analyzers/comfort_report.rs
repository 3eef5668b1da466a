use crate::error::{ProcessingError, Result};
use crate::utils::numeric::scale_onto_array;
use std::path::Path;

const BAR_WIDTH: usize = 50;

/// Distribution of one summary-table column
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub vmin: f64,
    pub vmax: f64,
    pub counts: Vec<usize>,
    /// Rows whose cell was blank or not a number
    pub missing: usize,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Value a bucket is centred on
    pub fn bucket_center(&self, index: usize) -> f64 {
        if self.counts.is_empty() {
            return self.vmin;
        }
        self.vmin + (self.vmax - self.vmin) * index as f64 / self.counts.len() as f64
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{}: {} stations over [{}, {}]",
            self.column,
            self.total(),
            self.vmin,
            self.vmax
        );
        if self.missing > 0 {
            summary.push_str(&format!(" ({} without a value)", self.missing));
        }
        summary.push('\n');

        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        for (index, count) in self.counts.iter().enumerate() {
            let bar = count * BAR_WIDTH / peak;
            summary.push_str(&format!(
                "{:>9.2} | {:<width$} {}\n",
                self.bucket_center(index),
                "#".repeat(bar),
                count,
                width = BAR_WIDTH
            ));
        }
        summary
    }
}

/// Reads the summary table back for reporting
pub struct ComfortReport {
    buckets: usize,
}

impl ComfortReport {
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets: buckets.max(1),
        }
    }

    /// Values of `column` in table order, and the number of rows without one
    pub fn read_column(&self, path: &Path, column: &str) -> Result<(Vec<f64>, usize)> {
        let mut reader = csv::Reader::from_path(path)?;
        let index = reader
            .headers()?
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                ProcessingError::MissingData(format!(
                    "Column '{}' not found in {}",
                    column,
                    path.display()
                ))
            })?;

        let mut values = Vec::new();
        let mut missing = 0;
        for record in reader.records() {
            let record = record?;
            match record.get(index).and_then(|cell| cell.parse::<f64>().ok()) {
                Some(value) => values.push(value),
                None => missing += 1,
            }
        }
        Ok((values, missing))
    }

    /// Bucket `values` evenly across `range`, or across the data when no range is given
    pub fn histogram(
        &self,
        column: &str,
        values: &[f64],
        range: Option<(f64, f64)>,
    ) -> Result<Histogram> {
        if values.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "No values in column '{}'",
                column
            )));
        }

        let (vmin, vmax) = range
            .or_else(|| default_range(column))
            .unwrap_or_else(|| {
                let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (lo, hi)
            });

        let slots: Vec<usize> = (0..self.buckets).collect();
        let mut counts = vec![0; self.buckets];
        for value in values {
            if let Some(&slot) = scale_onto_array(vmin, vmax, *value, &slots) {
                counts[slot] += 1;
            }
        }

        Ok(Histogram {
            column: column.to_string(),
            vmin,
            vmax,
            counts,
            missing: 0,
        })
    }

    pub fn analyze(&self, path: &Path, column: &str, range: Option<(f64, f64)>) -> Result<Histogram> {
        let (values, missing) = self.read_column(path, column)?;
        let mut histogram = self.histogram(column, &values, range)?;
        histogram.missing = missing;
        Ok(histogram)
    }
}

impl Default for ComfortReport {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Natural bounds of the comfy-day columns
fn default_range(column: &str) -> Option<(f64, f64)> {
    match column {
        "total_comfy_days" | "average_comfy_days" => Some((0.0, 365.0)),
        c if c.ends_with("_percent_comfy") => Some((0.0, 100.0)),
        _ => None,
    }
}
