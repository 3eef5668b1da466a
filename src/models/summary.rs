use crate::models::calendar::{month_info, MonthInfo, MONTHS};
use crate::models::StationMeta;
use crate::utils::numeric::round2;
use serde::{Deserialize, Serialize};

/// Every reading that fell on one calendar day across all years of a station
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayClassification {
    pub comfy_count: u32,
    pub uncomfy_count: u32,
    pub tmax_samples: Vec<f64>,
    pub tmin_samples: Vec<f64>,
}

impl DayClassification {
    pub fn record(&mut self, tmax: f64, tmin: f64, comfy: bool) {
        if comfy {
            self.comfy_count += 1;
        } else {
            self.uncomfy_count += 1;
        }
        self.tmax_samples.push(tmax);
        self.tmin_samples.push(tmin);
    }

    pub fn observations(&self) -> u32 {
        self.comfy_count + self.uncomfy_count
    }

    pub fn is_empty(&self) -> bool {
        self.observations() == 0
    }

    pub fn tmax_mean(&self) -> Option<f64> {
        mean(&self.tmax_samples)
    }

    pub fn tmin_mean(&self) -> Option<f64> {
        mean(&self.tmin_samples)
    }

    /// Share of observations that were comfortable, `None` without observations
    pub fn comfy_fraction(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.comfy_count as f64 / self.observations() as f64)
        }
    }

    /// Comfortable on average; ties count as comfortable
    pub fn is_comfy(&self) -> Option<bool> {
        if self.is_empty() {
            None
        } else {
            Some(self.comfy_count >= self.uncomfy_count)
        }
    }

    pub fn summary(&self) -> Option<DaySummary> {
        Some(DaySummary {
            comfy_count: self.comfy_count,
            uncomfy_count: self.uncomfy_count,
            tmax_mean: self.tmax_mean()?,
            tmin_mean: self.tmin_mean()?,
        })
    }
}

/// Arithmetic mean rounded to two decimals
fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(round2(samples.iter().sum::<f64>() / samples.len() as f64))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub comfy_count: u32,
    pub uncomfy_count: u32,
    pub tmax_mean: f64,
    pub tmin_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: String,
    pub total_comfy_days: u32,
    pub average_comfy_days: f64,
    pub days: Vec<Option<DaySummary>>,
}

impl MonthSummary {
    /// Fold the days of one month. Days without observations count towards neither statistic.
    pub fn from_days(info: &MonthInfo, days: &[DayClassification]) -> Self {
        let total_comfy_days = days
            .iter()
            .filter(|day| day.is_comfy() == Some(true))
            .count() as u32;
        let average_comfy_days = round2(days.iter().filter_map(|day| day.comfy_fraction()).sum());

        Self {
            month: info.name.to_string(),
            total_comfy_days,
            average_comfy_days,
            days: days.iter().map(DayClassification::summary).collect(),
        }
    }

    /// Average comfy days as a percentage of the days in the month
    pub fn percent_comfy(&self) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        round2(self.average_comfy_days / self.days.len() as f64 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub meta: StationMeta,
    pub total_comfy_days: u32,
    pub average_comfy_days: f64,
    pub months: Vec<MonthSummary>,
}

impl YearSummary {
    pub fn new(meta: StationMeta, months: Vec<MonthSummary>) -> Self {
        let total_comfy_days = months.iter().map(|m| m.total_comfy_days).sum();
        let average_comfy_days = round2(months.iter().map(|m| m.average_comfy_days).sum());

        Self {
            meta,
            total_comfy_days,
            average_comfy_days,
            months,
        }
    }

    pub fn month(&self, month: u32) -> Option<&MonthSummary> {
        let info = month_info(month)?;
        self.months.iter().find(|m| m.month == info.name)
    }

    pub fn day(&self, month: u32, day: u32) -> Option<&DaySummary> {
        let index = day.checked_sub(1)? as usize;
        self.month(month)?.days.get(index)?.as_ref()
    }

    /// The twelve month totals add up to the year total and all months are present
    pub fn is_consistent(&self) -> bool {
        self.months.len() == MONTHS.len()
            && self.months.iter().map(|m| m.total_comfy_days).sum::<u32>() == self.total_comfy_days
    }
}
