use crate::models::calendar::day_of_year_slot;
use serde::{Deserialize, Serialize};

/// Convert a GHCN reading in tenths of a degree to degrees Celsius
pub fn normalize_temperature(tenths_c: i32) -> f64 {
    tenths_c as f64 / 10.0
}

/// One day-level row of a station file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayRecord {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub tmax_tenths_c: Option<i32>,
    pub tmin_tenths_c: Option<i32>,
}

impl DayRecord {
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        tmax_tenths_c: Option<i32>,
        tmin_tenths_c: Option<i32>,
    ) -> Self {
        Self {
            year,
            month,
            day,
            tmax_tenths_c,
            tmin_tenths_c,
        }
    }

    pub fn is_leap_day(&self) -> bool {
        self.month == 2 && self.day == 29
    }

    /// Day-of-year slot in the 365-day comfort calendar
    pub fn slot(&self) -> Option<usize> {
        day_of_year_slot(self.month, self.day)
    }

    /// Both extremes in degrees Celsius, if both were recorded
    pub fn temperatures(&self) -> Option<(f64, f64)> {
        match (self.tmax_tenths_c, self.tmin_tenths_c) {
            (Some(tmax), Some(tmin)) => {
                Some((normalize_temperature(tmax), normalize_temperature(tmin)))
            }
            _ => None,
        }
    }

    /// Usable for classification: a calendar slot with both extremes present
    pub fn is_usable(&self) -> bool {
        self.slot().is_some() && self.temperatures().is_some()
    }
}
