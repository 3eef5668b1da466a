use crate::models::DayRecord;
use crate::utils::constants::DAYS_PER_YEAR;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletenessReport {
    /// Distinct calendar slots seen with both TMAX and TMIN, never above 365
    pub days_found: usize,
    /// Records scanned before the verdict was reached
    pub records_checked: usize,
    pub complete: bool,
}

/// Decides whether a station covers every day of the 365-day calendar.
///
/// Coverage may be spread across any number of years; only distinct
/// (month, day) slots with both extremes present count. Leap days never count.
pub struct CompletenessChecker {
    required_days: usize,
}

impl CompletenessChecker {
    pub fn new() -> Self {
        Self {
            required_days: DAYS_PER_YEAR,
        }
    }

    /// Scan in file order, stopping as soon as the calendar is covered
    pub fn check(&self, days: &[DayRecord]) -> CompletenessReport {
        let mut seen = [false; DAYS_PER_YEAR];
        let mut days_found = 0;

        for (index, record) in days.iter().enumerate() {
            if record.temperatures().is_none() {
                continue;
            }
            let Some(slot) = record.slot() else {
                continue;
            };
            if !seen[slot] {
                seen[slot] = true;
                days_found += 1;
            }
            if days_found >= self.required_days {
                debug!("Found {} days after searching {} records", days_found, index + 1);
                return CompletenessReport {
                    days_found,
                    records_checked: index + 1,
                    complete: true,
                };
            }
        }

        debug!("Found only {} days", days_found);
        CompletenessReport {
            days_found,
            records_checked: days.len(),
            complete: false,
        }
    }

    pub fn has_complete_year(&self, days: &[DayRecord]) -> bool {
        self.check(days).complete
    }
}

impl Default for CompletenessChecker {
    fn default() -> Self {
        Self::new()
    }
}
