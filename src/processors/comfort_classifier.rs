use crate::config::ComfortThresholds;
use crate::models::{DayClassification, DayGrid, DayRecord, MonthSummary, StationMeta, YearSummary};

/// Per-day accumulations for one station across every year on record
pub type StationDays = DayGrid<DayClassification>;

pub struct ComfortClassifier {
    thresholds: ComfortThresholds,
}

impl ComfortClassifier {
    pub fn new(thresholds: ComfortThresholds) -> Self {
        Self { thresholds }
    }

    /// A moderate high is comfortable whatever the low; a hot day only if the night cools off
    pub fn is_comfy_day(&self, tmax: f64, tmin: f64) -> bool {
        let solo = &self.thresholds.tmax_solo;
        if tmax >= solo.min && tmax <= solo.max {
            return true;
        }
        tmax > solo.max && tmin <= self.thresholds.tmin_if_tmax_above_max
    }

    /// Accumulate every usable record into its calendar day.
    ///
    /// Records are visited in chronological order so that sample sequences do not
    /// depend on the order of rows in the file. Leap days and records missing either
    /// extreme are dropped.
    pub fn classify_days(&self, records: &[DayRecord]) -> StationDays {
        let mut ordered: Vec<&DayRecord> = records.iter().filter(|r| r.is_usable()).collect();
        ordered.sort();

        let mut grid = StationDays::default();
        for record in ordered {
            let Some((tmax, tmin)) = record.temperatures() else {
                continue;
            };
            if let Some(day) = grid.get_mut(record.month, record.day) {
                day.record(tmax, tmin, self.is_comfy_day(tmax, tmin));
            }
        }
        grid
    }

    /// Fold classified days into months and the station's year summary
    pub fn summarize(&self, meta: StationMeta, days: &StationDays) -> YearSummary {
        let months = days
            .months()
            .map(|(info, days)| MonthSummary::from_days(info, days))
            .collect();
        YearSummary::new(meta, months)
    }

    /// Mean TMAX per calendar day, `None` where nothing was observed
    pub fn tmax_means(days: &StationDays) -> DayGrid<Option<f64>> {
        days.map(DayClassification::tmax_mean)
    }

    /// Mean TMIN per calendar day, `None` where nothing was observed
    pub fn tmin_means(days: &StationDays) -> DayGrid<Option<f64>> {
        days.map(DayClassification::tmin_mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MONTHS;
    use chrono::NaiveDate;

    fn classifier() -> ComfortClassifier {
        ComfortClassifier::new(ComfortThresholds::new(18.0, 28.0, 18.0))
    }

    fn meta() -> StationMeta {
        StationMeta {
            id: "USC00449215".to_string(),
            name: "WISE 1 SE, VA US".to_string(),
            latitude: Some(36.9725),
            longitude: Some(-82.5579),
            elevation_m: Some(781.5),
            state_code: "VA".to_string(),
            start_date: NaiveDate::from_ymd_opt(1955, 5, 12).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2020, 12, 25).unwrap(),
            has_temperature_data: true,
            has_complete_temperature_year: true,
        }
    }

    fn every_day(year: i32, tmax: i32, tmin: i32) -> Vec<DayRecord> {
        MONTHS
            .iter()
            .flat_map(|info| {
                (1..=info.num_days)
                    .map(move |day| DayRecord::new(year, info.number, day, Some(tmax), Some(tmin)))
            })
            .collect()
    }

    #[test]
    fn test_moderate_highs_are_always_comfy() {
        let c = classifier();
        for tmax in [18.0, 20.5, 25.0, 28.0] {
            for tmin in [-40.0, 0.0, 18.0, 27.9, 40.0] {
                assert!(c.is_comfy_day(tmax, tmin), "tmax={tmax} tmin={tmin}");
            }
        }
    }

    #[test]
    fn test_hot_days_need_cool_nights() {
        let c = classifier();
        assert!(c.is_comfy_day(28.1, 18.0));
        assert!(c.is_comfy_day(35.0, 12.0));
        assert!(!c.is_comfy_day(28.1, 18.1));
        assert!(!c.is_comfy_day(40.0, 25.0));
    }

    #[test]
    fn test_cold_highs_are_never_comfy() {
        let c = classifier();
        for tmax in [-30.0, 0.0, 10.0, 17.9] {
            for tmin in [-40.0, 0.0, 17.0, 30.0] {
                assert!(!c.is_comfy_day(tmax, tmin), "tmax={tmax} tmin={tmin}");
            }
        }
    }

    #[test]
    fn test_uniformly_pleasant_year() {
        let c = classifier();
        let days = c.classify_days(&every_day(2001, 250, 100));
        let year = c.summarize(meta(), &days);

        assert_eq!(year.total_comfy_days, 365);
        assert_eq!(year.average_comfy_days, 365.0);
        assert!(year.is_consistent());
        assert_eq!(year.day(8, 1).map(|d| d.tmax_mean), Some(25.0));
        assert_eq!(year.day(8, 1).map(|d| d.tmin_mean), Some(10.0));
    }

    #[test]
    fn test_multiple_readings_are_averaged() {
        let c = classifier();
        let records = vec![
            DayRecord::new(2001, 7, 4, Some(250), Some(150)),
            DayRecord::new(2002, 7, 4, Some(350), Some(250)),
            DayRecord::new(2003, 7, 4, Some(300), Some(160)),
            DayRecord::new(2003, 7, 4, Some(300), Some(160)),
        ];
        let days = c.classify_days(&records);
        let july_4 = days.get(7, 4).unwrap();

        assert_eq!(july_4.comfy_count, 3);
        assert_eq!(july_4.uncomfy_count, 1);
        assert_eq!(july_4.tmax_mean(), Some(30.0));
        assert_eq!(july_4.tmin_mean(), Some(18.0));
    }

    #[test]
    fn test_leap_days_and_partial_records_are_dropped() {
        let c = classifier();
        let records = vec![
            DayRecord::new(2004, 2, 29, Some(250), Some(100)),
            DayRecord::new(2004, 2, 28, Some(250), None),
            DayRecord::new(2004, 3, 1, None, Some(100)),
        ];
        let days = c.classify_days(&records);

        assert!(days.get(2, 28).unwrap().is_empty());
        assert!(days.get(3, 1).unwrap().is_empty());
        let year = c.summarize(meta(), &days);
        assert_eq!(year.total_comfy_days, 0);
        assert_eq!(year.average_comfy_days, 0.0);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let c = classifier();
        let mut records = every_day(1990, 305, 190);
        records.extend(every_day(1991, 221, 80));
        records.extend(every_day(1992, 150, -20));

        let forward = c.classify_days(&records);
        records.reverse();
        let backward = c.classify_days(&records);
        records.rotate_left(500);
        let rotated = c.classify_days(&records);

        assert_eq!(forward, backward);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_mixed_year_month_statistics() {
        let c = classifier();
        let mut records = every_day(1990, 250, 100);
        records.extend(every_day(1991, 100, 0));
        records.extend(every_day(1992, 100, 0));

        let year = c.summarize(meta(), &c.classify_days(&records));
        let jan = year.month(1).unwrap();

        // one comfy reading out of three on every day
        assert_eq!(jan.total_comfy_days, 0);
        assert_eq!(jan.average_comfy_days, 10.33);
        assert_eq!(year.total_comfy_days, 0);
        assert!(year.is_consistent());
    }

    #[test]
    fn test_mean_grids() {
        let c = classifier();
        let days = c.classify_days(&[DayRecord::new(2001, 1, 2, Some(123), Some(-45))]);

        let tmax = ComfortClassifier::tmax_means(&days);
        let tmin = ComfortClassifier::tmin_means(&days);
        assert_eq!(tmax.get(1, 2), Some(&Some(12.3)));
        assert_eq!(tmin.get(1, 2), Some(&Some(-4.5)));
        assert_eq!(tmax.get(1, 1), Some(&None));
    }
}
