use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationMeta {
    #[validate(length(min = 1))]
    pub id: String,

    pub name: String,

    /// `None` when the station file leaves the cell blank or malformed
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub elevation_m: Option<f64>,

    #[validate(length(equal = 2))]
    pub state_code: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub has_temperature_data: bool,
    pub has_complete_temperature_year: bool,
}

impl StationMeta {
    /// Eligible for month and year aggregation
    pub fn is_eligible(&self) -> bool {
        self.has_temperature_data && self.has_complete_temperature_year
    }
}

/// Extract the US state code from a GHCN station name such as `TRINCHERA, CO US`
///
/// Returns `None` for any station outside the fifty states.
pub fn state_from_station_name(name: &str) -> Option<String> {
    let name = name.trim_end();
    let country = name.get(name.len().checked_sub(2)?..)?;
    if country != "US" {
        return None;
    }

    let state = name.get(name.len().checked_sub(5)?..name.len() - 3)?;
    if crate::utils::constants::is_us_state(state) {
        Some(state.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trinchera() -> StationMeta {
        StationMeta {
            id: "USS0005M08S".to_string(),
            name: "TRINCHERA, CO US".to_string(),
            latitude: Some(37.35),
            longitude: Some(-105.23),
            elevation_m: Some(3310.1),
            state_code: "CO".to_string(),
            start_date: NaiveDate::from_ymd_opt(1989, 9, 19).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2020, 12, 29).unwrap(),
            has_temperature_data: true,
            has_complete_temperature_year: true,
        }
    }

    #[test]
    fn test_station_validation() {
        let station = trinchera();
        assert!(station.validate().is_ok());
        assert!(station.is_eligible());
    }

    #[test]
    fn test_invalid_coordinates() {
        let mut station = trinchera();
        station.latitude = Some(91.0);
        assert!(station.validate().is_err());
    }

    #[test]
    fn test_state_from_station_name() {
        assert_eq!(state_from_station_name("TRINCHERA, CO US"), Some("CO".to_string()));
        assert_eq!(
            state_from_station_name("NEW HAVEN TWEED AIRPORT, CT US"),
            Some("CT".to_string())
        );
        assert_eq!(state_from_station_name("HARARE KUTSAGA, ZI"), None);
        assert_eq!(state_from_station_name("SAN JUAN, PR US"), None);
        assert_eq!(state_from_station_name("US"), None);
        assert_eq!(state_from_station_name(""), None);
    }
}
