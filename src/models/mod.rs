pub mod calendar;
pub mod day;
pub mod station;
pub mod summary;

pub use calendar::{day_of_year_slot, month_info, DayGrid, MonthInfo, MONTHS};
pub use day::{normalize_temperature, DayRecord};
pub use station::{state_from_station_name, StationMeta};
pub use summary::{DayClassification, DaySummary, MonthSummary, YearSummary};
