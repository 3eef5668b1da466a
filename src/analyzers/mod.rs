pub mod comfort_report;

pub use comfort_report::{ComfortReport, Histogram};
