use crate::error::{ProcessingError, Result};
use crate::models::{state_from_station_name, DayRecord, StationMeta};
use crate::utils::constants::*;
use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use std::path::Path;
use tracing::debug;

/// Column positions within one station file
#[derive(Debug, Clone, Copy)]
struct Columns {
    station: usize,
    date: usize,
    latitude: usize,
    longitude: usize,
    elevation: usize,
    name: usize,
    tmax: Option<usize>,
    tmin: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |column: &str| headers.iter().position(|h| h == column);
        let require = |column: &str| {
            find(column).ok_or_else(|| {
                ProcessingError::InvalidFormat(format!("Missing required column: '{}'", column))
            })
        };

        Ok(Self {
            station: require(COL_STATION)?,
            date: require(COL_DATE)?,
            latitude: require(COL_LATITUDE)?,
            longitude: require(COL_LONGITUDE)?,
            elevation: require(COL_ELEVATION)?,
            name: require(COL_NAME)?,
            tmax: find(COL_TMAX),
            tmin: find(COL_TMIN),
        })
    }

    fn temperatures(&self) -> Option<(usize, usize)> {
        self.tmax.zip(self.tmin)
    }
}

/// Station attributes taken from the first and last data rows
#[derive(Debug, Clone, PartialEq)]
pub struct StationHeader {
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation_m: Option<f64>,
    pub state_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A parsed US station file
#[derive(Debug, Clone)]
pub struct StationFile {
    pub header: StationHeader,
    /// Day rows in file order; `None` when the file carries no TMAX/TMIN columns
    pub days: Option<Vec<DayRecord>>,
    /// Rows dropped because they could not be read or dated
    pub skipped_rows: usize,
}

impl StationFile {
    pub fn has_temperature_data(&self) -> bool {
        self.days.is_some()
    }

    pub fn days(&self) -> &[DayRecord] {
        self.days.as_deref().unwrap_or(&[])
    }

    pub fn to_meta(&self, has_complete_temperature_year: bool) -> StationMeta {
        StationMeta {
            id: self.header.id.clone(),
            name: self.header.name.clone(),
            latitude: self.header.latitude,
            longitude: self.header.longitude,
            elevation_m: self.header.elevation_m,
            state_code: self.header.state_code.clone(),
            start_date: self.header.start_date,
            end_date: self.header.end_date,
            has_temperature_data: self.has_temperature_data(),
            has_complete_temperature_year: self.has_temperature_data()
                && has_complete_temperature_year,
        }
    }
}

pub struct StationReader {
    date_format: &'static str,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            date_format: "%Y-%m-%d",
        }
    }

    /// Read a GHCN daily station CSV.
    ///
    /// Returns `Ok(None)` for stations outside the fifty US states. A file without
    /// TMAX/TMIN columns is still returned, with `days == None`.
    pub fn read_station(&self, path: &Path) -> Result<Option<StationFile>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let columns = Columns::locate(reader.headers()?)?;
        let mut rows = reader.records();

        let first = rows.next().transpose()?.ok_or_else(|| {
            ProcessingError::MissingData(format!("No data rows in {}", path.display()))
        })?;

        let name = field(&first, columns.name).to_string();
        let Some(state_code) = state_from_station_name(&name) else {
            debug!("Skipping non-US station '{}' in {}", name, path.display());
            return Ok(None);
        };

        let id = field(&first, columns.station).to_string();
        let latitude = parse_number(&first, columns.latitude, COL_LATITUDE, path);
        let longitude = parse_number(&first, columns.longitude, COL_LONGITUDE, path);
        let elevation_m = parse_number(&first, columns.elevation, COL_ELEVATION, path);

        let temperature_columns = columns.temperatures();
        let mut days = temperature_columns.map(|_| Vec::new());
        let mut start_date = None;
        let mut end_date = None;
        let mut skipped_rows = 0;

        for row in std::iter::once(Ok(first)).chain(rows) {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    debug!("Skipping unreadable row in {}: {}", path.display(), e);
                    skipped_rows += 1;
                    continue;
                }
            };

            let Ok(date) = NaiveDate::parse_from_str(field(&row, columns.date), self.date_format)
            else {
                skipped_rows += 1;
                continue;
            };
            start_date.get_or_insert(date);
            end_date = Some(date);

            if let (Some(days), Some((tmax, tmin))) = (days.as_mut(), temperature_columns) {
                days.push(DayRecord::new(
                    date.year(),
                    date.month(),
                    date.day(),
                    parse_tenths(&row, tmax),
                    parse_tenths(&row, tmin),
                ));
            }
        }

        let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
            return Err(ProcessingError::MissingData(format!(
                "No dated rows in {}",
                path.display()
            )));
        };

        Ok(Some(StationFile {
            header: StationHeader {
                id,
                name,
                latitude,
                longitude,
                elevation_m,
                state_code,
                start_date,
                end_date,
            },
            days,
            skipped_rows,
        }))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

fn field(row: &StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}

/// A station attribute cell; blank or malformed cells are `None`
fn parse_number(row: &StringRecord, index: usize, column: &str, path: &Path) -> Option<f64> {
    let raw = field(row, index);
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite());
    if value.is_none() {
        debug!("Blank or invalid {} '{}' in {}", column, raw, path.display());
    }
    value
}

/// A temperature cell in tenths of a degree; blank or malformed cells are `None`
fn parse_tenths(row: &StringRecord, index: usize) -> Option<i32> {
    field(row, index).parse::<i32>().ok()
}
