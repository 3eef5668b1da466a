use crate::error::{ProcessingError, Result};
use crate::models::MONTHS;
use crate::spool::{SpoolCache, Stage};
use chrono::NaiveDate;

/// One station in the cross-station summary table
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub id: String,
    pub state: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub elev_m: Option<f64>,
    pub total_comfy_days: u32,
    pub average_comfy_days: f64,
    pub sample_tmin: Option<f64>,
    pub sample_tmax: Option<f64>,
    /// Percent comfy for January through December
    pub month_percent_comfy: [f64; 12],
    pub name: String,
}

/// Writes the summary table as CSV
pub struct SummaryWriter {
    sample_label: String,
}

impl SummaryWriter {
    pub fn new(sample_label: &str) -> Self {
        Self {
            sample_label: sample_label.to_string(),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = [
            "id",
            "state",
            "start_date",
            "end_date",
            "lat",
            "lon",
            "elev_m",
            "total_comfy_days",
            "average_comfy_days",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        headers.push(format!("{}_tmin", self.sample_label));
        headers.push(format!("{}_tmax", self.sample_label));
        headers.extend(MONTHS.iter().map(|m| format!("{}_percent_comfy", m.name)));
        headers.push("name".to_string());
        headers
    }

    pub fn to_bytes(&self, rows: &[SummaryRow]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.headers())?;

        for row in rows {
            let mut record = vec![
                row.id.clone(),
                row.state.clone(),
                row.start_date.to_string(),
                row.end_date.to_string(),
                optional(row.lat),
                optional(row.lon),
                optional(row.elev_m),
                row.total_comfy_days.to_string(),
                row.average_comfy_days.to_string(),
                optional(row.sample_tmin),
                optional(row.sample_tmax),
            ];
            record.extend(row.month_percent_comfy.iter().map(|p| p.to_string()));
            record.push(row.name.clone());
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|e| ProcessingError::Io(e.into_error()))
    }

    /// Store the table in the comfy stage, atomically
    pub fn write_to_spool(&self, spool: &SpoolCache, filename: &str, rows: &[SummaryRow]) -> Result<()> {
        let bytes = self.to_bytes(rows)?;
        spool.write_bytes(Stage::Comfy, filename, &bytes)
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> SummaryRow {
        SummaryRow {
            id: "USC00449215".to_string(),
            state: "VA".to_string(),
            start_date: NaiveDate::from_ymd_opt(1955, 5, 12).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2020, 12, 25).unwrap(),
            lat: Some(36.9725),
            lon: Some(-82.5579),
            elev_m: None,
            total_comfy_days: 112,
            average_comfy_days: 120.5,
            sample_tmin: Some(15.12),
            sample_tmax: None,
            month_percent_comfy: [0.0, 0.0, 3.2, 20.0, 61.29, 80.0, 70.97, 74.19, 73.33, 38.71, 1.5, 0.0],
            name: "WISE 1 SE, VA US".to_string(),
        }
    }

    #[test]
    fn test_headers_follow_sample_label() {
        let headers = SummaryWriter::new("aug_1").headers();
        assert_eq!(headers.len(), 24);
        assert_eq!(headers[9], "aug_1_tmin");
        assert_eq!(headers[10], "aug_1_tmax");
        assert_eq!(headers[11], "jan_percent_comfy");
        assert_eq!(headers[22], "dec_percent_comfy");
        assert_eq!(headers[23], "name");
    }

    #[test]
    fn test_rows_are_quoted_where_needed() {
        let bytes = SummaryWriter::new("aug_1").to_bytes(&[row()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("USC00449215,VA,1955-05-12,2020-12-25,36.9725,-82.5579,,112,120.5,15.12,,"));
        assert!(lines[1].ends_with(",\"WISE 1 SE, VA US\""));
    }
}
