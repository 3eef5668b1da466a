/// Spool stage directory names
pub const STAGE_META: &str = "meta";
pub const STAGE_TMAX: &str = "tmax";
pub const STAGE_TMIN: &str = "tmin";
pub const STAGE_YEAR: &str = "year";
pub const STAGE_COMFY: &str = "comfy";

/// Station file column names
pub const COL_STATION: &str = "STATION";
pub const COL_DATE: &str = "DATE";
pub const COL_LATITUDE: &str = "LATITUDE";
pub const COL_LONGITUDE: &str = "LONGITUDE";
pub const COL_ELEVATION: &str = "ELEVATION";
pub const COL_NAME: &str = "NAME";
pub const COL_TMAX: &str = "TMAX";
pub const COL_TMIN: &str = "TMIN";

/// Calendar days considered per year (Feb 29 never counts)
pub const DAYS_PER_YEAR: usize = 365;

/// Comfort threshold defaults, degrees Celsius
pub const DEFAULT_TMAX_SOLO_MIN: f64 = 18.0;
pub const DEFAULT_TMAX_SOLO_MAX: f64 = 28.0;
pub const DEFAULT_TMIN_IF_TMAX_ABOVE_MAX: f64 = 18.0;

/// Processing defaults
pub const DEFAULT_FILE_GLOB: &str = "*.csv";
pub const DEFAULT_SHARD_PATTERN: &str = "*";
pub const DEFAULT_JSON_WIDTH: usize = 80;
pub const DEFAULT_JSON_INDENT: usize = 2;
pub const DEFAULT_SUMMARY_FILENAME: &str = "summary.csv";
pub const DEFAULT_SAMPLE_MONTH: u32 = 8;
pub const DEFAULT_SAMPLE_DAY: u32 = 1;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const ENV_PREFIX: &str = "COMFY";

/// Two-letter US state codes recognised in GHCN station names
pub const US_STATES: [(&str, &str); 50] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

pub fn is_us_state(code: &str) -> bool {
    US_STATES.iter().any(|(abbr, _)| *abbr == code)
}
