use thiserror::Error;

/// Failure talking to the weather source
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("no results found for location '{location}'")]
    NotFound { location: String },

    #[error("forecast response has no value for {field} at index {index}")]
    MissingValue { field: &'static str, index: usize },

    #[error("unexpected time format '{0}' in forecast response")]
    TimeFormat(String),
}

impl FetchError {
    /// True when geocoding found nothing for the requested place
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Malformed interactive input; the prompt loop reports it and asks again
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid input. Hour (and day if provided) must be integer.")]
    NotAnInteger,

    #[error("Invalid hour. Must be between 0 and 23.")]
    HourOutOfRange(i64),

    #[error("Invalid day. Must be between 0 and {max} past days.")]
    DayOutOfRange { day: i64, max: u32 },

    #[error("Too many values. Enter the hour and optionally the number of days prior.")]
    TooManyValues,

    #[error("Invalid option '{0}'. Provide a valid index (1-indexed).")]
    InvalidIndex(String),

    #[error("Invalid option '{0}'. Choose from the provided options.")]
    UnknownOption(String),

    #[error("Invalid input. Must be 'y' or 'n'.")]
    InvalidAnswer(String),
}

/// Failure reading or writing the persisted log
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode {column}: {source}")]
    Encode {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {column}: {source}")]
    Decode {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored hour {0} is outside 0-23")]
    InvalidHour(i64),

    #[error("stored date '{0}' is not a calendar date")]
    InvalidDate(String),

    #[error("the log is empty, nothing to delete")]
    Empty,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure preparing data for or fitting the classifier
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("need at least {needed} rows to split into train and test sets, found {found}")]
    NotEnoughRows { needed: usize, found: usize },

    #[error("every target column is constant, nothing to learn")]
    NoTargets,

    #[error("no feature columns left after exclusions")]
    NoFeatures,

    #[error("invalid time of day '{value}' in column {column}")]
    TimeOfDay { column: &'static str, value: String },

    #[error("test ratio {0} must be strictly between 0 and 1")]
    InvalidTestRatio(f64),
}
