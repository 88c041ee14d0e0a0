use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StoreError;
use crate::models::WeatherReading;
use crate::vocab::{ActivitySelection, ClothingSelection, SportsSuitability};

/// Date format of the `Date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Hour of day, 0 to 23
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hour(u8);

impl Hour {
    /// Returns `None` outside 0-23
    #[must_use]
    pub fn new(hour: u8) -> Option<Self> {
        (hour <= 23).then_some(Self(hour))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Hour {
    type Error = StoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(StoreError::InvalidHour(value))
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observation: weather plus what was worn and done
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub date: NaiveDate,
    pub time: Hour,
    pub location: String,
    pub weather: WeatherReading,
    pub clothing: ClothingSelection,
    pub sports: SportsSuitability,
    pub activity: ActivitySelection,
    pub other: Option<String>,
}

/// A row exactly as it sits in the table or the exported CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: i64,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "WeatherData")]
    pub weather_data: String,
    #[serde(rename = "ClothingData")]
    pub clothing_data: String,
    #[serde(rename = "SportsData")]
    pub sports_data: String,
    #[serde(rename = "OtherData")]
    pub other_data: Option<String>,
    #[serde(rename = "ActivityData")]
    pub activity_data: String,
}

fn encode<T: Serialize>(column: &'static str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode { column, source })
}

fn decode<T: for<'de> Deserialize<'de>>(column: &'static str, text: &str) -> Result<T, StoreError> {
    serde_json::from_str(text).map_err(|source| StoreError::Decode { column, source })
}

impl RawRow {
    /// Serializes each sub-record to its own JSON blob
    pub fn encode(row: &LogRow) -> Result<Self, StoreError> {
        Ok(Self {
            date: row.date.format(DATE_FORMAT).to_string(),
            time: i64::from(row.time.get()),
            location: row.location.clone(),
            weather_data: encode("WeatherData", &row.weather)?,
            clothing_data: encode("ClothingData", &row.clothing)?,
            sports_data: encode("SportsData", &row.sports)?,
            other_data: row.other.clone(),
            activity_data: encode("ActivityData", &row.activity)?,
        })
    }

    /// Parses the blobs back into typed records
    pub fn decode(&self) -> Result<LogRow, StoreError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| StoreError::InvalidDate(self.date.clone()))?;

        Ok(LogRow {
            date,
            time: Hour::try_from(self.time)?,
            location: self.location.clone(),
            weather: decode("WeatherData", &self.weather_data)?,
            clothing: decode("ClothingData", &self.clothing_data)?,
            sports: decode("SportsData", &self.sports_data)?,
            other: self.other_data.clone(),
            activity: decode("ActivityData", &self.activity_data)?,
        })
    }
}
