use serde::{Deserialize, Serialize};

use crate::error::FetchError;

// ============================================================================
// Open-Meteo Geocoding Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    /// Omitted by the API when nothing matches
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

/// A resolved place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&GeocodingResult> for Coordinates {
    fn from(result: &GeocodingResult) -> Self {
        Self {
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}

// ============================================================================
// Open-Meteo Forecast Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: String,
    pub hourly: HourlyData,
    pub daily: DailyData,
}

#[derive(Debug, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Vec<Option<f64>>,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: Vec<Option<f64>>,
    pub apparent_temperature: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub cloud_cover_low: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
    #[serde(rename = "et0_fao_evapotranspiration")]
    pub et0: Vec<Option<f64>>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Vec<Option<f64>>,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: Vec<Option<f64>>,
    #[serde(rename = "wind_gusts_10m")]
    pub wind_gusts: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub daylight_duration: Vec<Option<f64>>,
    pub sunshine_duration: Vec<Option<f64>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub shortwave_radiation_sum: Vec<Option<f64>>,
}

fn value_at<T: Clone>(series: &[Option<T>], field: &'static str, index: usize) -> Result<T, FetchError> {
    series
        .get(index)
        .cloned()
        .flatten()
        .ok_or(FetchError::MissingValue { field, index })
}

/// Keeps the clock part of an ISO local datetime ("2024-06-20T05:36" -> "05:36")
fn time_of_day(value: &str) -> Result<String, FetchError> {
    value
        .split_once('T')
        .map(|(_, time)| time.to_string())
        .ok_or_else(|| FetchError::TimeFormat(value.to_string()))
}

impl ForecastResponse {
    /// Builds the reading for `hour` of the first returned day.
    ///
    /// With `past_days = n` and `forecast_days = 1` the first day in the
    /// response is the one `n` days ago, so hourly index `hour` and daily
    /// index 0 both refer to the requested date.
    pub fn reading_at(&self, hour: usize) -> Result<WeatherReading, FetchError> {
        let h = &self.hourly;
        let d = &self.daily;
        let sunrise = value_at(&d.sunrise, "sunrise", 0)?;
        let sunset = value_at(&d.sunset, "sunset", 0)?;

        Ok(WeatherReading {
            temperature: value_at(&h.temperature, "temperature_2m", hour)?,
            humidity: value_at(&h.humidity, "relative_humidity_2m", hour)?,
            apparent_temperature: value_at(&h.apparent_temperature, "apparent_temperature", hour)?,
            precipitation_probability: value_at(
                &h.precipitation_probability,
                "precipitation_probability",
                hour,
            )?,
            precipitation: value_at(&h.precipitation, "precipitation", hour)?,
            weather_code: value_at(&h.weather_code, "weather_code", hour)?,
            cloud_cover_low: value_at(&h.cloud_cover_low, "cloud_cover_low", hour)?,
            visibility: value_at(&h.visibility, "visibility", hour)?,
            et0: value_at(&h.et0, "et0_fao_evapotranspiration", hour)?,
            wind_speed: value_at(&h.wind_speed, "wind_speed_10m", hour)?,
            wind_direction: value_at(&h.wind_direction, "wind_direction_10m", hour)?,
            wind_gusts: value_at(&h.wind_gusts, "wind_gusts_10m", hour)?,
            daily_max: value_at(&d.temperature_max, "temperature_2m_max", 0)?,
            daily_min: value_at(&d.temperature_min, "temperature_2m_min", 0)?,
            sunrise: time_of_day(&sunrise)?,
            sunset: time_of_day(&sunset)?,
            daylight_duration: value_at(&d.daylight_duration, "daylight_duration", 0)?,
            sunshine_duration: value_at(&d.sunshine_duration, "sunshine_duration", 0)?,
            uv_index_max: value_at(&d.uv_index_max, "uv_index_max", 0)?,
            shortwave_radiation_sum: value_at(
                &d.shortwave_radiation_sum,
                "shortwave_radiation_sum",
                0,
            )?,
        })
    }
}

// ============================================================================
// Stored Weather Reading
// ============================================================================

/// Weather for one hour plus that day's aggregates.
///
/// Field names are the keys of the `WeatherData` blob and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature: f64,
    pub humidity: f64,
    pub apparent_temperature: f64,
    pub precipitation_probability: f64,
    pub precipitation: f64,
    pub weather_code: i32,
    pub cloud_cover_low: f64,
    pub visibility: f64,
    pub et0: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub wind_gusts: f64,
    pub daily_max: f64,
    pub daily_min: f64,
    /// Local sunrise as "HH:MM"
    pub sunrise: String,
    /// Local sunset as "HH:MM"
    pub sunset: String,
    pub daylight_duration: f64,
    pub sunshine_duration: f64,
    pub uv_index_max: f64,
    pub shortwave_radiation_sum: f64,
}

impl WeatherReading {
    /// Blob keys in declaration order
    pub const FIELDS: [&'static str; 20] = [
        "temperature",
        "humidity",
        "apparent_temperature",
        "precipitation_probability",
        "precipitation",
        "weather_code",
        "cloud_cover_low",
        "visibility",
        "et0",
        "wind_speed",
        "wind_direction",
        "wind_gusts",
        "daily_max",
        "daily_min",
        "sunrise",
        "sunset",
        "daylight_duration",
        "sunshine_duration",
        "uv_index_max",
        "shortwave_radiation_sum",
    ];
}
