/// User agent string for HTTP requests
pub const USER_AGENT: &str = "clothing-weather/0.1.0";

/// Open-Meteo forecast API base URL
pub const OPEN_METEO_API_BASE: &str = "https://api.open-meteo.com/v1";

/// Open-Meteo geocoding API base URL
pub const GEOCODING_API_BASE: &str = "https://geocoding-api.open-meteo.com/v1";

/// Hourly series requested from the forecast endpoint
pub const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation_probability,precipitation,weather_code,cloud_cover_low,visibility,et0_fao_evapotranspiration,wind_speed_10m,wind_direction_10m,wind_gusts_10m";

/// Daily series requested from the forecast endpoint
pub const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,sunrise,sunset,daylight_duration,sunshine_duration,uv_index_max,shortwave_radiation_sum";

/// Number of geocoding candidates requested per lookup
pub const GEOCODING_RESULT_COUNT: u32 = 2;

/// Location used when the prompt is left blank
pub const DEFAULT_LOCATION: &str = "Toronto, Canada";

/// Furthest back the forecast API serves hourly history
pub const MAX_PAST_DAYS: u32 = 92;

/// Default SQLite file for the log
pub const DEFAULT_DATABASE: &str = "clothing_data.db";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Features left out of training unless asked for
pub const DEFAULT_EXCLUDED_FEATURES: &[&str] = &["sunrise", "sunset"];
