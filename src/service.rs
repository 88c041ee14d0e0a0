use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::constants::{DAILY_FIELDS, GEOCODING_RESULT_COUNT, HOURLY_FIELDS};
use crate::error::FetchError;
use crate::models::{Coordinates, ForecastResponse, GeocodingResponse, WeatherReading};

/// Client for the Open-Meteo geocoding and forecast APIs
#[derive(Clone)]
pub struct WeatherService {
    client: Client,
    forecast_base: String,
    geocoding_base: String,
}

impl WeatherService {
    /// Creates a new service instance from configuration
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| FetchError::Request {
                url: config.forecast_base.clone(),
                source,
            })?;

        Ok(Self {
            client,
            forecast_base: config.forecast_base.trim_end_matches('/').to_string(),
            geocoding_base: config.geocoding_base.trim_end_matches('/').to_string(),
        })
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let wrap = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).query(query).send().await.map_err(wrap)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        response.json::<T>().await.map_err(wrap)
    }

    /// Resolves a place name to the coordinates of its best match
    pub async fn geocode(&self, location: &str) -> Result<Coordinates, FetchError> {
        tracing::info!("Geocoding location: {}", location);

        let url = format!("{}/search", self.geocoding_base);
        let response = self
            .make_request::<GeocodingResponse>(
                &url,
                &[
                    ("name", location.to_string()),
                    ("count", GEOCODING_RESULT_COUNT.to_string()),
                    ("language", "en".to_string()),
                ],
            )
            .await?;

        let best = response.results.first().ok_or_else(|| FetchError::NotFound {
            location: location.to_string(),
        })?;

        tracing::debug!(
            "Resolved {} to {} ({:?}) at {:.4}, {:.4}",
            location,
            best.name,
            best.country,
            best.latitude,
            best.longitude
        );
        Ok(Coordinates::from(best))
    }

    /// Fetches the reading for `hour` on the day `past_days` before today
    pub async fn fetch_reading(
        &self,
        coordinates: Coordinates,
        hour: u8,
        past_days: u32,
    ) -> Result<WeatherReading, FetchError> {
        tracing::info!(
            "Fetching weather for coordinates: {}, {} (hour {}, {} days back)",
            coordinates.latitude,
            coordinates.longitude,
            hour,
            past_days
        );

        let url = format!("{}/forecast", self.forecast_base);
        let forecast = self
            .make_request::<ForecastResponse>(
                &url,
                &[
                    ("latitude", coordinates.latitude.to_string()),
                    ("longitude", coordinates.longitude.to_string()),
                    ("hourly", HOURLY_FIELDS.to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                    ("past_days", past_days.to_string()),
                    ("forecast_days", "1".to_string()),
                ],
            )
            .await?;

        tracing::debug!("Forecast timezone: {}", forecast.timezone);
        forecast.reading_at(usize::from(hour))
    }
}
