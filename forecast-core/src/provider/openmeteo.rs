use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::model::{ForecastRequest, RawForecast};

use super::ForecastSource;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,\
cloud_cover_low,cloud_cover_mid,cloud_cover_high,wind_speed_10m,wind_gusts_10m,\
wind_direction_10m,rain,showers,snowfall,precipitation,precipitation_probability,\
surface_pressure,cloud_cover,apparent_temperature";

const DAILY_FIELDS: &str = "sunrise,sunset";

#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    base_url: String,
    http: Client,
}

impl OpenMeteoSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoSource {
    async fn fetch(&self, request: &ForecastRequest) -> Result<RawForecast> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", request.latitude.to_string()),
                ("longitude", request.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("timezone", request.timezone.clone()),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Open-Meteo response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: RawForecast =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        tracing::debug!("Received Open-Meteo forecast ({} bytes)", body.len());

        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate_body("{\"error\":true}"), "{\"error\":true}");
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundary() {
        let body = "°".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn hourly_fields_request_every_table_column() {
        let needed = [
            "temperature_2m",
            "apparent_temperature",
            "wind_gusts_10m",
            "surface_pressure",
        ];
        for field in needed {
            assert!(HOURLY_FIELDS.contains(field), "missing {field}");
        }
        assert!(!HOURLY_FIELDS.contains(' '));
    }
}
