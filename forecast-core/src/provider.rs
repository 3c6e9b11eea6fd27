use crate::{
    Config, Forecast, ForecastRequest, RawForecast, provider::openmeteo::OpenMeteoSource,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

/// Anything that can produce a raw hourly + daily forecast response.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, request: &ForecastRequest) -> anyhow::Result<RawForecast>;
}

/// Thin facade over a source: every `load` fetches and builds a fresh
/// [`Forecast`] that the caller owns.
#[derive(Debug)]
pub struct ForecastService {
    source: Box<dyn ForecastSource>,
    request: ForecastRequest,
}

impl ForecastService {
    pub fn new(source: Box<dyn ForecastSource>, request: ForecastRequest) -> Self {
        Self { source, request }
    }

    pub fn request(&self) -> &ForecastRequest {
        &self.request
    }

    pub async fn load(&self) -> anyhow::Result<Forecast> {
        tracing::info!(
            "Fetching forecast for {:.3},{:.3} ({})",
            self.request.latitude,
            self.request.longitude,
            self.request.timezone
        );

        let raw = self.source.fetch(&self.request).await?;
        let forecast = Forecast::from_raw(raw);

        if forecast.table().is_empty() {
            tracing::warn!("Forecast source returned no usable hourly data");
        }

        Ok(forecast)
    }
}

/// Construct the Open-Meteo source described by `config`.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastSource>> {
    let source = match config.base_url.as_deref() {
        Some(url) => OpenMeteoSource::with_base_url(url)?,
        None => OpenMeteoSource::new()?,
    };

    Ok(Box::new(source))
}

/// Construct a service for the configured location.
pub fn service_from_config(config: &Config) -> anyhow::Result<ForecastService> {
    let source = source_from_config(config)?;
    Ok(ForecastService::new(source, config.forecast_request()))
}
