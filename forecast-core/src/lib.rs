//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - The hourly time-series table built from an Open-Meteo response
//! - Reducers deriving current conditions, hourly/daily views and summaries
//! - The forecast source abstraction and its Open-Meteo implementation
//! - Configuration handling
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod daily;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
mod stats;
pub mod table;
pub mod weather_code;

pub use config::{Config, Coordinates, LocationConfig};
pub use error::ForecastError;
pub use forecast::Forecast;
pub use model::{
    CurrentConditions, DailyRow, DailySummary, ForecastDays, ForecastReport, ForecastRequest,
    ForecastSummary, HourlyRecord, Location, RawForecast, TodayForecast, WeekForecast,
};
pub use provider::{ForecastService, ForecastSource};
pub use table::{ForecastTable, HourlyRow};
