use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ForecastError;

/// Coordinates and timezone sent to the forecast source.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// Raw Open-Meteo response. `hourly` and `daily` are kept as loose JSON so
/// that a malformed series degrades to an empty table instead of failing
/// the whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawForecast {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub timezone: Option<String>,
    pub utc_offset_seconds: Option<i32>,
    #[serde(default)]
    pub hourly: Value,
    #[serde(default)]
    pub daily: Value,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub hourly_units: Map<String, Value>,
}

/// Units are informational only: anything other than an object (`null`
/// included) is read as no units.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(units) => Ok(units),
        _ => Ok(Map::new()),
    }
}

/// Number of forward days a forecast view covers (1..=7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastDays(u8);

impl ForecastDays {
    pub const MAX: u8 = 7;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ForecastDays {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for ForecastDays {
    type Error = ForecastError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (1..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ForecastError::InvalidDays(value))
        }
    }
}

/// Location block copied verbatim from the raw response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub timezone: Option<String>,
}

impl From<&RawForecast> for Location {
    fn from(raw: &RawForecast) -> Self {
        Self {
            latitude: raw.latitude,
            longitude: raw.longitude,
            elevation: raw.elevation,
            timezone: raw.timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    pub weather_code: i32,
    pub weather_description: String,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub pressure: f64,
    pub cloud_cover: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    pub weather_code: i32,
    pub weather_description: String,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub wind_gusts: f64,
    pub rain: f64,
    pub pressure: f64,
    pub cloud_cover: f64,
    pub cloud_cover_low: f64,
    pub cloud_cover_mid: f64,
    pub cloud_cover_high: f64,
    pub precipitation_probability: f64,
}

/// Sunrise/sunset entry of the daily series. Dates and times are passed
/// through as the source formatted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// min / max / mean of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub weekday: String,
    pub temperature: Spread,
    pub humidity: f64,
    pub wind_speed: f64,
    pub rain: f64,
    pub pressure: f64,
    pub weather_code: i32,
    pub weather_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekForecast {
    pub location: Location,
    pub daily_summaries: Vec<DailySummary>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindStats {
    pub average_speed: f64,
    pub max_gust: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationStats {
    pub total_rain: f64,
    pub rainy_hours: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub temperature: Spread,
    pub humidity: Spread,
    pub wind: WindStats,
    pub precipitation: PrecipitationStats,
    pub pressure: Spread,
    pub data_points: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub summary: OverallStats,
    pub current_conditions: Option<CurrentConditions>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TodayTemperature {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TodayHumidity {
    pub current: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TodayWind {
    pub current_speed: f64,
    pub average_speed: f64,
    pub max_gust: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TodayPrecipitation {
    pub total_rain: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TodayPressure {
    pub current: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    pub average_cover: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayForecast {
    pub date: NaiveDate,
    pub temperature: TodayTemperature,
    pub humidity: TodayHumidity,
    pub wind: TodayWind,
    pub precipitation: TodayPrecipitation,
    pub pressure: TodayPressure,
    pub clouds: Clouds,
    pub hourly_data: Vec<HourlyRecord>,
}

/// Everything one fetch produces for the default forecast view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub location: Location,
    pub current: Option<CurrentConditions>,
    pub hourly: Vec<HourlyRecord>,
    pub daily: Vec<DailyRow>,
    pub units: Map<String, Value>,
    pub generated_at: DateTime<Utc>,
}
