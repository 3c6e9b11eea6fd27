//! Reducers over a [`ForecastTable`].
//!
//! Every function here is a pure read of an already built table. "Today" is
//! always passed in explicitly as `now`; callers pin it to the moment the
//! table was fetched (see [`crate::Forecast`]).

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::{
    error::ForecastError,
    model::{
        Clouds, CurrentConditions, DailySummary, DateRange, HourlyRecord, OverallStats,
        PrecipitationStats, Spread, TodayForecast, TodayHumidity, TodayPrecipitation,
        TodayPressure, TodayTemperature, TodayWind, WindStats,
    },
    stats,
    table::{ForecastTable, HourlyRow, STANDARD_PRESSURE},
    weather_code,
};

/// Number of summaries the week view always produces.
pub const WEEK_DAYS: i64 = 7;

const NO_DATA: &str = "No data";

/// Row closest to the current hour on the current date, or the first row
/// when the table does not cover today. `None` only for an empty table.
pub fn current_conditions(table: &ForecastTable, now: NaiveDateTime) -> Option<CurrentConditions> {
    let hour = i64::from(now.hour());

    let row = table
        .on_date(now.date())
        .min_by_key(|r| (i64::from(r.hour) - hour).abs())
        .or_else(|| table.first())?;

    Some(CurrentConditions {
        time: row.time,
        temperature: row.temperature,
        apparent_temperature: row.apparent_temperature,
        humidity: row.humidity,
        weather_code: row.weather_code,
        weather_description: row.weather_description.to_string(),
        wind_speed: row.wind_speed,
        wind_direction: row.wind_direction,
        pressure: row.pressure,
        cloud_cover: row.cloud_cover,
    })
}

/// Every row dated on or before `now.date() + days`, in table order.
///
/// The horizon bounds calendar dates, not the number of rows.
pub fn hourly_projection(
    table: &ForecastTable,
    now: NaiveDateTime,
    days: u32,
) -> Vec<HourlyRecord> {
    let cutoff = now.date() + Duration::days(i64::from(days));

    table
        .rows()
        .iter()
        .filter(|r| r.date <= cutoff)
        .map(hourly_record)
        .collect()
}

fn hourly_record(row: &HourlyRow) -> HourlyRecord {
    HourlyRecord {
        time: row.time,
        temperature: row.temperature,
        apparent_temperature: row.apparent_temperature,
        humidity: row.humidity,
        weather_code: row.weather_code,
        weather_description: row.weather_description.to_string(),
        wind_speed: row.wind_speed,
        wind_direction: row.wind_direction,
        wind_gusts: row.wind_gusts,
        rain: row.rain,
        pressure: row.pressure,
        cloud_cover: row.cloud_cover,
        cloud_cover_low: row.cloud_cover_low,
        cloud_cover_mid: row.cloud_cover_mid,
        cloud_cover_high: row.cloud_cover_high,
        precipitation_probability: row.precipitation_probability,
    }
}

/// One summary for each of the seven days starting at `now.date()`.
pub fn week_summaries(table: &ForecastTable, now: NaiveDateTime) -> Vec<DailySummary> {
    (0..WEEK_DAYS)
        .map(|offset| daily_summary(table, now.date() + Duration::days(offset)))
        .collect()
}

/// Statistics for a single date, or a placeholder when the table has no
/// rows for it.
pub fn daily_summary(table: &ForecastTable, date: NaiveDate) -> DailySummary {
    let rows: Vec<&HourlyRow> = table.on_date(date).collect();
    let weekday = date.format("%A").to_string();

    let Some(temperature) = stats::spread(rows.iter().map(|r| r.temperature)) else {
        return DailySummary {
            date,
            weekday,
            temperature: Spread::default(),
            humidity: 0.0,
            wind_speed: 0.0,
            rain: 0.0,
            pressure: STANDARD_PRESSURE,
            weather_code: 0,
            weather_description: NO_DATA.to_string(),
        };
    };

    // code and description are taken as a pair so a missing code ("Unknown")
    // is never relabelled as code 0
    let (code, description) = stats::mode(
        rows.iter().map(|r| (r.weather_code, r.weather_description)),
    )
    .unwrap_or((0, weather_code::UNKNOWN));

    DailySummary {
        date,
        weekday,
        temperature,
        humidity: stats::mean(rows.iter().map(|r| r.humidity)),
        wind_speed: stats::mean(rows.iter().map(|r| r.wind_speed)),
        rain: stats::sum(rows.iter().map(|r| r.rain)),
        pressure: stats::mean(rows.iter().map(|r| r.pressure)),
        weather_code: code,
        weather_description: description.to_string(),
    }
}

/// Statistics over the whole table.
pub fn overall_stats(table: &ForecastTable) -> Result<OverallStats, ForecastError> {
    let rows = table.rows();

    let temperature =
        stats::spread(rows.iter().map(|r| r.temperature)).ok_or(ForecastError::EmptyTable)?;
    let humidity =
        stats::spread(rows.iter().map(|r| r.humidity)).ok_or(ForecastError::EmptyTable)?;
    let pressure =
        stats::spread(rows.iter().map(|r| r.pressure)).ok_or(ForecastError::EmptyTable)?;
    let (start, end) = table.date_range().ok_or(ForecastError::EmptyTable)?;

    Ok(OverallStats {
        temperature,
        humidity,
        wind: WindStats {
            average_speed: stats::mean(rows.iter().map(|r| r.wind_speed)),
            max_gust: stats::max(rows.iter().map(|r| r.wind_gusts)),
        },
        precipitation: PrecipitationStats {
            total_rain: stats::sum(rows.iter().map(|r| r.rain)),
            rainy_hours: rows.iter().filter(|r| r.rain > 0.0).count(),
        },
        pressure,
        data_points: rows.len(),
        date_range: DateRange { start, end },
    })
}

/// Detailed view of the current date: latest reading plus day statistics.
pub fn today_forecast(
    table: &ForecastTable,
    now: NaiveDateTime,
) -> Result<TodayForecast, ForecastError> {
    let today = now.date();
    let rows: Vec<&HourlyRow> = table.on_date(today).collect();

    let latest = *rows.last().ok_or(ForecastError::NoDataForToday)?;
    let temperature =
        stats::spread(rows.iter().map(|r| r.temperature)).ok_or(ForecastError::NoDataForToday)?;

    Ok(TodayForecast {
        date: today,
        temperature: TodayTemperature {
            current: latest.temperature,
            min: temperature.min,
            max: temperature.max,
            average: temperature.average,
        },
        humidity: TodayHumidity {
            current: latest.humidity,
            average: stats::mean(rows.iter().map(|r| r.humidity)),
        },
        wind: TodayWind {
            current_speed: latest.wind_speed,
            average_speed: stats::mean(rows.iter().map(|r| r.wind_speed)),
            max_gust: stats::max(rows.iter().map(|r| r.wind_gusts)),
        },
        precipitation: TodayPrecipitation {
            total_rain: stats::sum(rows.iter().map(|r| r.rain)),
            probability: stats::mean(rows.iter().map(|r| r.precipitation_probability)),
        },
        pressure: TodayPressure {
            current: latest.pressure,
            average: stats::mean(rows.iter().map(|r| r.pressure)),
        },
        clouds: Clouds {
            average_cover: stats::mean(rows.iter().map(|r| r.cloud_cover)),
        },
        hourly_data: hourly_projection(table, now, 1),
    })
}
