//! Human-readable and JSON rendering of forecast views.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use forecast_core::{
    CurrentConditions, DailyRow, ForecastReport, ForecastSummary, HourlyRecord, Location,
    TodayForecast, WeekForecast, table::parse_timestamp,
};
use serde::Serialize;

const RULE: &str = "============================================================";
const HOURLY_ROWS_SHOWN: usize = 24;

pub fn report(report: &ForecastReport, json: bool, verbose: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    location(&report.location);
    current(report.current.as_ref());
    hourly(&report.hourly, verbose);
    daily(&report.daily);
    generated(report.generated_at);
    Ok(())
}

pub fn today(loc: &Location, today: &TodayForecast, json: bool, verbose: bool) -> Result<()> {
    if json {
        return print_json(today);
    }

    location(loc);
    println!("\nToday, {}", today.date.format("%A %Y-%m-%d"));
    println!("{RULE}");
    println!(
        "   Temperature: {} now, {} to {} (avg {})",
        temperature(today.temperature.current),
        temperature(today.temperature.min),
        temperature(today.temperature.max),
        temperature(today.temperature.average),
    );
    println!(
        "   Humidity: {} now, avg {}",
        humidity(today.humidity.current),
        humidity(today.humidity.average)
    );
    println!(
        "   Wind: {} now, avg {}, gusts up to {}",
        wind_speed(today.wind.current_speed),
        wind_speed(today.wind.average_speed),
        wind_speed(today.wind.max_gust),
    );
    println!(
        "   Rain: {} total, {:.0}% chance",
        rain(today.precipitation.total_rain),
        today.precipitation.probability
    );
    println!(
        "   Pressure: {} now, avg {}",
        pressure(today.pressure.current),
        pressure(today.pressure.average)
    );
    println!("   Cloud Cover: {:.0}%", today.clouds.average_cover);

    hourly(&today.hourly_data, verbose);
    Ok(())
}

pub fn week(week: &WeekForecast, json: bool) -> Result<()> {
    if json {
        return print_json(week);
    }

    location(&week.location);
    println!("\nWeek Forecast");
    println!("{RULE}");

    for day in &week.daily_summaries {
        println!("   {} {}: {}", day.weekday, day.date, day.weather_description);
        println!(
            "     Temperature: {} to {} | Humidity: {} | Wind: {} | Rain: {}",
            temperature(day.temperature.min),
            temperature(day.temperature.max),
            humidity(day.humidity),
            wind_speed(day.wind_speed),
            rain(day.rain),
        );
    }

    generated(week.generated_at);
    Ok(())
}

pub fn summary(loc: &Location, summary: &ForecastSummary, json: bool) -> Result<()> {
    if json {
        return print_json(summary);
    }

    let stats = &summary.summary;

    location(loc);
    current(summary.current_conditions.as_ref());
    println!("\nForecast Summary");
    println!("{RULE}");
    println!(
        "   Period: {} to {} ({} hours)",
        stats.date_range.start.format("%Y-%m-%d %H:%M"),
        stats.date_range.end.format("%Y-%m-%d %H:%M"),
        stats.data_points
    );
    println!(
        "   Temperature: {} to {} (avg {})",
        temperature(stats.temperature.min),
        temperature(stats.temperature.max),
        temperature(stats.temperature.average),
    );
    println!(
        "   Humidity: {} to {} (avg {})",
        humidity(stats.humidity.min),
        humidity(stats.humidity.max),
        humidity(stats.humidity.average),
    );
    println!(
        "   Wind: avg {}, gusts up to {}",
        wind_speed(stats.wind.average_speed),
        wind_speed(stats.wind.max_gust)
    );
    println!(
        "   Rain: {} over {} hours",
        rain(stats.precipitation.total_rain),
        stats.precipitation.rainy_hours
    );
    println!(
        "   Pressure: {} to {} (avg {})",
        pressure(stats.pressure.min),
        pressure(stats.pressure.max),
        pressure(stats.pressure.average),
    );

    generated(summary.generated_at);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn location(location: &Location) {
    println!("\nLocation Information");
    println!("{RULE}");
    println!(
        "   Coordinates: {}, {}",
        or_na(location.latitude),
        or_na(location.longitude)
    );
    println!("   Elevation: {} m", or_na(location.elevation));
    println!("   Timezone: {}", location.timezone.as_deref().unwrap_or("N/A"));
}

fn current(current: Option<&CurrentConditions>) {
    let Some(c) = current else {
        println!("\nNo current conditions available");
        return;
    };

    println!("\nCurrent Forecast Conditions");
    println!("{RULE}");
    println!("   Time: {}", clock(c.time));
    println!("   Temperature: {}", temperature(c.temperature));
    println!("   Feels Like: {}", temperature(c.apparent_temperature));
    println!("   Humidity: {}", humidity(c.humidity));
    println!("   Weather: {}", c.weather_description);
    println!("   Wind: {} at {:.0}°", wind_speed(c.wind_speed), c.wind_direction);
    println!("   Pressure: {}", pressure(c.pressure));
    println!("   Cloud Cover: {:.0}%", c.cloud_cover);
}

fn hourly(hours: &[HourlyRecord], verbose: bool) {
    if hours.is_empty() {
        println!("\nNo hourly forecast data available");
        return;
    }

    println!("\nHourly Forecast (next {HOURLY_ROWS_SHOWN} hours)");
    println!("{RULE}");

    for h in hours.iter().take(HOURLY_ROWS_SHOWN) {
        println!(
            "   {}: {} | {} | Wind: {} | Rain: {}",
            clock(h.time),
            temperature(h.temperature),
            h.weather_description,
            wind_speed(h.wind_speed),
            rain(h.rain),
        );

        if verbose {
            println!(
                "        Humidity: {} | Pressure: {} | Clouds: {:.0}%",
                humidity(h.humidity),
                pressure(h.pressure),
                h.cloud_cover
            );
        }
    }
}

fn daily(days: &[DailyRow]) {
    if days.is_empty() {
        println!("\nNo daily forecast data available");
        return;
    }

    println!("\nDaily Forecast");
    println!("{RULE}");

    for day in days {
        println!("   {}:", day.date);
        println!(
            "     Sunrise: {} | Sunset: {}",
            day.sunrise.as_deref().map_or_else(|| "N/A".to_string(), clock_str),
            day.sunset.as_deref().map_or_else(|| "N/A".to_string(), clock_str),
        );
    }
}

fn generated(at: DateTime<Utc>) {
    println!(
        "\nGenerated at: {}",
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn temperature(t: f64) -> String {
    format!("{t:.1}°C")
}

fn humidity(h: f64) -> String {
    format!("{h:.0}%")
}

fn wind_speed(w: f64) -> String {
    format!("{w:.1} km/h")
}

fn pressure(p: f64) -> String {
    format!("{p:.1} hPa")
}

fn rain(r: f64) -> String {
    format!("{r:.1} mm")
}

fn clock(t: NaiveDateTime) -> String {
    t.format("%H:%M").to_string()
}

/// "HH:MM" for a timestamp string, or the string unchanged if it doesn't parse.
fn clock_str(s: &str) -> String {
    parse_timestamp(s).map_or_else(|| s.to_string(), clock)
}
