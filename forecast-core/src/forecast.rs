use chrono::{FixedOffset, Local, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::{
    aggregate,
    daily::daily_series,
    error::ForecastError,
    model::{
        CurrentConditions, DailyRow, ForecastDays, ForecastReport, ForecastSummary, HourlyRecord,
        Location, RawForecast, TodayForecast, WeekForecast,
    },
    table::ForecastTable,
};

/// The result of one fetch: the hourly table plus everything else the views
/// need, pinned to the moment the data was fetched.
///
/// A `Forecast` is owned by whoever loaded it and never changes. Reloading
/// produces a new value instead of mutating this one.
#[derive(Debug, Clone)]
pub struct Forecast {
    table: ForecastTable,
    daily: Value,
    location: Location,
    units: Map<String, Value>,
    reference: NaiveDateTime,
}

impl Forecast {
    /// Build from a raw response, taking "now" from the wall clock in the
    /// response's own UTC offset.
    pub fn from_raw(raw: RawForecast) -> Self {
        let reference = local_now(raw.utc_offset_seconds);
        Self::at(raw, reference)
    }

    /// Build from a raw response with an explicit reference moment.
    pub fn at(raw: RawForecast, reference: NaiveDateTime) -> Self {
        let table = ForecastTable::from_hourly(&raw.hourly);
        let location = Location::from(&raw);

        Self {
            table,
            daily: raw.daily,
            location,
            units: raw.hourly_units,
            reference,
        }
    }

    pub fn table(&self) -> &ForecastTable {
        &self.table
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The moment every view treats as "now".
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    pub fn current(&self) -> Option<CurrentConditions> {
        aggregate::current_conditions(&self.table, self.reference)
    }

    pub fn hourly(&self, days: ForecastDays) -> Vec<HourlyRecord> {
        aggregate::hourly_projection(&self.table, self.reference, u32::from(days.get()))
    }

    pub fn daily(&self, days: ForecastDays) -> Vec<DailyRow> {
        daily_series(&self.daily, usize::from(days.get()))
    }

    pub fn report(&self, days: ForecastDays) -> ForecastReport {
        ForecastReport {
            location: self.location.clone(),
            current: self.current(),
            hourly: self.hourly(days),
            daily: self.daily(days),
            units: self.units.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn week(&self) -> WeekForecast {
        WeekForecast {
            location: self.location.clone(),
            daily_summaries: aggregate::week_summaries(&self.table, self.reference),
            generated_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> Result<ForecastSummary, ForecastError> {
        Ok(ForecastSummary {
            summary: aggregate::overall_stats(&self.table)?,
            current_conditions: self.current(),
            generated_at: Utc::now(),
        })
    }

    pub fn today(&self) -> Result<TodayForecast, ForecastError> {
        aggregate::today_forecast(&self.table, self.reference)
    }
}

/// Current wall-clock time at `utc_offset_seconds` east of UTC, or in the
/// local timezone when the offset is unknown or out of range.
pub fn local_now(utc_offset_seconds: Option<i32>) -> NaiveDateTime {
    match utc_offset_seconds.and_then(FixedOffset::east_opt) {
        Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
        None => Local::now().naive_local(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixtures::{date, hourly_days};
    use serde_json::json;

    fn raw(hourly: Value) -> RawForecast {
        RawForecast {
            latitude: Some(49.922),
            longitude: Some(14.446),
            elevation: Some(351.0),
            timezone: Some("Europe/Berlin".into()),
            utc_offset_seconds: Some(7200),
            hourly,
            daily: json!({
                "time": ["2024-05-01", "2024-05-02", "2024-05-03"],
                "sunrise": ["2024-05-01T05:31", "2024-05-02T05:29", "2024-05-03T05:27"],
                "sunset": ["2024-05-01T20:22", "2024-05-02T20:24", "2024-05-03T20:25"],
            }),
            hourly_units: json!({"temperature_2m": "°C"})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn noon() -> NaiveDateTime {
        date(2024, 5, 1).and_hms_opt(12, 0, 0).expect("valid")
    }

    #[test]
    fn report_carries_location_units_and_views() {
        let forecast = Forecast::at(raw(hourly_days(date(2024, 5, 1), 3, 0)), noon());
        let days = ForecastDays::try_from(2).expect("valid days");

        let report = forecast.report(days);
        assert_eq!(report.location.elevation, Some(351.0));
        assert_eq!(report.location.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(report.units.get("temperature_2m"), Some(&json!("°C")));
        assert_eq!(report.current.map(|c| c.temperature), Some(12.0));
        assert_eq!(report.hourly.len(), 72);
        assert_eq!(report.daily.len(), 2);
    }

    #[test]
    fn views_share_the_reference_moment() {
        let forecast = Forecast::at(raw(hourly_days(date(2024, 5, 1), 3, 0)), noon());

        assert_eq!(forecast.reference(), noon());
        assert_eq!(forecast.week().daily_summaries[0].date, date(2024, 5, 1));
        assert_eq!(forecast.today().map(|t| t.date), Ok(date(2024, 5, 1)));
    }

    #[test]
    fn empty_hourly_block_degrades_per_view() {
        let forecast = Forecast::at(raw(json!({})), noon());

        assert!(forecast.table().is_empty());
        assert!(forecast.current().is_none());
        assert!(forecast.hourly(ForecastDays::default()).is_empty());
        assert_eq!(forecast.week().daily_summaries.len(), 7);
        assert_eq!(forecast.summary().unwrap_err(), ForecastError::EmptyTable);
        assert_eq!(forecast.today().unwrap_err(), ForecastError::NoDataForToday);
        assert_eq!(forecast.daily(ForecastDays::default()).len(), 3);
    }

    #[test]
    fn summary_nests_current_conditions() {
        let forecast = Forecast::at(raw(hourly_days(date(2024, 5, 1), 2, 0)), noon());

        let summary = forecast.summary().expect("rows present");
        assert_eq!(summary.summary.data_points, 48);
        assert_eq!(summary.current_conditions.map(|c| c.temperature), Some(12.0));
    }

    #[test]
    fn local_now_honours_offset() {
        let utc = Utc::now().naive_utc();
        let shifted = local_now(Some(3600));
        let diff = (shifted - utc).num_minutes();
        assert!((59..=61).contains(&diff), "unexpected offset: {diff} minutes");
    }
}
