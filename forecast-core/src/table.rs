//! In-memory hourly time-series table.
//!
//! The table is built once per fetch from the raw `hourly` block of an
//! Open-Meteo response and is read-only afterwards. Besides the rows it keeps
//! two group-by indices (calendar date and hour of day) which the reducers in
//! [`crate::aggregate`] use instead of rescanning the rows.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde_json::{Map, Value};

use crate::weather_code;

/// Sea-level standard pressure in hPa, used when a response carries no
/// pressure at all.
pub const STANDARD_PRESSURE: f64 = 1013.0;

/// One reported hour. Every numeric field is populated; gaps in the source
/// are filled in by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRow {
    pub time: NaiveDateTime,
    pub date: NaiveDate,
    pub hour: u32,
    /// Abbreviated weekday name, e.g. "Mon".
    pub weekday: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    pub weather_code: i32,
    pub weather_description: &'static str,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub wind_gusts: f64,
    pub rain: f64,
    pub showers: f64,
    pub snowfall: f64,
    pub precipitation: f64,
    pub pressure: f64,
    pub cloud_cover: f64,
    pub cloud_cover_low: f64,
    pub cloud_cover_mid: f64,
    pub cloud_cover_high: f64,
    pub precipitation_probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    rows: Vec<HourlyRow>,
    by_date: BTreeMap<NaiveDate, Vec<usize>>,
    by_hour: BTreeMap<u32, Vec<usize>>,
}

impl ForecastTable {
    /// Build a table from the raw `hourly` payload.
    ///
    /// This never fails: an empty payload, a payload without `time`, or a
    /// structurally broken payload all yield an empty table.
    pub fn from_hourly(hourly: &Value) -> Self {
        match build_rows(hourly) {
            Ok(rows) => {
                let table = Self::from_rows(rows);
                tracing::debug!(
                    "Built forecast table with {} rows over {} days",
                    table.len(),
                    table.by_date.len()
                );
                table
            }
            Err(reason) => {
                tracing::warn!("Discarding hourly forecast payload: {reason}");
                Self::default()
            }
        }
    }

    fn from_rows(rows: Vec<HourlyRow>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        let mut by_hour: BTreeMap<u32, Vec<usize>> = BTreeMap::new();

        for (idx, row) in rows.iter().enumerate() {
            by_date.entry(row.date).or_default().push(idx);
            by_hour.entry(row.hour).or_default().push(idx);
        }

        Self {
            rows,
            by_date,
            by_hour,
        }
    }

    pub fn rows(&self) -> &[HourlyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row in source order.
    pub fn first(&self) -> Option<&HourlyRow> {
        self.rows.first()
    }

    /// Distinct calendar dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_date.keys().copied()
    }

    /// Rows dated `date`, in table order. Empty when the date is not covered.
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &HourlyRow> + '_ {
        self.indexed(self.by_date.get(&date))
    }

    /// Rows reported at `hour` on any date, in table order.
    pub fn at_hour(&self, hour: u32) -> impl Iterator<Item = &HourlyRow> + '_ {
        self.indexed(self.by_hour.get(&hour))
    }

    /// Rows dated `date`, or `None` when the table has nothing for that day.
    pub fn rows_for_date(&self, date: NaiveDate) -> Option<Vec<&HourlyRow>> {
        let rows: Vec<_> = self.on_date(date).collect();
        (!rows.is_empty()).then_some(rows)
    }

    /// Rows for `hour` across all dates, or `None` when no row has that hour.
    pub fn rows_for_hour(&self, hour: u32) -> Option<Vec<&HourlyRow>> {
        let rows: Vec<_> = self.at_hour(hour).collect();
        (!rows.is_empty()).then_some(rows)
    }

    /// Earliest and latest timestamps in the table.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.rows.iter().map(|r| r.time).min()?;
        let end = self.rows.iter().map(|r| r.time).max()?;
        Some((start, end))
    }

    fn indexed<'a>(
        &'a self,
        indices: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a HourlyRow> + 'a {
        indices
            .into_iter()
            .flatten()
            .filter_map(move |&idx| self.rows.get(idx))
    }
}

/// A single optional column of the raw payload.
#[derive(Clone, Copy)]
struct Column<'a>(Option<&'a [Value]>);

impl Column<'_> {
    /// `None` when the whole column is absent; otherwise the value at `idx`
    /// with nulls and non-numbers coerced to 0.
    fn value(&self, idx: usize) -> Option<f64> {
        self.0
            .map(|values| values.get(idx).and_then(Value::as_f64).unwrap_or(0.0))
    }

    fn or_zero(&self, idx: usize) -> f64 {
        self.value(idx).unwrap_or(0.0)
    }

    /// Integral value at `idx`, `None` when absent, null or fractional.
    fn code(&self, idx: usize) -> Option<i32> {
        let value = self.0?.get(idx)?;
        if let Some(code) = value.as_i64() {
            return i32::try_from(code).ok();
        }
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .and_then(|f| i32::try_from(f as i64).ok())
    }
}

struct Columns<'a> {
    times: &'a [Value],
    fields: &'a Map<String, Value>,
}

impl<'a> Columns<'a> {
    fn get(&self, name: &str) -> Result<Column<'a>, String> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(Column(None)),
            Some(Value::Array(values)) if values.len() == self.times.len() => {
                Ok(Column(Some(values.as_slice())))
            }
            Some(Value::Array(values)) => Err(format!(
                "column '{name}' has {} values, expected {}",
                values.len(),
                self.times.len()
            )),
            Some(_) => Err(format!("column '{name}' is not an array")),
        }
    }
}

fn build_rows(hourly: &Value) -> Result<Vec<HourlyRow>, String> {
    let fields = match hourly {
        Value::Null => return Ok(Vec::new()),
        Value::Object(fields) => fields,
        _ => return Err("hourly block is not an object".to_string()),
    };

    let times = match fields.get("time") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(times)) => times.as_slice(),
        Some(_) => return Err("'time' is not an array".to_string()),
    };

    if times.is_empty() {
        return Ok(Vec::new());
    }

    let cols = Columns { times, fields };
    let temperature = cols.get("temperature_2m")?;
    let apparent = cols.get("apparent_temperature")?;
    let humidity = cols.get("relative_humidity_2m")?;
    let code = cols.get("weather_code")?;
    let wind_speed = cols.get("wind_speed_10m")?;
    let wind_direction = cols.get("wind_direction_10m")?;
    let wind_gusts = cols.get("wind_gusts_10m")?;
    let rain = cols.get("rain")?;
    let showers = cols.get("showers")?;
    let snowfall = cols.get("snowfall")?;
    let precipitation = cols.get("precipitation")?;
    let pressure = cols.get("surface_pressure")?;
    let cloud_cover = cols.get("cloud_cover")?;
    let cloud_low = cols.get("cloud_cover_low")?;
    let cloud_mid = cols.get("cloud_cover_mid")?;
    let cloud_high = cols.get("cloud_cover_high")?;
    let precip_probability = cols.get("precipitation_probability")?;

    let mut rows = Vec::with_capacity(times.len());

    for (idx, raw_time) in times.iter().enumerate() {
        let time = raw_time
            .as_str()
            .and_then(parse_timestamp)
            .ok_or_else(|| format!("unparseable timestamp {raw_time} at row {idx}"))?;

        let temp = temperature.or_zero(idx);
        let wind = wind_speed.or_zero(idx);
        let weather_code = code.code(idx);

        rows.push(HourlyRow {
            time,
            date: time.date(),
            hour: time.hour(),
            weekday: time.format("%a").to_string(),
            temperature: temp,
            apparent_temperature: apparent.value(idx).unwrap_or(temp),
            humidity: humidity.or_zero(idx),
            weather_code: weather_code.unwrap_or(0),
            weather_description: weather_code
                .map(weather_code::describe)
                .unwrap_or(weather_code::UNKNOWN),
            wind_speed: wind,
            wind_direction: wind_direction.or_zero(idx),
            wind_gusts: wind_gusts.value(idx).unwrap_or(wind),
            rain: rain.or_zero(idx),
            showers: showers.or_zero(idx),
            snowfall: snowfall.or_zero(idx),
            precipitation: precipitation.or_zero(idx),
            pressure: pressure.value(idx).unwrap_or(STANDARD_PRESSURE),
            cloud_cover: cloud_cover.or_zero(idx),
            cloud_cover_low: cloud_low.or_zero(idx),
            cloud_cover_mid: cloud_mid.or_zero(idx),
            cloud_cover_high: cloud_high.or_zero(idx),
            precipitation_probability: precip_probability.or_zero(idx),
        });
    }

    Ok(rows)
}

/// Open-Meteo sends local times without seconds ("2024-05-01T13:00");
/// full seconds and RFC 3339 offsets are accepted as well.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}


#[cfg(test)]
mod tests {
    use super::fixtures::{date, hourly_days};
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_one_row_per_timestamp() {
        let table = ForecastTable::from_hourly(&hourly_days(date(2024, 5, 1), 3, 61));

        assert_eq!(table.len(), 72);
        assert_eq!(table.dates().count(), 3);
        assert!(table.rows().iter().all(|r| r.weather_description == "Slight rain"));
    }

    #[test]
    fn derives_date_hour_and_weekday() {
        let table = ForecastTable::from_hourly(&json!({
            "time": ["2024-05-01T13:00"],
            "temperature_2m": [18.5],
        }));

        let row = table.first().expect("one row");
        assert_eq!(row.date, date(2024, 5, 1));
        assert_eq!(row.hour, 13);
        assert_eq!(row.weekday, "Wed");
    }

    #[test]
    fn descriptions_fall_back_to_unknown() {
        let table = ForecastTable::from_hourly(&json!({
            "time": ["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-01T02:00"],
            "weather_code": [0, 123, null],
        }));

        let descriptions: Vec<_> = table.rows().iter().map(|r| r.weather_description).collect();
        assert_eq!(descriptions, vec!["Clear sky", "Unknown", "Unknown"]);
        assert_eq!(table.rows()[2].weather_code, 0);
    }

    #[test]
    fn missing_values_become_zero() {
        let table = ForecastTable::from_hourly(&json!({
            "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
            "temperature_2m": [null, 4.0],
            "rain": [0.2, "n/a"],
        }));

        let rows = table.rows();
        assert_eq!(rows[0].temperature, 0.0);
        assert_eq!(rows[1].temperature, 4.0);
        assert_eq!(rows[1].rain, 0.0);
        assert_eq!(rows[0].humidity, 0.0);
    }

    #[test]
    fn absent_apparent_temperature_and_gusts_follow_their_base_column() {
        let table = ForecastTable::from_hourly(&json!({
            "time": ["2024-05-01T00:00"],
            "temperature_2m": [7.5],
            "wind_speed_10m": [12.0],
        }));

        let row = table.first().expect("one row");
        assert_eq!(row.apparent_temperature, 7.5);
        assert_eq!(row.wind_gusts, 12.0);
    }

    #[test]
    fn absent_pressure_column_is_standard_pressure() {
        let absent = ForecastTable::from_hourly(&json!({
            "time": ["2024-05-01T00:00"],
            "temperature_2m": [7.5],
        }));
        assert_eq!(absent.rows()[0].pressure, STANDARD_PRESSURE);

        // a gap inside a present column is still a plain zero
        let gap = ForecastTable::from_hourly(&json!({
            "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
            "surface_pressure": [1002.5, null],
        }));
        assert_eq!(gap.rows()[0].pressure, 1002.5);
        assert_eq!(gap.rows()[1].pressure, 0.0);
    }

    #[test]
    fn empty_payloads_give_empty_tables() {
        assert!(ForecastTable::from_hourly(&json!({})).is_empty());
        assert!(ForecastTable::from_hourly(&json!({"time": []})).is_empty());
        assert!(ForecastTable::from_hourly(&Value::Null).is_empty());
    }

    #[test]
    fn malformed_payloads_give_empty_tables() {
        assert!(ForecastTable::from_hourly(&json!([1, 2, 3])).is_empty());
        assert!(ForecastTable::from_hourly(&json!({"time": "2024-05-01T00:00"})).is_empty());
        assert!(
            ForecastTable::from_hourly(&json!({
                "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
                "temperature_2m": [1.0],
            }))
            .is_empty()
        );
        assert!(ForecastTable::from_hourly(&json!({"time": ["yesterday"]})).is_empty());
    }

    #[test]
    fn accepts_seconds_and_offsets() {
        assert!(parse_timestamp("2024-05-01T13:00:00").is_some());
        assert_eq!(
            parse_timestamp("2024-05-01T13:00:00+02:00").map(|t| t.hour()),
            Some(13)
        );
        assert!(parse_timestamp("01/05/2024").is_none());
    }

    #[test]
    fn group_lookups() {
        let table = ForecastTable::from_hourly(&hourly_days(date(2024, 5, 1), 2, 3));

        let day = table.rows_for_date(date(2024, 5, 2)).expect("second day present");
        assert_eq!(day.len(), 24);
        assert!(day.iter().all(|r| r.date == date(2024, 5, 2)));

        let noon = table.rows_for_hour(12).expect("noon present");
        assert_eq!(noon.len(), 2);

        assert!(table.rows_for_date(date(2024, 6, 1)).is_none());
        assert!(table.rows_for_hour(24).is_none());
    }

    #[test]
    fn date_range_uses_extremes_not_source_order() {
        let table = ForecastTable::from_hourly(&json!({
            "time": ["2024-05-01T05:00", "2024-05-01T01:00", "2024-05-01T09:00"],
        }));

        let (start, end) = table.date_range().expect("non-empty");
        assert_eq!(start.hour(), 1);
        assert_eq!(end.hour(), 9);
        assert_eq!(table.first().map(|r| r.hour), Some(5));
    }
}
