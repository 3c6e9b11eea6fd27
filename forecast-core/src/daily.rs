use serde_json::Value;

use crate::model::DailyRow;

/// Pair the daily `time`, `sunrise` and `sunset` arrays by position.
///
/// Yields `min(len(time), days)` rows. A sunrise or sunset that is missing
/// or not a string becomes `None`; anything unreadable yields no rows.
pub fn daily_series(daily: &Value, days: usize) -> Vec<DailyRow> {
    let dates = match daily.get("time").or_else(|| daily.get("date")) {
        Some(Value::Array(dates)) => dates.as_slice(),
        _ => return Vec::new(),
    };

    let sunrises = string_array(daily, "sunrise");
    let sunsets = string_array(daily, "sunset");

    dates
        .iter()
        .take(days)
        .enumerate()
        .map(|(idx, date)| DailyRow {
            date: date.as_str().map_or_else(|| date.to_string(), str::to_string),
            sunrise: sunrises.get(idx).cloned().flatten(),
            sunset: sunsets.get(idx).cloned().flatten(),
        })
        .collect()
}

fn string_array(daily: &Value, key: &str) -> Vec<Option<String>> {
    daily
        .get(key)
        .and_then(Value::as_array)
        .map(|values| values.iter().map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}
