/// Errors returned by the aggregation engine when it cannot produce a
/// meaningful result from the data it was given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForecastError {
    #[error("Error processing forecast data: the hourly table is empty")]
    EmptyTable,
    #[error("No data available for today")]
    NoDataForToday,
    #[error("Days parameter must be between 1 and 7, got {0}")]
    InvalidDays(i64),
}
