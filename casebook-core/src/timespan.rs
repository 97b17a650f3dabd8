//! Time ranges used to bound notebooklet queries.
//!
//! A [`Timespan`] is a closed start/end range in UTC. It can be built from
//! explicit datetimes, from an end plus a period ("1d", "12h"), from a start
//! plus a period, or from a period alone (end defaults to now). Datetimes
//! and periods may be given as strings, which are parsed on build.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimespanError;

/// A start/end time range in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timespan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Timespan {
    /// Create a timespan from explicit start and end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Create a timespan ending now with the given period.
    pub fn last(period: Duration) -> Self {
        let end = Utc::now();
        Self {
            start: end - period,
            end,
        }
    }

    /// Start building a timespan from mixed inputs.
    pub fn builder() -> TimespanBuilder {
        TimespanBuilder::default()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The length of the range.
    pub fn period(&self) -> Duration {
        self.end - self.start
    }
}

impl std::fmt::Display for Timespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl From<(DateTime<Utc>, DateTime<Utc>)> for Timespan {
    fn from((start, end): (DateTime<Utc>, DateTime<Utc>)) -> Self {
        Self::new(start, end)
    }
}

impl TryFrom<(&str, &str)> for Timespan {
    type Error = TimespanError;

    fn try_from((start, end): (&str, &str)) -> Result<Self, TimespanError> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }
}

/// A datetime input: already parsed or a string to parse at build time.
#[derive(Debug, Clone)]
pub enum TimeInput {
    DateTime(DateTime<Utc>),
    Text(String),
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(value: DateTime<Utc>) -> Self {
        TimeInput::DateTime(value)
    }
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        TimeInput::Text(value.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(value: String) -> Self {
        TimeInput::Text(value)
    }
}

/// A period input: a duration or a string like "1d" or "12h".
#[derive(Debug, Clone)]
pub enum PeriodInput {
    Duration(Duration),
    Text(String),
}

impl From<Duration> for PeriodInput {
    fn from(value: Duration) -> Self {
        PeriodInput::Duration(value)
    }
}

impl From<&str> for PeriodInput {
    fn from(value: &str) -> Self {
        PeriodInput::Text(value.to_string())
    }
}

impl From<String> for PeriodInput {
    fn from(value: String) -> Self {
        PeriodInput::Text(value)
    }
}

/// Builder assembling a [`Timespan`] from any valid combination of
/// start, end, and period.
#[derive(Debug, Clone, Default)]
pub struct TimespanBuilder {
    start: Option<TimeInput>,
    end: Option<TimeInput>,
    period: Option<PeriodInput>,
}

impl TimespanBuilder {
    pub fn start(mut self, start: impl Into<TimeInput>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<TimeInput>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn period(mut self, period: impl Into<PeriodInput>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// Resolve the inputs into a concrete timespan.
    ///
    /// Resolution rules: start+end as given; end+period derives start;
    /// start+period derives end; start alone ends now; period alone ends
    /// now. Anything else is a missing-parameter error.
    pub fn build(self) -> Result<Timespan, TimespanError> {
        let start = self.start.map(resolve_time).transpose()?;
        let end = self.end.map(resolve_time).transpose()?;
        let period = self.period.map(resolve_period).transpose()?;

        match (start, end, period) {
            (Some(start), Some(end), _) => Ok(Timespan::new(start, end)),
            (Some(start), None, Some(period)) => Ok(Timespan::new(start, start + period)),
            (None, Some(end), Some(period)) => Ok(Timespan::new(end - period, end)),
            (Some(start), None, None) => Ok(Timespan::new(start, Utc::now())),
            (None, None, Some(period)) => Ok(Timespan::last(period)),
            _ => Err(TimespanError::MissingParameter),
        }
    }
}

fn resolve_time(input: TimeInput) -> Result<DateTime<Utc>, TimespanError> {
    match input {
        TimeInput::DateTime(dt) => Ok(dt),
        TimeInput::Text(text) => parse_date(&text),
    }
}

fn resolve_period(input: PeriodInput) -> Result<Duration, TimespanError> {
    match input {
        PeriodInput::Duration(d) => Ok(d),
        PeriodInput::Text(text) => parse_period(&text),
    }
}

/// Parse a datetime string in RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`,
/// `YYYY-MM-DDTHH:MM:SS[.f]`, or bare `YYYY-MM-DD` form. Naive values are
/// taken as UTC.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, TimespanError> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(TimespanError::InvalidDate {
        value: value.to_string(),
    })
}

/// Parse a period string such as "1d", "12H", "30m", "90s", or "2w".
/// Units are case-insensitive.
pub fn parse_period(value: &str) -> Result<Duration, TimespanError> {
    let trimmed = value.trim();
    let invalid = || TimespanError::InvalidPeriod {
        value: value.to_string(),
    };
    // Split off the unit at a char boundary; the unit may be any char.
    let (unit_index, unit) = trimmed.char_indices().last().ok_or_else(invalid)?;
    let count = &trimmed[..unit_index];
    if count.is_empty() {
        return Err(invalid());
    }
    let count: i64 = count.trim().parse().map_err(|_| invalid())?;
    if count < 0 {
        return Err(invalid());
    }
    match unit.to_ascii_lowercase() {
        'w' => Ok(Duration::weeks(count)),
        'd' => Ok(Duration::days(count)),
        'h' => Ok(Duration::hours(count)),
        'm' => Ok(Duration::minutes(count)),
        's' => Ok(Duration::seconds(count)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_range() -> (DateTime<Utc>, DateTime<Utc>) {
        let end = parse_date("2024-06-02 12:00:00").unwrap();
        (end - Duration::days(1), end)
    }

    #[test]
    fn test_start_and_end() {
        let (start, end) = fixed_range();
        let tspan = Timespan::new(start, end);
        assert_eq!(tspan.start(), start);
        assert_eq!(tspan.end(), end);
        assert_eq!(tspan.period(), Duration::days(1));
    }

    #[test]
    fn test_end_plus_period() {
        let (start, end) = fixed_range();
        let tspan = Timespan::builder()
            .end(end)
            .period(Duration::days(1))
            .build()
            .unwrap();
        assert_eq!(tspan.start(), start);
        assert_eq!(tspan.end(), end);
    }

    #[test]
    fn test_end_plus_period_string() {
        let (start, end) = fixed_range();
        let tspan = Timespan::builder().end(end).period("1D").build().unwrap();
        assert_eq!(tspan.start(), start);

        let tspan = Timespan::builder().end(end).period("1d").build().unwrap();
        assert_eq!(tspan.start(), start);
    }

    #[test]
    fn test_string_inputs() {
        let (start, end) = fixed_range();
        let tspan = Timespan::builder()
            .end(end.to_rfc3339())
            .period("1d")
            .build()
            .unwrap();
        assert_eq!(tspan.start(), start);
        assert_eq!(tspan.end(), end);

        let tspan = Timespan::builder()
            .start("2024-06-01 12:00:00")
            .end("2024-06-02 12:00:00")
            .build()
            .unwrap();
        assert_eq!(tspan.start(), start);
        assert_eq!(tspan.end(), end);

        let tspan = Timespan::builder()
            .start("2024-06-01 12:00:00")
            .period("1d")
            .build()
            .unwrap();
        assert_eq!(tspan.end(), end);
    }

    #[test]
    fn test_start_only_ends_now() {
        let (start, _) = fixed_range();
        let tspan = Timespan::builder().start(start).build().unwrap();
        assert_eq!(tspan.start(), start);
        assert!(tspan.end() <= Utc::now());
    }

    #[test]
    fn test_period_only() {
        let tspan = Timespan::builder()
            .period(Duration::days(1))
            .build()
            .unwrap();
        assert_eq!(tspan.period(), Duration::days(1));
    }

    #[test]
    fn test_tuple_conversions() {
        let (start, end) = fixed_range();
        let tspan: Timespan = (start, end).into();
        let tspan2 = Timespan::try_from(("2024-06-01 12:00:00", "2024-06-02 12:00:00")).unwrap();
        assert_eq!(tspan, tspan2);
    }

    #[test]
    fn test_missing_parameters() {
        assert!(matches!(
            Timespan::builder().build(),
            Err(TimespanError::MissingParameter)
        ));
        let (_, end) = fixed_range();
        assert!(matches!(
            Timespan::builder().end(end).build(),
            Err(TimespanError::MissingParameter)
        ));
    }

    #[test]
    fn test_invalid_date() {
        let result = Timespan::builder()
            .start("foo")
            .period(Duration::days(1))
            .build();
        assert!(matches!(result, Err(TimespanError::InvalidDate { .. })));
    }

    #[test]
    fn test_invalid_period() {
        assert!(matches!(
            parse_period("some length"),
            Err(TimespanError::InvalidPeriod { .. })
        ));
        assert!(matches!(
            parse_period("1"),
            Err(TimespanError::InvalidPeriod { .. })
        ));
        assert!(matches!(
            parse_period("-1d"),
            Err(TimespanError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_invalid_period_multibyte_unit() {
        // Non-ASCII units must be rejected, not split mid-character.
        assert!(matches!(
            parse_period("1µ"),
            Err(TimespanError::InvalidPeriod { .. })
        ));
        assert!(matches!(
            parse_period("10µs"),
            Err(TimespanError::InvalidPeriod { .. })
        ));
        assert!(matches!(
            parse_period("µ"),
            Err(TimespanError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_parse_period_units() {
        assert_eq!(parse_period("2w").unwrap(), Duration::weeks(2));
        assert_eq!(parse_period("12H").unwrap(), Duration::hours(12));
        assert_eq!(parse_period("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_period("90s").unwrap(), Duration::seconds(90));
    }

    #[test]
    fn test_serde_roundtrip() {
        let (start, end) = fixed_range();
        let tspan = Timespan::new(start, end);
        let json = serde_json::to_string(&tspan).unwrap();
        let restored: Timespan = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, tspan);
    }
}
