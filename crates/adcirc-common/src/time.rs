//! Run dates, model time axes and output time zones.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::{AdcircError, AdcircResult};

/// A model cycle, written `YYYYMMDDHH` in server paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct RunDate(NaiveDateTime);

impl RunDate {
    /// Build from a calendar day and a cycle hour.
    pub fn new(date: NaiveDate, hour: u32) -> AdcircResult<Self> {
        let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(|| {
            AdcircError::invalid_parameter("hour", format!("{} is not a valid hour", hour))
        })?;
        Ok(Self(date.and_time(time)))
    }

    /// Parse a `YYYYMMDDHH` string.
    pub fn parse(s: &str) -> AdcircResult<Self> {
        let s = s.trim();
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AdcircError::InvalidRunDate(s.to_string()));
        }
        let date = NaiveDate::parse_from_str(&s[..8], "%Y%m%d")
            .map_err(|_| AdcircError::InvalidRunDate(s.to_string()))?;
        let hour: u32 = s[8..]
            .parse()
            .map_err(|_| AdcircError::InvalidRunDate(s.to_string()))?;
        Self::new(date, hour).map_err(|_| AdcircError::InvalidRunDate(s.to_string()))
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0)
    }
}

impl fmt::Display for RunDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d%H"))
    }
}

impl FromStr for RunDate {
    type Err = AdcircError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunDate::parse(s)
    }
}

impl<'de> Deserialize<'de> for RunDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // YAML reads an unquoted `2017080300` as an integer.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        let text = match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s,
            Repr::Number(n) => n.to_string(),
        };
        RunDate::parse(&text).map_err(de::Error::custom)
    }
}

impl From<RunDate> for String {
    fn from(date: RunDate) -> Self {
        date.to_string()
    }
}

/// Parse a `YYYY-MM-DD` calendar date (a bare `YYYYMMDD` is accepted too).
pub fn parse_calendar_date(s: &str) -> AdcircResult<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|_| AdcircError::InvalidDate(s.to_string()))
}

/// Days in the half-open range `[start, end)`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let days = (end - start).num_days().max(0);
    (0..days).map(move |n| start + Duration::days(n))
}

/// Every cycle of every day in `[start, end)`, in chronological order.
pub fn run_dates(start: NaiveDate, end: NaiveDate, cycles: &[u32]) -> AdcircResult<Vec<RunDate>> {
    let mut sorted = cycles.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut dates = Vec::new();
    for day in date_range(start, end) {
        for &hour in &sorted {
            dates.push(RunDate::new(day, hour)?);
        }
    }
    Ok(dates)
}

/// A CF-style time axis: `<unit> since <origin>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBase {
    pub origin: DateTime<Utc>,
    /// Length of one axis unit in seconds.
    pub unit_seconds: f64,
}

impl TimeBase {
    /// Parse a units attribute such as `seconds since 2018-09-07 00:00:00 +00:00`.
    pub fn from_units(units: &str) -> AdcircResult<Self> {
        let lowered = units.trim().to_ascii_lowercase();
        let (unit, origin) = lowered
            .split_once(" since ")
            .ok_or_else(|| AdcircError::InvalidTimeUnits(units.to_string()))?;

        let unit_seconds = match unit.trim() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
            "days" | "day" | "d" => 86400.0,
            _ => return Err(AdcircError::InvalidTimeUnits(units.to_string())),
        };

        // Work on the original casing so `T` separators survive.
        let origin = &units.trim()[units.trim().len() - origin.len()..];
        let origin = parse_origin(origin.trim())
            .ok_or_else(|| AdcircError::InvalidTimeUnits(units.to_string()))?;

        Ok(Self {
            origin,
            unit_seconds,
        })
    }

    /// Absolute time of an axis value.
    pub fn at(&self, value: f64) -> AdcircResult<DateTime<Utc>> {
        let seconds = value * self.unit_seconds;
        if !seconds.is_finite() || seconds.abs() > 1.0e12 {
            return Err(AdcircError::TimeOutOfRange(seconds));
        }
        let millis = (seconds * 1000.0).round() as i64;
        Ok(self.origin + Duration::milliseconds(millis))
    }
}

fn parse_origin(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S %:z", "%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S %z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = s
        .trim_end_matches("UTC")
        .trim_end_matches("GMT")
        .trim_end_matches('Z')
        .trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

/// Time zone used for the Date column of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputZone {
    #[default]
    Gmt,
    /// US Eastern Standard Time, a fixed UTC-5 with no daylight saving.
    Est,
}

impl OutputZone {
    pub fn label(&self) -> &'static str {
        match self {
            OutputZone::Gmt => "GMT",
            OutputZone::Est => "EST",
        }
    }

    /// Format a model time as `YYYY-MM-DD HH:MM` in this zone.
    pub fn format(&self, time: DateTime<Utc>) -> String {
        let local = match self {
            OutputZone::Gmt => time.naive_utc(),
            OutputZone::Est => (time - Duration::hours(5)).naive_utc(),
        };
        local.format("%Y-%m-%d %H:%M").to_string()
    }
}

impl FromStr for OutputZone {
    type Err = AdcircError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gmt" | "utc" => Ok(OutputZone::Gmt),
            "est" => Ok(OutputZone::Est),
            other => Err(AdcircError::invalid_parameter(
                "zone",
                format!("'{}' is not one of gmt, est", other),
            )),
        }
    }
}
