//! Conversions of Kubernetes timestamps

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// RFC 3339 rendering of an optional timestamp in UTC, empty when absent
pub fn format_time(time: Option<&Time>) -> String {
    time.and_then(to_datetime)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Goes through the wire form so it holds whichever time backend
/// k8s-openapi is built with.
pub fn to_datetime(time: &Time) -> Option<DateTime<Utc>> {
    let value = serde_json::to_value(time).ok()?;
    DateTime::parse_from_rfc3339(value.as_str()?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Parses durations such as `10m`, `1h30m` or `500ms`.
///
/// Accepts the units `ms`, `s`, `m`, `h`, `d` and `w`. Amounts are integers.
pub fn parse_duration(value: &str) -> Option<TimeDelta> {
    let mut rest = value.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total = TimeDelta::zero();
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits == 0 {
            return None;
        }
        let amount: i64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => TimeDelta::try_milliseconds(amount)?,
            "s" => TimeDelta::try_seconds(amount)?,
            "m" => TimeDelta::try_minutes(amount)?,
            "h" => TimeDelta::try_hours(amount)?,
            "d" => TimeDelta::try_days(amount)?,
            "w" => TimeDelta::try_weeks(amount)?,
            _ => return None,
        };
        total = total.checked_add(&part)?;
        rest = &rest[unit_len..];
    }
    Some(total)
}
