//! Typed literal values.
//!
//! Every constant carries a native value and round-trips through its
//! canonical wire form: `Constant::parse_literal(&c.to_literal()) == c`
//! for all supported kinds.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::types::ExprType;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2}(\.\d+)?)?$").unwrap());

static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:\d{2})$").unwrap()
});

static INTERVAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2}T[0-9:.]+(?:Z|[+-]\d{2}:\d{2}))/(\d{4}-\d{2}-\d{2}T[0-9:.]+(?:Z|[+-]\d{2}:\d{2}))$",
    )
    .unwrap()
});

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .unwrap()
});

/// Accepted geometry kinds inside a `geography'...'` literal.
static WKT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)(POINT|LINESTRING|POLYGON|MULTIPOINT|MULTILINESTRING|MULTIPOLYGON|GEOMETRYCOLLECTION)\s*(Z|ZM|M)?\s*\(.*\)$")
        .unwrap()
});

// =============================================================================
// Constant
// =============================================================================

/// A typed literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
    Duration(DurationValue),
    Interval(IntervalValue),
    Geometry(GeometryValue),
}

impl Constant {
    /// The logical type of this constant.
    ///
    /// `null` has no type of its own; it binds to any parameter.
    pub fn expr_type(&self) -> ExprType {
        match self {
            Constant::Null => ExprType::Any,
            Constant::Bool(_) => ExprType::Bool,
            Constant::Int(_) => ExprType::Int,
            Constant::Double(_) => ExprType::Double,
            Constant::String(_) => ExprType::String,
            Constant::Date(_) => ExprType::Date,
            Constant::Time(_) => ExprType::Time,
            Constant::DateTime(_) => ExprType::DateTime,
            Constant::Duration(_) => ExprType::Duration,
            Constant::Interval(_) => ExprType::Interval,
            Constant::Geometry(_) => ExprType::Geometry,
        }
    }

    /// Serialize to the canonical wire form.
    pub fn to_literal(&self) -> String {
        match self {
            Constant::Null => "null".into(),
            Constant::Bool(b) => b.to_string(),
            Constant::Int(n) => n.to_string(),
            Constant::Double(d) => {
                let mut buffer = ryu::Buffer::new();
                buffer.format(*d).to_string()
            }
            Constant::String(s) => format!("'{}'", s.replace('\'', "''")),
            Constant::Date(d) => d.format("%Y-%m-%d").to_string(),
            Constant::Time(t) => format_time(*t),
            Constant::DateTime(dt) => format_date_time(dt),
            Constant::Duration(d) => format!("duration'{}'", d),
            Constant::Interval(iv) => {
                format!("{}/{}", format_date_time(&iv.start), format_date_time(&iv.end))
            }
            Constant::Geometry(g) => format!("geography'{}'", g.wkt),
        }
    }

    /// Parse a literal from its wire form, choosing the concrete kind by the
    /// surface lexical shape of the text.
    pub fn parse_literal(text: &str) -> Result<Constant> {
        let trimmed = text.trim();
        if trimmed == "null" {
            return Ok(Constant::Null);
        }
        if trimmed == "true" {
            return Ok(Constant::Bool(true));
        }
        if trimmed == "false" {
            return Ok(Constant::Bool(false));
        }
        if let Some(inner) = quoted_body(trimmed, "'") {
            return Ok(Constant::String(inner.replace("''", "'")));
        }
        if let Some(inner) = quoted_body(trimmed, "geography'") {
            return GeometryValue::from_wkt(inner).map(Constant::Geometry);
        }
        if let Some(inner) = quoted_body(trimmed, "duration'") {
            return DurationValue::parse_iso(inner).map(Constant::Duration);
        }
        if let Some(c) = Constant::parse_temporal(trimmed)? {
            return Ok(c);
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(Constant::Int(n));
        }
        if let Ok(d) = trimmed.parse::<f64>() {
            return Ok(Constant::Double(d));
        }
        Err(Error::invalid_literal(trimmed, "unrecognized literal form"))
    }

    /// Parse a bare temporal literal: date, time-of-day, date-time, or
    /// `start/end` interval. Returns `Ok(None)` for non-temporal text.
    pub fn parse_temporal(text: &str) -> Result<Option<Constant>> {
        if let Some(caps) = INTERVAL_RE.captures(text) {
            let start = parse_date_time(&caps[1])?;
            let end = parse_date_time(&caps[2])?;
            return Ok(Some(Constant::Interval(IntervalValue { start, end })));
        }
        if DATETIME_RE.is_match(text) {
            return parse_date_time(text).map(|dt| Some(Constant::DateTime(dt)));
        }
        if DATE_RE.is_match(text) {
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|e| Error::invalid_literal(text, e.to_string()))?;
            return Ok(Some(Constant::Date(date)));
        }
        if TIME_RE.is_match(text) {
            let format = if text.len() == 5 { "%H:%M" } else { "%H:%M:%S%.f" };
            let time = NaiveTime::parse_from_str(text, format)
                .map_err(|e| Error::invalid_literal(text, e.to_string()))?;
            return Ok(Some(Constant::Time(time)));
        }
        Ok(None)
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_literal())
    }
}

/// Strip `prefix` + trailing `'` from a quoted literal, returning the body.
fn quoted_body<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    // A bare string literal starts with a quote; wrapped forms carry a
    // keyword prefix ending in the opening quote.
    text.strip_prefix(prefix)?.strip_suffix('\'')
}

fn parse_date_time(text: &str) -> Result<DateTime<FixedOffset>> {
    // RFC 3339 requires seconds; the wire format allows omitting them.
    let patched;
    let candidate = if text.len() >= 17 && text.as_bytes()[16] != b':' {
        patched = format!("{}:00{}", &text[..16], &text[16..]);
        patched.as_str()
    } else {
        text
    };
    DateTime::parse_from_rfc3339(candidate).map_err(|e| Error::invalid_literal(text, e.to_string()))
}

fn format_date_time(dt: &DateTime<FixedOffset>) -> String {
    if dt.offset().local_minus_utc() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string()
    }
}

fn format_time(t: NaiveTime) -> String {
    if t.nanosecond() == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%H:%M:%S%.f").to_string()
    }
}

// =============================================================================
// Duration
// =============================================================================

/// An ISO-8601 period. Month and sub-month components are kept apart
/// because months have no fixed length in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationValue {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanos: i64,
}

impl DurationValue {
    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            ..Self::default()
        }
    }

    /// Parse an ISO-8601 period string such as `P1Y2M3DT4H5M6.5S`.
    pub fn parse_iso(text: &str) -> Result<DurationValue> {
        let caps = DURATION_RE
            .captures(text)
            .ok_or_else(|| Error::invalid_literal(text, "not an ISO-8601 duration"))?;
        let sign: i64 = if caps.get(1).is_some() { -1 } else { 1 };
        let int = |idx: usize| -> i64 {
            caps.get(idx)
                .map(|m| m.as_str().parse::<i64>().unwrap_or(0))
                .unwrap_or(0)
        };
        let years = int(2);
        let months = int(3);
        let weeks = int(4);
        let days = int(5);
        let hours = int(6);
        let minutes = int(7);
        let (whole_secs, nanos) = match caps.get(8) {
            Some(m) => {
                let s: f64 = m
                    .as_str()
                    .parse()
                    .map_err(|_| Error::invalid_literal(text, "bad seconds component"))?;
                (s.trunc() as i64, ((s.fract() * 1e9).round()) as i64)
            }
            None => (0, 0),
        };
        let value = DurationValue {
            months: sign * (years * 12 + months),
            days: sign * (weeks * 7 + days),
            seconds: sign * (hours * 3600 + minutes * 60 + whole_secs),
            nanos: sign * nanos,
        };
        if value == DurationValue::default() && !text.contains(['D', 'W', 'Y', 'T']) {
            // "P" and "PM"-style shells slip through the optional groups.
            return Err(Error::invalid_literal(text, "empty duration"));
        }
        Ok(value)
    }

    pub fn negated(&self) -> DurationValue {
        DurationValue {
            months: -self.months,
            days: -self.days,
            seconds: -self.seconds,
            nanos: -self.nanos,
        }
    }

    /// Shift a point in time forward by this duration.
    pub fn add_to(&self, dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let shifted = add_months(dt, self.months);
        shifted
            + chrono::Duration::days(self.days)
            + chrono::Duration::seconds(self.seconds)
            + chrono::Duration::nanoseconds(self.nanos)
    }

    /// Shift a point in time backward by this duration.
    pub fn subtract_from(&self, dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        self.negated().add_to(dt)
    }

    /// The elapsed time between two instants, as a seconds-grained duration.
    pub fn between(end: DateTime<FixedOffset>, start: DateTime<FixedOffset>) -> DurationValue {
        let delta = end.signed_duration_since(start);
        DurationValue {
            months: 0,
            days: 0,
            seconds: delta.num_seconds(),
            nanos: (delta - chrono::Duration::seconds(delta.num_seconds()))
                .num_nanoseconds()
                .unwrap_or(0),
        }
    }
}

impl std::fmt::Display for DurationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let negative = self.months < 0 || self.days < 0 || self.seconds < 0 || self.nanos < 0;
        if negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        let months = self.months.abs();
        let days = self.days.abs();
        let mut seconds = self.seconds.abs();
        let nanos = self.nanos.abs();
        if months >= 12 {
            write!(f, "{}Y", months / 12)?;
        }
        if months % 12 != 0 {
            write!(f, "{}M", months % 12)?;
        }
        if days != 0 {
            write!(f, "{}D", days)?;
        }
        let hours = seconds / 3600;
        seconds %= 3600;
        let minutes = seconds / 60;
        seconds %= 60;
        if hours != 0 || minutes != 0 || seconds != 0 || nanos != 0 {
            write!(f, "T")?;
            if hours != 0 {
                write!(f, "{}H", hours)?;
            }
            if minutes != 0 {
                write!(f, "{}M", minutes)?;
            }
            if nanos != 0 {
                let frac = format!("{:09}", nanos);
                write!(f, "{}.{}S", seconds, frac.trim_end_matches('0'))?;
            } else if seconds != 0 {
                write!(f, "{}S", seconds)?;
            }
        } else if months == 0 && days == 0 {
            write!(f, "T0S")?;
        }
        Ok(())
    }
}

/// Calendar-aware month shift; the day of month clamps to the target
/// month's length.
fn add_months(dt: DateTime<FixedOffset>, months: i64) -> DateTime<FixedOffset> {
    if months == 0 {
        return dt;
    }
    let total = dt.year() as i64 * 12 + dt.month0() as i64 + months;
    let year = total.div_euclid(12) as i32;
    let month0 = total.rem_euclid(12) as u32;
    let day = dt.day().min(days_in_month(year, month0 + 1));
    let date = NaiveDate::from_ymd_opt(year, month0 + 1, day).expect("valid shifted date");
    dt.offset()
        .from_local_datetime(&date.and_time(dt.time()))
        .single()
        .unwrap_or(dt)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

// =============================================================================
// Interval
// =============================================================================

/// A closed-start, open-end span between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalValue {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl IntervalValue {
    /// Shift both endpoints by a duration.
    pub fn shift(&self, d: &DurationValue) -> IntervalValue {
        IntervalValue {
            start: d.add_to(self.start),
            end: d.add_to(self.end),
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// A geometry literal carried as WKT, the form it arrives in on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryValue {
    pub wkt: String,
}

impl GeometryValue {
    /// Validate and wrap a WKT body taken from a `geography'...'` literal.
    pub fn from_wkt(wkt: &str) -> Result<GeometryValue> {
        let trimmed = wkt.trim();
        if !WKT_RE.is_match(trimmed) {
            return Err(Error::invalid_literal(wkt, "not a supported WKT geometry"));
        }
        Ok(GeometryValue {
            wkt: trimmed.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(text: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(text).unwrap()
    }

    #[test]
    fn test_round_trip_every_kind() {
        let constants = vec![
            Constant::Bool(true),
            Constant::Int(-42),
            Constant::Double(2.5),
            Constant::String("it's".into()),
            Constant::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            Constant::Time(NaiveTime::from_hms_opt(13, 45, 30).unwrap()),
            Constant::DateTime(dt("2024-01-01T00:00:00Z")),
            Constant::Duration(DurationValue::parse_iso("P1Y2M3DT4H5M6S").unwrap()),
            Constant::Interval(IntervalValue {
                start: dt("2024-01-01T00:00:00Z"),
                end: dt("2024-01-02T00:00:00Z"),
            }),
            Constant::Geometry(GeometryValue::from_wkt("POINT (30 10)").unwrap()),
        ];
        for c in constants {
            let text = c.to_literal();
            let parsed = Constant::parse_literal(&text)
                .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e));
            assert_eq!(parsed, c, "round trip through {:?}", text);
        }
    }

    #[test]
    fn test_parse_literal_classification() {
        assert_eq!(Constant::parse_literal("5").unwrap(), Constant::Int(5));
        assert_eq!(
            Constant::parse_literal("5.5").unwrap(),
            Constant::Double(5.5)
        );
        assert_eq!(
            Constant::parse_literal("'abc'").unwrap(),
            Constant::String("abc".into())
        );
        assert!(matches!(
            Constant::parse_literal("2024-06-01").unwrap(),
            Constant::Date(_)
        ));
        assert!(matches!(
            Constant::parse_literal("2024-06-01T12:00:00Z").unwrap(),
            Constant::DateTime(_)
        ));
        assert!(matches!(
            Constant::parse_literal("2024-06-01T00:00:00Z/2024-07-01T00:00:00Z").unwrap(),
            Constant::Interval(_)
        ));
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        assert!(GeometryValue::from_wkt("CIRCLE (0 0 5)").is_err());
        assert!(Constant::parse_literal("geography'CIRCLE (0 0 5)'").is_err());
    }

    #[test]
    fn test_duration_parse_components() {
        let d = DurationValue::parse_iso("P1DT2H30M").unwrap();
        assert_eq!(d.months, 0);
        assert_eq!(d.days, 1);
        assert_eq!(d.seconds, 2 * 3600 + 30 * 60);

        let d = DurationValue::parse_iso("-PT15S").unwrap();
        assert_eq!(d.seconds, -15);

        assert!(DurationValue::parse_iso("1D").is_err());
    }

    #[test]
    fn test_duration_round_trip_against_instant() {
        let instant = dt("2024-03-15T06:30:00Z");
        for iso in ["PT1S", "PT2H30M", "PT26H", "-PT45M"] {
            let d = DurationValue::parse_iso(iso).unwrap();
            let shifted = d.add_to(instant);
            assert_eq!(DurationValue::between(shifted, instant), d, "{}", iso);
        }
    }

    #[test]
    fn test_add_months_clamps_day() {
        let d = DurationValue {
            months: 1,
            ..DurationValue::default()
        };
        let end_of_jan = dt("2023-01-31T12:00:00Z");
        let shifted = d.add_to(end_of_jan);
        assert_eq!(shifted, dt("2023-02-28T12:00:00Z"));
    }

    #[test]
    fn test_interval_shift() {
        let iv = IntervalValue {
            start: dt("2024-01-01T00:00:00Z"),
            end: dt("2024-01-02T00:00:00Z"),
        };
        let d = DurationValue::parse_iso("P1D").unwrap();
        let shifted = iv.shift(&d);
        assert_eq!(shifted.start, dt("2024-01-02T00:00:00Z"));
        assert_eq!(shifted.end, dt("2024-01-03T00:00:00Z"));
    }

    #[test]
    fn test_string_escaping() {
        let c = Constant::String("o'clock".into());
        assert_eq!(c.to_literal(), "'o''clock'");
        assert_eq!(Constant::parse_literal("'o''clock'").unwrap(), c);
    }
}
