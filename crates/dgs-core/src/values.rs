//! Value representations produced by the data generator.
//!
//! `Value` is the raw, database-agnostic value held in a generated row.
//! Its `Display` form is the PostgreSQL text input format, which is what
//! both template composition and the text-format statement parameters use.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{self, Write as _};
use std::time::Duration;
use uuid::Uuid;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Point {
    /// Well-known text; x is the longitude.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.lon, self.lat)
    }
}

/// Raw generated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// String value
    String(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// UUID value
    Uuid(Uuid),

    /// Instant in UTC
    Timestamp(DateTime<Utc>),

    /// Duration with whole second precision
    Interval(Duration),

    /// Geographic point
    Point(Point),

    /// Ordered array of values
    Array(Vec<Value>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Apply a column format to this value.
    ///
    /// Timestamps are rendered with the strftime layout, falling back to the
    /// plain text form when the layout is invalid. Any other value has each
    /// `{}` in the format replaced by its text form.
    pub fn format_with(&self, format: &str) -> String {
        match self {
            Self::Timestamp(ts) => {
                let mut out = String::new();
                match write!(out, "{}", ts.format(format)) {
                    Ok(()) => out,
                    Err(_) => self.to_string(),
                }
            }
            other => format.replace("{}", &other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Bytes(bytes) => {
                f.write_str("\\x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Timestamp(ts) => f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Interval(d) => write!(f, "PT{}S", d.as_secs()),
            Self::Point(p) => write!(f, "{p}"),
            Self::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_array_element(f, item)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Array literal elements: scalars bare, text-like values double quoted.
fn write_array_element(f: &mut fmt::Formatter<'_>, item: &Value) -> fmt::Result {
    match item {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Array(_) => {
            write!(f, "{item}")
        }
        other => {
            f.write_str("\"")?;
            for c in other.to_string().chars() {
                if c == '"' || c == '\\' {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }
            f.write_str("\"")
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(42).as_i64(), Some(42));
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Bool(true).as_i64(), None);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Bytes(vec![0x00, 0xab, 0x10]).to_string(), "\\x00ab10");
        assert_eq!(Value::Interval(Duration::from_secs(90)).to_string(), "PT90S");

        let ts = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(Value::Timestamp(ts).to_string(), "2021-03-04T05:06:07Z");
    }

    #[test]
    fn test_display_point_is_lon_lat() {
        let p = Value::Point(Point::new(51.5, -0.25));
        assert_eq!(p.to_string(), "POINT(-0.25 51.5)");
    }

    #[test]
    fn test_display_array_literal() {
        let arr = Value::Array(vec![
            Value::from("plain"),
            Value::from("with \"quote\""),
            Value::Int(3),
            Value::Null,
        ]);
        assert_eq!(arr.to_string(), r#"{"plain","with \"quote\"",3,NULL}"#);
    }

    #[test]
    fn test_format_with() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(Value::Timestamp(ts).format_with("%Y/%m/%d"), "2020/01/02");
        assert_eq!(Value::Int(5).format_with("item-{}"), "item-5");
    }
}
