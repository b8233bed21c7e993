//! Dynamic snapshot value type.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::Deserializer;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde::Deserialize;

/// Textual form for calendar dates (ISO-8601 calendar date).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Textual form for times of day (ISO-8601 local time).
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
/// Textual form for combined date-times (ISO-8601 local date-time).
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A dynamic property value.
///
/// This type represents any value a node property can hold. Values are
/// flat: a `Tuple` may nest scalars and lists, but never node references.
/// Relationships are kept out of the property map entirely.
///
/// Date and time variants render as fixed ISO-8601 textual forms in the
/// snapshot and are recovered exactly on load.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (full i64 range).
    Integer(i64),
    /// Floating-point number.
    Number(f64),
    /// Text string (UTF-8).
    Text(String),
    /// Calendar date without a time zone.
    Date(NaiveDate),
    /// Time of day without a time zone.
    Time(NaiveTime),
    /// Combined calendar date and time of day.
    DateTime(NaiveDateTime),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Embedded tuple: ordered name/value pairs.
    Tuple(Vec<(String, Value)>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a floating-point number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a calendar date, if it is one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get this value as a time of day, if it is one.
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Get this value as a date-time, if it is one.
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Get this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get this value as a tuple, if it is one.
    pub fn as_tuple(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Tuple(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up a slot in this tuple value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Tuple(pairs) => pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Interprets a snapshot string, recovering typed temporal values.
    ///
    /// Strings that exactly match the fixed date-time, date, or time forms
    /// decode to the corresponding variant; everything else stays text.
    pub fn from_snapshot_text(text: &str) -> Value {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT) {
            return Value::DateTime(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
            return Value::Date(d);
        }
        if let Ok(t) = NaiveTime::parse_from_str(text, TIME_FORMAT) {
            return Value::Time(t);
        }
        Value::Text(text.to_string())
    }

    /// Renders the snapshot text for temporal variants.
    fn snapshot_text(&self) -> Option<String> {
        match self {
            Value::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
            Value::Time(t) => Some(t.format(TIME_FORMAT).to_string()),
            Value::DateTime(dt) => Some(dt.format(DATE_TIME_FORMAT).to_string()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    /// Renders the value as its snapshot text.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
                write!(f, "{}", self.snapshot_text().unwrap_or_default())
            }
            Value::List(_) | Value::Tuple(_) => {
                let text = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
                write!(f, "{text}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
                // snapshot_text is Some for all temporal variants
                serializer.serialize_str(&self.snapshot_text().unwrap_or_default())
            }
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Tuple(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (name, value) in pairs {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from(raw))
    }
}

impl From<serde_json::Value> for Value {
    fn from(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::from_snapshot_text(&s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => {
                Value::Tuple(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(42).as_bool(), None);

        assert_eq!(Value::Integer(42).as_integer(), Some(42));
        assert_eq!(Value::Text("42".to_string()).as_integer(), None);

        assert_eq!(Value::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Value::Text("hello".to_string()).as_text(), Some("hello"));
    }

    #[test]
    fn tuple_get() {
        let tuple = Value::Tuple(vec![
            ("street".to_string(), Value::Text("Main St".to_string())),
            ("number".to_string(), Value::Integer(12)),
        ]);

        assert_eq!(tuple.get("street"), Some(&Value::Text("Main St".to_string())));
        assert_eq!(tuple.get("number"), Some(&Value::Integer(12)));
        assert_eq!(tuple.get("missing"), None);
    }

    #[test]
    fn date_renders_iso() {
        let date = NaiveDate::from_ymd_opt(2015, 9, 14).unwrap();
        let rendered = serde_json::to_string(&Value::Date(date)).unwrap();
        assert_eq!(rendered, "\"2015-09-14\"");
    }

    #[test]
    fn time_renders_iso() {
        let time = NaiveTime::from_hms_opt(13, 45, 30).unwrap();
        let rendered = serde_json::to_string(&Value::Time(time)).unwrap();
        assert_eq!(rendered, "\"13:45:30\"");
    }

    #[test]
    fn snapshot_text_recovers_temporal_variants() {
        assert_eq!(
            Value::from_snapshot_text("2015-09-14"),
            Value::Date(NaiveDate::from_ymd_opt(2015, 9, 14).unwrap())
        );
        assert_eq!(
            Value::from_snapshot_text("13:45:30"),
            Value::Time(NaiveTime::from_hms_opt(13, 45, 30).unwrap())
        );
        assert_eq!(
            Value::from_snapshot_text("2015-09-14T13:45:30"),
            Value::DateTime(
                NaiveDate::from_ymd_opt(2015, 9, 14)
                    .unwrap()
                    .and_hms_opt(13, 45, 30)
                    .unwrap()
            )
        );
    }

    #[test]
    fn arbitrary_text_stays_text() {
        assert_eq!(
            Value::from_snapshot_text("not a date"),
            Value::Text("not a date".to_string())
        );
        // Partial matches must not be promoted
        assert_eq!(
            Value::from_snapshot_text("2015-09"),
            Value::Text("2015-09".to_string())
        );
    }

    #[test]
    fn iso_shaped_text_reloads_as_a_temporal() {
        // JSON has no temporal type, so a stored Text that exactly matches
        // an ISO form comes back typed. Lossy by construction.
        let text = serde_json::to_string(&Value::Text("2015-09-14".to_string())).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            back,
            Value::Date(NaiveDate::from_ymd_opt(2015, 9, 14).unwrap())
        );
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i64), Value::Integer(42));
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from(1.5f64), Value::Number(1.5));
        assert_eq!(Value::from("hello"), Value::Text("hello".to_string()));
        assert_eq!(Value::from(()), Value::Null);
        assert_eq!(
            Value::from(vec![1i64, 2, 3]),
            Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
    }

    #[test]
    fn integer_json_roundtrip() {
        let text = serde_json::to_string(&Value::Integer(7)).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, Value::Integer(7));
    }

    #[test]
    fn tuple_json_roundtrip() {
        let tuple = Value::Tuple(vec![
            ("city".to_string(), Value::Text("Lisbon".to_string())),
            ("zip".to_string(), Value::Integer(1000)),
        ]);
        let text = serde_json::to_string(&tuple).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        // serde_json sorts object keys, so compare slot-wise
        assert_eq!(back.get("city"), tuple.get("city"));
        assert_eq!(back.get("zip"), tuple.get("zip"));
    }
}
