//! Uniform front-matter values.
//!
//! YAML, TOML and JSON front matter all decode into [`FrontMatter`], a
//! `serde_json` object. The lenient casts below turn those values into the
//! typed page fields, and [`Param`] is the normalized shape stored in the
//! opaque parameter bag.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use serde_yaml::Value as YamlValue;

/// Decoded front matter, keyed by the author's original key spelling
pub type FrontMatter = serde_json::Map<String, Value>;

/// A normalized opaque parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A list of scalars, each converted to its string form
    Strings(Vec<String>),
    /// A list whose elements are maps, kept verbatim
    Structured(Vec<Value>),
    Map(FrontMatter),
    /// Anything without a dedicated shape (e.g. `null`)
    Other(Value),
}

impl Param {
    /// Normalize a raw front-matter value for the parameter bag
    pub fn from_value(value: &Value) -> Param {
        match value {
            Value::Bool(b) => Param::Bool(*b),
            Value::String(s) => Param::String(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Param::Int(i)
                } else {
                    Param::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::Array(items) => match items.first() {
                None => Param::Strings(Vec::new()),
                Some(Value::Object(_)) => Param::Structured(items.clone()),
                Some(_) => Param::Strings(items.iter().map(to_string).collect()),
            },
            Value::Object(map) => Param::Map(map.clone()),
            Value::Null => Param::Other(Value::Null),
        }
    }

    /// Lower-case string content, leaving other shapes untouched
    pub fn to_lowercase(&self) -> Param {
        match self {
            Param::String(s) => Param::String(s.to_lowercase()),
            Param::Strings(list) => Param::Strings(list.iter().map(|s| s.to_lowercase()).collect()),
            other => other.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Param::Bool(_) => "bool",
            Param::Int(_) => "integer",
            Param::Float(_) => "float",
            Param::String(_) => "string",
            Param::Strings(_) => "string list",
            Param::Structured(_) => "structured list",
            Param::Map(_) => "map",
            Param::Other(v) if v.is_null() => "null",
            Param::Other(_) => "unknown",
        }
    }

    /// Back to the uniform value representation
    pub fn to_value(&self) -> Value {
        match self {
            Param::Bool(b) => Value::Bool(*b),
            Param::Int(i) => Value::from(*i),
            Param::Float(f) => Value::from(*f),
            Param::String(s) => Value::String(s.clone()),
            Param::Strings(list) => Value::from(list.clone()),
            Param::Structured(items) => Value::Array(items.clone()),
            Param::Map(map) => Value::Object(map.clone()),
            Param::Other(v) => v.clone(),
        }
    }
}

/// Convert a YAML value to a JSON value
pub fn yaml_to_json_value(value: &YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(f) = n.as_f64() {
                serde_json::json!(f)
            } else {
                Value::String(n.to_string())
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(seq) => Value::Array(seq.iter().map(yaml_to_json_value).collect()),
        YamlValue::Mapping(map) => {
            let obj: FrontMatter = map
                .iter()
                .filter_map(|(k, v)| {
                    // YAML allows scalar keys of any type; keep their string form
                    let key = match k {
                        YamlValue::String(s) => s.clone(),
                        YamlValue::Number(n) => n.to_string(),
                        YamlValue::Bool(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((key, yaml_to_json_value(v)))
                })
                .collect();
            Value::Object(obj)
        }
        YamlValue::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

/// Convert a TOML value to a JSON value; datetimes become their RFC 3339 text
pub fn toml_to_json_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json_value).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json_value(v)))
                .collect(),
        ),
    }
}

/// Lenient string conversion; `null` and containers become empty strings
pub fn to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Lenient string conversion that reports values without a string form
pub fn try_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Bool(_) | Value::Number(_) => Some(to_string(value)),
        _ => None,
    }
}

/// Lenient boolean conversion
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "t" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Lenient integer conversion; floats truncate, unparsable text is zero
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Lenient float conversion
pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Lenient list conversion; a single string is split on whitespace
pub fn to_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(s) => s.split_whitespace().map(String::from).collect(),
        _ => Vec::new(),
    }
}

/// Strict list conversion used where the shape decides behavior
pub fn try_to_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(try_to_string).collect(),
        _ => None,
    }
}

/// Parse a date value.
/// Supports: RFC 3339, RFC 2822, YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, YYYY-MM-DDTHH:MM:SS
pub fn to_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_string(s.trim()),
        _ => None,
    }
}

fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    // ISO 8601 / RFC 3339 (2024-01-15T10:30:00Z)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // RFC 2822 (Mon, 15 Jan 2024 10:30:00 +0000)
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // YYYY-MM-DD (2024-01-15)
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let ndt = nd.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(ndt, Utc));
    }

    // YYYY-MM-DD HH:MM:SS and YYYY-MM-DDTHH:MM:SS
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_param_scalars_pass_through() {
        assert_eq!(Param::from_value(&json!(true)), Param::Bool(true));
        assert_eq!(Param::from_value(&json!("Hi")), Param::String("Hi".into()));
        assert_eq!(Param::from_value(&json!(3)), Param::Int(3));
        assert_eq!(Param::from_value(&json!(1.5)), Param::Float(1.5));
    }

    #[test]
    fn test_param_mixed_list_becomes_strings() {
        let param = Param::from_value(&json!(["a", 1, true]));
        assert_eq!(
            param,
            Param::Strings(vec!["a".into(), "1".into(), "true".into()])
        );
    }

    #[test]
    fn test_param_structured_list_is_preserved() {
        let raw = json!([{"name": "x"}, {"name": "y"}]);
        match Param::from_value(&raw) {
            Param::Structured(items) => assert_eq!(Value::Array(items), raw),
            other => panic!("expected structured list, got {other:?}"),
        }
    }

    #[test]
    fn test_param_empty_list_is_empty_strings() {
        assert_eq!(Param::from_value(&json!([])), Param::Strings(Vec::new()));
    }

    #[test]
    fn test_param_lowercase_only_touches_text() {
        assert_eq!(
            Param::String("MiXeD".into()).to_lowercase(),
            Param::String("mixed".into())
        );
        assert_eq!(Param::Int(7).to_lowercase(), Param::Int(7));
    }

    #[test]
    fn test_casts() {
        assert_eq!(to_string(&json!(12)), "12");
        assert!(to_bool(&json!("true")));
        assert!(!to_bool(&json!("nope")));
        assert_eq!(to_int(&json!("42")), 42);
        assert_eq!(to_int(&json!(3.9)), 3);
        assert_eq!(to_string_list(&json!("a b")), vec!["a", "b"]);
        assert_eq!(try_to_string_list(&json!([{"a": 1}])), None);
    }

    #[test]
    fn test_parse_dates() {
        assert!(to_date(&json!("2024-01-15")).is_some());
        assert!(to_date(&json!("2024-01-15T10:30:00Z")).is_some());
        assert!(to_date(&json!("2024-01-15T10:30:00+02:00")).is_some());
        assert!(to_date(&json!("2024-01-15 10:30:00")).is_some());
        assert!(to_date(&json!("2024-01-15T10:30:00")).is_some());
        assert!(to_date(&json!("15/01/2024")).is_none());
        assert!(to_date(&json!(12)).is_none());

        let date = to_date(&json!("2024-01-15")).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));
    }

    #[test]
    fn test_yaml_and_toml_conversion() {
        let yaml: YamlValue = serde_yaml::from_str("title: Hi\ntags: [a, b]\n1: one").unwrap();
        let json = yaml_to_json_value(&yaml);
        assert_eq!(json["title"], json!("Hi"));
        assert_eq!(json["tags"], json!(["a", "b"]));
        assert_eq!(json["1"], json!("one"));

        let table: toml::Table = toml::from_str("date = 2024-01-15T10:30:00Z\nn = 3").unwrap();
        let json = toml_to_json_value(&toml::Value::Table(table));
        assert_eq!(json["n"], json!(3));
        assert!(to_date(&json["date"]).is_some());
    }
}
