//! Serde helpers for numeric payload fields
//!
//! Clients send numbers either as JSON numbers or as numeric strings
//! (`"5"`). Both are accepted and parsed exactly once here; anything else is
//! a deserialization error that names the offending field.

use serde::{Deserialize, Deserializer, de::Error};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Numeric target types and their lossless conversions from JSON numbers
pub trait Numeric: FromStr + Sized {
    fn from_i64(value: i64) -> Option<Self>;
    fn from_f64(value: f64) -> Option<Self>;
}

impl Numeric for i32 {
    fn from_i64(value: i64) -> Option<Self> {
        i32::try_from(value).ok()
    }

    fn from_f64(value: f64) -> Option<Self> {
        (value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64)
            .then_some(value as i32)
    }
}

impl Numeric for i64 {
    fn from_i64(value: i64) -> Option<Self> {
        Some(value)
    }

    fn from_f64(value: f64) -> Option<Self> {
        (value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64)
            .then_some(value as i64)
    }
}

impl Numeric for f64 {
    fn from_i64(value: i64) -> Option<Self> {
        Some(value as f64)
    }

    fn from_f64(value: f64) -> Option<Self> {
        Some(value)
    }
}

fn convert<T: Numeric, E: Error>(raw: NumberOrString) -> Result<T, E> {
    match raw {
        NumberOrString::Int(n) => {
            T::from_i64(n).ok_or_else(|| E::custom(format!("number {} is out of range", n)))
        }
        NumberOrString::Float(f) => {
            T::from_f64(f).ok_or_else(|| E::custom(format!("expected an integer, found {}", f)))
        }
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid number: {:?}", s))),
    }
}

fn required<'de, D: Deserializer<'de>, T: Numeric>(deserializer: D) -> Result<T, D::Error> {
    convert(NumberOrString::deserialize(deserializer)?)
}

// `null` maps to None; pair with `#[serde(default)]` so an absent key does too
fn optional<'de, D: Deserializer<'de>, T: Numeric>(
    deserializer: D,
) -> Result<Option<T>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(convert)
        .transpose()
}

pub fn i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    required(deserializer)
}

pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    required(deserializer)
}

pub fn opt_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    optional(deserializer)
}

pub fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    optional(deserializer)
}

pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    optional(deserializer)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::i32")]
        sets: i32,
        #[serde(deserialize_with = "super::f64")]
        rest: f64,
        #[serde(default, deserialize_with = "super::opt_f64")]
        weight_lifted: Option<f64>,
    }

    #[test]
    fn test_accepts_numbers_and_numeric_strings() {
        let sample: Sample =
            serde_json::from_str(r#"{"sets": "5", "rest": 30, "weight_lifted": "12.5"}"#).unwrap();

        assert_eq!(sample.sets, 5);
        assert_eq!(sample.rest, 30.0);
        assert_eq!(sample.weight_lifted, Some(12.5));
    }

    #[test]
    fn test_optional_field_absent_or_null() {
        let absent: Sample = serde_json::from_str(r#"{"sets": 1, "rest": 1.5}"#).unwrap();
        let null: Sample =
            serde_json::from_str(r#"{"sets": 1, "rest": 1.5, "weight_lifted": null}"#).unwrap();

        assert_eq!(absent.weight_lifted, None);
        assert_eq!(null.weight_lifted, None);
    }

    #[test]
    fn test_rejects_non_numeric_text() {
        let err = serde_json::from_str::<Sample>(r#"{"sets": "five", "rest": 1}"#).unwrap_err();
        assert!(err.to_string().contains("invalid number"));
    }

    #[test]
    fn test_rejects_fractional_integer() {
        assert!(serde_json::from_str::<Sample>(r#"{"sets": 2.5, "rest": 1}"#).is_err());
    }
}
