//! Canonical document keys.

use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

use super::value::Value;

/// Why a value could not be turned into a document key.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("key value is null")]
    Null,

    #[error("float {0} has a fractional part")]
    Fractional(f64),

    #[error("{0} values cannot be used as keys")]
    Unsupported(&'static str),

    #[error("key is empty")]
    Empty,

    #[error("key '{0}' is not a valid document id")]
    Invalid(String),
}

/// A document key in its canonical string form.
///
/// Integers render as plain decimal. Floats are accepted when integral,
/// since integer columns with gaps come back from tabular readers as floats.
/// Strings are trimmed and must be a legal document id: no `/`, not `.` or
/// `..`, and not of the reserved `__name__` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn from_value(value: &Value) -> Result<Self, KeyError> {
        match value {
            Value::Null => Err(KeyError::Null),
            Value::Integer(i) => Ok(Self(i.to_string())),
            Value::Float(f) => {
                if f.fract() != 0.0 || !f.is_finite() {
                    return Err(KeyError::Fractional(*f));
                }
                if *f < i64::MIN as f64 || *f >= i64::MAX as f64 {
                    return Err(KeyError::Invalid(f.to_string()));
                }
                Ok(Self((*f as i64).to_string()))
            }
            Value::String(s) => Self::parse(s),
            other => Err(KeyError::Unsupported(other.type_name())),
        }
    }

    /// Validates a textual key.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        let reserved = key.len() > 4 && key.starts_with("__") && key.ends_with("__");
        if key.contains('/') || key == "." || key == ".." || reserved {
            return Err(KeyError::Invalid(key.to_string()));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for DocumentKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DocumentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    #[test]
    fn test_integer_keys_are_decimal() {
        let key = DocumentKey::from_value(&Value::Integer(1)).unwrap();
        assert_eq!(key.as_str(), "1");
        let key = DocumentKey::from_value(&Value::Integer(88)).unwrap();
        assert_eq!(key.as_str(), "88");
    }

    #[test]
    fn test_integral_float_keys() {
        let key = DocumentKey::from_value(&Value::Float(12.0)).unwrap();
        assert_eq!(key.as_str(), "12");
    }

    #[test]
    fn test_fractional_float_rejected() {
        let err = DocumentKey::from_value(&Value::Float(1.5)).unwrap_err();
        assert_eq!(err, KeyError::Fractional(1.5));
    }

    #[test]
    fn test_string_keys_are_trimmed() {
        let key = DocumentKey::from_value(&Value::from(" bangai-1 ")).unwrap();
        assert_eq!(key.as_str(), "bangai-1");
    }

    #[test]
    fn test_invalid_string_keys() {
        assert_eq!(DocumentKey::parse(""), Err(KeyError::Empty));
        assert!(matches!(DocumentKey::parse("a/b"), Err(KeyError::Invalid(_))));
        assert!(matches!(DocumentKey::parse(".."), Err(KeyError::Invalid(_))));
        assert!(matches!(
            DocumentKey::parse("__name__"),
            Err(KeyError::Invalid(_))
        ));
    }

    #[test]
    fn test_null_and_composite_rejected() {
        assert_eq!(DocumentKey::from_value(&Value::Null), Err(KeyError::Null));
        assert_eq!(
            DocumentKey::from_value(&Value::GeoPoint(GeoPoint::new(0.0, 0.0))),
            Err(KeyError::Unsupported("geopoint"))
        );
    }
}
