//! Field derivation rules and row-to-document mappings.
//!
//! A [`RowMapping`] names the key column, the columns copied into each
//! document, and the [`DerivationRule`]s computing the remaining fields.

mod image_url;
mod mapping;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::models::{DocumentKey, GeoPoint, Value};

pub use image_url::{ImageUrlTemplate, DEFAULT_BASE_URL};
pub use mapping::{ColumnMapping, RowMapping};

/// Why a transform rejected its inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    #[error("input {index}: expected {expected}, found {found}")]
    Expected {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Invalid(String),
}

type Transform = Arc<dyn Fn(&[&Value]) -> Result<Value, DeriveError> + Send + Sync>;

/// A named, pure function from one or more column values of a row to one
/// document field.
#[derive(Clone)]
pub struct DerivationRule {
    field: String,
    inputs: Vec<String>,
    transform: Transform,
}

impl DerivationRule {
    /// Creates a rule from an arbitrary transform.
    ///
    /// The transform receives the input values in the order of `inputs`.
    pub fn new<F>(field: impl Into<String>, inputs: Vec<String>, transform: F) -> Self
    where
        F: Fn(&[&Value]) -> Result<Value, DeriveError> + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            inputs,
            transform: Arc::new(transform),
        }
    }

    /// First `chars` characters of a string column. Shorter strings are kept whole.
    pub fn prefix(field: impl Into<String>, column: impl Into<String>, chars: usize) -> Self {
        Self::new(field, vec![column.into()], move |values| {
            let text = expect_str(values, 0)?;
            Ok(Value::String(text.chars().take(chars).collect()))
        })
    }

    /// Combines two numeric columns into a [`GeoPoint`].
    pub fn geo_point(
        field: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self::new(field, vec![latitude.into(), longitude.into()], |values| {
            let latitude = expect_f64(values, 0)?;
            let longitude = expect_f64(values, 1)?;
            Ok(Value::GeoPoint(GeoPoint::new(latitude, longitude)))
        })
    }

    /// A one-element list holding the image URL for the row's id.
    ///
    /// Only a single image per row is produced even though the field is a
    /// list; there is no way yet to enumerate the images stored for an id.
    pub fn image_urls(
        field: impl Into<String>,
        id_column: impl Into<String>,
        template: ImageUrlTemplate,
        filename: impl Into<String>,
    ) -> Self {
        let filename = filename.into();
        Self::new(field, vec![id_column.into()], move |values| {
            let id = DocumentKey::from_value(values[0])
                .map_err(|e| DeriveError::Invalid(format!("image id: {}", e)))?;
            Ok(Value::Array(vec![Value::String(
                template.url(id.as_str(), &filename),
            )]))
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn apply(&self, values: &[&Value]) -> Result<Value, DeriveError> {
        (self.transform)(values)
    }
}

impl fmt::Debug for DerivationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationRule")
            .field("field", &self.field)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

fn expect_str<'a>(values: &[&'a Value], index: usize) -> Result<&'a str, DeriveError> {
    values[index].as_str().ok_or(DeriveError::Expected {
        index,
        expected: "string",
        found: values[index].type_name(),
    })
}

fn expect_f64(values: &[&Value], index: usize) -> Result<f64, DeriveError> {
    values[index].as_f64().ok_or(DeriveError::Expected {
        index,
        expected: "number",
        found: values[index].type_name(),
    })
}
