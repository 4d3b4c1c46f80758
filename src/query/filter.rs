//! Bool filter model
//!
//! Immutable `term`/`terms` filter values that serialize to the engine's
//! filter-clause shape. Constructed once per query and discarded after the
//! request.

use crate::types::{JsonObject, JsonValue};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single conjunctive filter clause
///
/// Serializes to the engine's bool-filter shape:
/// - `Term` → `{"term": {"<field>": <value>}}`
/// - `Terms` → `{"terms": {"<field>": [<values>]}}`
///
/// `field` must be non-empty and `values` should be non-empty; both are caller
/// responsibilities. An empty `values` slice still serializes deterministically
/// (as an empty array) rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolFilter {
    /// Exact match on a single value
    Term {
        /// Document field to match
        field: String,
        /// Value the field must equal
        value: JsonValue,
    },
    /// Match any of the given values
    Terms {
        /// Document field to match
        field: String,
        /// Values the field may equal
        values: Vec<JsonValue>,
    },
}

impl BoolFilter {
    /// Create an exact-match filter
    pub fn term(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an any-of filter
    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The field this filter applies to
    pub fn field(&self) -> &str {
        match self {
            Self::Term { field, .. } | Self::Terms { field, .. } => field,
        }
    }
}

impl Serialize for BoolFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut outer = serializer.serialize_map(Some(1))?;
        match self {
            Self::Term { field, value } => {
                let mut inner = JsonObject::new();
                inner.insert(field.clone(), value.clone());
                outer.serialize_entry("term", &inner)?;
            }
            Self::Terms { field, values } => {
                let mut inner = JsonObject::new();
                inner.insert(field.clone(), JsonValue::Array(values.clone()));
                outer.serialize_entry("terms", &inner)?;
            }
        }
        outer.end()
    }
}
