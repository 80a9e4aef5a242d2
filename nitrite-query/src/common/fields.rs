use crate::collection::{Document, NitriteId};
use crate::common::NAME_SEPARATOR;
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use crate::common::Value;

/// An ordered, non-empty list of field paths.
///
/// Used as the key of an index: the order of the names is the order in
/// which a compound index nests its values.
///
/// ```ignore
/// let fields = Fields::with_names(vec!["last_name", "age"])?;
/// assert_eq!(fields.encoded_names(), "last_name|age");
/// assert!(fields.starts_with(&Fields::with_names(vec!["last_name"])?));
/// ```
#[derive(Clone, Debug, Eq)]
pub struct Fields {
    inner: Arc<FieldsInner>,
}

#[derive(Debug, Eq, PartialEq)]
struct FieldsInner {
    field_names: Vec<String>,
}

impl Fields {
    /// Creates a field list. Names must be non-empty and distinct.
    pub fn with_names(field_names: Vec<&str>) -> NitriteResult<Fields> {
        if field_names.is_empty() {
            log::error!("Field names cannot be empty");
            return Err(NitriteError::new(
                "Field names cannot be empty",
                ErrorKind::ValidationError,
            ));
        }

        let mut seen = HashSet::with_capacity(field_names.len());
        for name in &field_names {
            if name.is_empty() {
                log::error!("Field name cannot be empty");
                return Err(NitriteError::new(
                    "Field name cannot be empty",
                    ErrorKind::InvalidFieldName,
                ));
            }
            if !seen.insert(*name) {
                log::error!("Field {} is repeated", name);
                return Err(NitriteError::new(
                    &format!("Field {} is repeated", name),
                    ErrorKind::InvalidFieldName,
                ));
            }
        }

        Ok(Fields {
            inner: Arc::new(FieldsInner {
                field_names: field_names.iter().map(|s| s.to_string()).collect(),
            }),
        })
    }

    pub fn field_names(&self) -> &[String] {
        &self.inner.field_names
    }

    pub fn len(&self) -> usize {
        self.inner.field_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.field_names.is_empty()
    }

    pub fn first(&self) -> &str {
        // never empty, checked at construction
        self.inner.field_names.first().map(String::as_str).unwrap_or_default()
    }

    pub fn encoded_names(&self) -> String {
        self.inner.field_names.join(NAME_SEPARATOR)
    }

    /// Checks if `prefix` names the leading fields of this list, in order.
    pub fn starts_with(&self, prefix: &Fields) -> bool {
        let prefix_names = prefix.field_names();
        prefix_names.len() <= self.len()
            && self
                .inner
                .field_names
                .iter()
                .zip(prefix_names)
                .all(|(a, b)| a == b)
    }

    /// Number of leading fields of this list that are all present in `available`.
    pub fn covered_prefix_len(&self, available: &HashSet<&str>) -> usize {
        self.inner
            .field_names
            .iter()
            .take_while(|name| available.contains(name.as_str()))
            .count()
    }
}

impl Display for Fields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.inner.field_names.join(", "))
    }
}

impl Ord for Fields {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner.field_names.cmp(&other.inner.field_names)
    }
}

impl PartialOrd for Fields {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Hash for Fields {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.field_names.hash(state);
    }
}

/// The values of a document for the fields of an index.
#[derive(Debug)]
pub struct FieldValues {
    field_values: Vec<(String, Value)>,
    nitrite_id: NitriteId,
    fields: Fields,
}

impl FieldValues {
    pub fn new(field_values: Vec<(String, Value)>, nitrite_id: NitriteId, fields: Fields) -> FieldValues {
        FieldValues {
            field_values,
            nitrite_id,
            fields,
        }
    }

    /// Reads every field of `fields` from `document`. Missing fields read as null.
    pub fn from_document(document: &Document, nitrite_id: NitriteId, fields: &Fields) -> NitriteResult<FieldValues> {
        let mut field_values = Vec::with_capacity(fields.len());
        for name in fields.field_names() {
            field_values.push((name.clone(), document.get(name)?));
        }
        Ok(FieldValues::new(field_values, nitrite_id, fields.clone()))
    }

    pub fn get_value(&self, field_name: &str) -> Option<&Value> {
        self.field_values
            .iter()
            .find(|(name, _)| name == field_name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn nitrite_id(&self) -> &NitriteId {
        &self.nitrite_id
    }

    pub fn values(&self) -> &[(String, Value)] {
        &self.field_values
    }
}
