use im::OrdMap;
use smallvec::SmallVec;

use crate::collection::nitrite_id::NitriteId;
use crate::common::{ReadExecutor, Value, DOC_ID, DOC_MODIFIED, DOC_REVISION, DOC_SOURCE, RESERVED_FIELDS};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::FIELD_SEPARATOR;
use itertools::Itertools;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

pub(crate) type FieldVec = SmallVec<[String; 8]>;

/// A schemaless record of field names to [Value]s.
///
/// Keys are unique and kept in order. Nested documents are addressed with
/// paths joined by the field separator (default `.`), so for a document
/// `{"a": {"b": 1}}` the call `document.get("a.b")` returns `1`. Arrays can
/// be indexed with a numeric segment (`"items.0"`), and a non-numeric segment
/// applied to an array is resolved against every element.
///
/// The fields below are reserved for record metadata:
///
/// * `_id` - the [NitriteId] of the document, generated on first access.
/// * `_revision` - the revision number.
/// * `_source` - the origin tag.
/// * `_modified` - the last modified time in milliseconds since the epoch.
///
/// ## Cloning
///
/// The backing store is a persistent ordered map. A clone shares structure
/// with the original but every write goes through copy on write, so nested
/// documents of a clone can be modified without the change ever being
/// visible through the original.
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    /// Checks if the document has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates `value` with `key`.
    ///
    /// A key containing the field separator creates (or descends into) the
    /// intermediate documents, so `put("a.b", 1)` yields `{"a": {"b": 1}}`.
    ///
    /// # Errors
    ///
    /// * `InvalidOperation` for an empty key or an empty path segment.
    /// * `InvalidOperation` when `_id` is given anything other than a [NitriteId].
    /// * `ValidationError` when the value, or anything nested inside it, cannot be persisted.
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> NitriteResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        if key == DOC_ID && !value.is_nitrite_id() {
            log::error!("Document id is an auto generated field and cannot be set manually");
            return Err(NitriteError::new(
                "Document id is an auto generated field and cannot be set manually",
                ErrorKind::InvalidOperation,
            ));
        }

        if !value.is_persistable() {
            log::error!("Value of field {} cannot be persisted", key);
            return Err(NitriteError::new(
                &format!("Value of field {} cannot be persisted", key),
                ErrorKind::ValidationError,
            ));
        }

        if self.is_embedded(&key) {
            let separator = FIELD_SEPARATOR.read_with(|s| s.clone());
            let splits: Vec<&str> = key.split(separator.as_str()).collect();
            self.deep_put(&splits, value)
        } else {
            self.data = self.data.update(key.into_owned(), value);
            Ok(())
        }
    }

    /// Returns the value at `key`, or [Value::Null] when nothing is there.
    ///
    /// An exact top-level match wins. Otherwise a separator-containing key is
    /// resolved segment by segment:
    ///
    /// * a document descends into the named field,
    /// * an array with a numeric segment selects that element,
    /// * an array with any other segment applies the remaining path to every
    ///   element and returns the distinct non-null results as an array.
    ///
    /// # Errors
    ///
    /// `ValidationError` for a negative or out of range array index.
    pub fn get(&self, key: &str) -> NitriteResult<Value> {
        match self.data.get(key) {
            Some(value) => Ok(value.clone()),
            None if self.is_embedded(key) => self.get_by_embedded_key(key),
            None => Ok(Value::Null),
        }
    }

    /// Returns the [NitriteId] of this document, generating and storing one
    /// if the document has none yet.
    pub fn id(&mut self) -> NitriteResult<NitriteId> {
        if let Some(Value::NitriteId(id)) = self.data.get(DOC_ID) {
            return Ok(*id);
        }

        let nitrite_id = NitriteId::new();
        self.data = self
            .data
            .update(DOC_ID.to_string(), Value::NitriteId(nitrite_id));
        Ok(nitrite_id)
    }

    /// Checks if the document already carries an `_id`.
    pub fn has_id(&self) -> bool {
        matches!(self.data.get(DOC_ID), Some(Value::NitriteId(_)))
    }

    /// Lists every leaf path of the document joined with the field separator.
    ///
    /// Reserved fields are skipped, nested documents are walked recursively
    /// and fields holding an array are left out.
    pub fn fields(&self) -> Vec<String> {
        self.get_fields_internal("").into_vec()
    }

    /// Removes the value at `key`. Nested paths are supported; an embedded
    /// document left empty by the removal is removed as well.
    pub fn remove(&mut self, key: &str) -> NitriteResult<()> {
        if self.data.contains_key(key) {
            self.data = self.data.without(key);
            return Ok(());
        }

        if self.is_embedded(key) {
            let separator = FIELD_SEPARATOR.read_with(|s| s.clone());
            let splits: Vec<&str> = key.split(separator.as_str()).collect();
            self.deep_remove(&splits)
        } else {
            Ok(())
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Copies every field of `other` into this document. Nested documents
    /// present on both sides are merged recursively; fields unique to this
    /// document are kept.
    pub fn merge(&mut self, other: &Document) -> NitriteResult<()> {
        for (key, value) in other.data.iter() {
            match (self.data.get(key), value) {
                (Some(Value::Document(existing)), Value::Document(incoming)) => {
                    let mut merged = existing.clone();
                    merged.merge(incoming)?;
                    self.data = self.data.update(key.clone(), Value::Document(merged));
                }
                _ => {
                    self.data = self.data.update(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    /// Checks for a top-level key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Checks for a field anywhere in the document, top-level keys included.
    pub fn contains_field(&self, field: &str) -> bool {
        self.contains_key(field) || self.fields().iter().any(|f| f == field)
    }

    /// The revision number, `0` when the document was never stored.
    pub fn revision(&self) -> NitriteResult<i32> {
        match self.data.get(DOC_REVISION) {
            Some(Value::I32(revision)) => Ok(*revision),
            _ => Ok(0),
        }
    }

    pub fn source(&self) -> NitriteResult<String> {
        match self.data.get(DOC_SOURCE) {
            Some(Value::String(source)) => Ok(source.clone()),
            _ => Ok(String::new()),
        }
    }

    pub fn last_modified_since_epoch(&self) -> NitriteResult<i64> {
        match self.data.get(DOC_MODIFIED) {
            Some(Value::I64(modified)) => Ok(*modified),
            _ => Ok(0),
        }
    }

    /// Copies the top-level fields into a [BTreeMap].
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Iterates over the top-level `(key, value)` pairs in key order.
    pub fn iter(&self) -> DocumentIter {
        DocumentIter {
            inner: self.data.clone().into_iter(),
        }
    }

    // metadata fields are written by the collection, bypassing the _id guard
    pub(crate) fn put_reserved(&mut self, key: &str, value: Value) {
        self.data = self.data.update(key.to_string(), value);
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let indent_str = " ".repeat(indent + 2);
        let entries = self
            .data
            .iter()
            .map(|(key, value)| {
                format!("{}\"{}\": {}", indent_str, key, value.to_pretty_json(indent + 2))
            })
            .join(",\n");
        format!("{{\n{}\n{}}}", entries, " ".repeat(indent))
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let indent_str = " ".repeat(indent + 2);
        let entries = self
            .data
            .iter()
            .map(|(key, value)| {
                format!("{}\"{}\": {}", indent_str, key, value.to_debug_string(indent + 2))
            })
            .join(",\n");
        format!("{{\n{}\n{}}}", entries, " ".repeat(indent))
    }

    fn is_embedded(&self, key: &str) -> bool {
        FIELD_SEPARATOR.read_with(|sep| key.contains(sep.as_str()))
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();
        let separator = FIELD_SEPARATOR.read_with(|s| s.clone());

        for (key, value) in self.data.iter() {
            if RESERVED_FIELDS.contains(&key.as_str()) || key.is_empty() {
                continue;
            }

            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, separator, key)
            };

            match value {
                Value::Document(doc) => fields.append(&mut doc.get_fields_internal(&field)),
                Value::Array(_) => {}
                _ => fields.push(field),
            }
        }
        fields
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> NitriteResult<()> {
        let Some((&key, rest)) = splits.split_first() else {
            log::error!("Empty embedded key");
            return Err(NitriteError::new("Empty embedded key", ErrorKind::ValidationError));
        };

        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if rest.is_empty() {
            return self.put(key, value);
        }

        let mut nested = match self.data.get(key) {
            Some(Value::Document(obj)) => obj.clone(),
            _ => Document::new(),
        };
        nested.deep_put(rest, value)?;
        self.data = self.data.update(key.to_string(), Value::Document(nested));
        Ok(())
    }

    fn deep_remove(&mut self, splits: &[&str]) -> NitriteResult<()> {
        let Some((&key, rest)) = splits.split_first() else {
            log::error!("Empty embedded key");
            return Err(NitriteError::new("Empty embedded key", ErrorKind::ValidationError));
        };

        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if rest.is_empty() {
            self.data = self.data.without(key);
            return Ok(());
        }

        match self.data.get(key) {
            Some(Value::Document(obj)) => {
                let mut nested = obj.clone();
                nested.deep_remove(rest)?;
                if nested.is_empty() {
                    self.data = self.data.without(key);
                } else {
                    self.data = self.data.update(key.to_string(), Value::Document(nested));
                }
                Ok(())
            }
            Some(Value::Array(arr)) => {
                let index = array_index(rest[0], arr.len())?;
                let mut new_arr = arr.clone();
                match (&arr[index], rest.len() > 1) {
                    (Value::Document(obj), true) => {
                        let mut nested = obj.clone();
                        nested.deep_remove(&rest[1..])?;
                        if nested.is_empty() {
                            new_arr.remove(index);
                        } else {
                            new_arr[index] = Value::Document(nested);
                        }
                    }
                    _ => {
                        new_arr.remove(index);
                    }
                }
                self.data = self.data.update(key.to_string(), Value::Array(new_arr));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn get_by_embedded_key(&self, key: &str) -> NitriteResult<Value> {
        let separator = FIELD_SEPARATOR.read_with(|s| s.clone());
        let splits: Vec<&str> = key.split(separator.as_str()).collect();

        let first = splits[0];
        if first.is_empty() {
            log::error!("Document does not support empty key");
            return Err(NitriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        recursive_get(self.data.get(first), &splits[1..])
    }
}

/// Parses an array index segment and checks it against the array length.
fn array_index(segment: &str, len: usize) -> NitriteResult<usize> {
    let index = match segment.parse::<i64>() {
        Ok(index) => index,
        Err(_) => {
            log::error!("Invalid array index {} to access array inside a document", segment);
            return Err(NitriteError::new(
                &format!("Invalid array index {} to access array inside a document", segment),
                ErrorKind::ValidationError,
            ));
        }
    };

    if index < 0 {
        log::error!("Invalid array index {} to access array inside a document", index);
        return Err(NitriteError::new(
            &format!("Invalid array index {} to access array inside a document", index),
            ErrorKind::ValidationError,
        ));
    }

    let index = index as usize;
    if index >= len {
        log::error!("Array index {} out of bound", index);
        return Err(NitriteError::new(
            &format!("Array index {} out of bound", index),
            ErrorKind::ValidationError,
        ));
    }
    Ok(index)
}

fn is_index_segment(segment: &str) -> bool {
    let digits = segment.strip_prefix('-').unwrap_or(segment);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn recursive_get(value: Option<&Value>, splits: &[&str]) -> NitriteResult<Value> {
    let Some(value) = value else {
        return Ok(Value::Null);
    };

    let Some((&key, rest)) = splits.split_first() else {
        return Ok(value.clone());
    };

    if key.is_empty() {
        log::error!("Document does not support empty key");
        return Err(NitriteError::new(
            "Document does not support empty key",
            ErrorKind::InvalidOperation,
        ));
    }

    match value {
        Value::Document(obj) => recursive_get(obj.data.get(key), rest),
        Value::Array(arr) if is_index_segment(key) => {
            let index = array_index(key, arr.len())?;
            recursive_get(Some(&arr[index]), rest)
        }
        Value::Array(arr) => decompose(arr, splits),
        _ => Ok(Value::Null),
    }
}

/// Applies the remaining path to every element of an array, flattening
/// nested array results and dropping nulls and duplicates.
fn decompose(arr: &[Value], splits: &[&str]) -> NitriteResult<Value> {
    let mut items: Vec<Value> = Vec::with_capacity(arr.len());

    for item in arr {
        match recursive_get(Some(item), splits)? {
            Value::Array(values) => items.extend(values.into_iter().filter(|v| !v.is_null())),
            Value::Null => {}
            value => items.push(value),
        }
    }

    Ok(Value::Array(items.into_iter().unique().collect()))
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

/// Owning iterator over the top-level fields of a [Document].
pub struct DocumentIter {
    inner: im::ordmap::ConsumingIter<(String, Value)>,
}

impl Iterator for DocumentIter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[doc(hidden)]
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use nitrite_query::doc;
///
/// let empty = doc!{};
///
/// let base = 100;
/// let person = doc!{
///     name: "Bob",
///     score: (base * 2),
///     address: {
///         city: "Paris",
///         tags: ["home", "work"]
///     },
///     "contact.email": "bob@example.com"
/// };
/// assert_eq!(person.get("address.city").unwrap(), nitrite_query::val!("Paris"));
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                    .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Converts a `doc!` value token into a [Value], handling nested documents and arrays.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
