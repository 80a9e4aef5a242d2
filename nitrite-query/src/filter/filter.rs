use crate::collection::{Document, NitriteId};
use crate::common::{
    any_element, compare_values, equals_or_contains, parse_text_query, text_matches, text_of, Value, DOC_ID,
};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use itertools::Itertools;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Comparison operators of a [Filter::Comparison].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
}

impl ComparisonOp {
    fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::In => "in",
            ComparisonOp::NotIn => "not in",
        }
    }

    /// Checks if the operator orders values rather than testing membership.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOp::Gt | ComparisonOp::Gte | ComparisonOp::Lt | ComparisonOp::Lte
        )
    }

    /// Checks if `ordering` (field value against filter value) satisfies the operator.
    pub(crate) fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::Ne => ordering != Ordering::Equal,
            ComparisonOp::Gt => ordering == Ordering::Greater,
            ComparisonOp::Gte => ordering != Ordering::Less,
            ComparisonOp::Lt => ordering == Ordering::Less,
            ComparisonOp::Lte => ordering != Ordering::Greater,
            ComparisonOp::In | ComparisonOp::NotIn => false,
        }
    }
}

/// A predicate over documents.
///
/// Filters are plain data: the planner inspects their shape to pick an
/// index, and [Filter::apply] evaluates them against a document. Build them
/// with [crate::filter::field], [all], [by_id], [and], [or] and [not].
///
/// Missing fields read as null. When a field holds an array, a comparison
/// matches if it holds for the array as a whole or for any element; `Ne` and
/// `NotIn` match exactly when `Eq` and `In` do not.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches every document.
    All,
    /// `field <op> value`. For `In` and `NotIn` the value is an array.
    Comparison {
        field: String,
        op: ComparisonOp,
        value: Value,
    },
    /// Full-text match against the words of a string field.
    Text { field: String, query: String },
    /// Regular expression match against a string field.
    Regex { field: String, pattern: Regex },
    /// Matches when an element of an array field satisfies the inner filter.
    ElemMatch { field: String, filter: Box<Filter> },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Filter::All, Filter::All) => true,
            (
                Filter::Comparison { field: f1, op: o1, value: v1 },
                Filter::Comparison { field: f2, op: o2, value: v2 },
            ) => f1 == f2 && o1 == o2 && v1 == v2,
            (Filter::Text { field: f1, query: q1 }, Filter::Text { field: f2, query: q2 }) => {
                f1 == f2 && q1 == q2
            }
            (Filter::Regex { field: f1, pattern: p1 }, Filter::Regex { field: f2, pattern: p2 }) => {
                f1 == f2 && p1.as_str() == p2.as_str()
            }
            (
                Filter::ElemMatch { field: f1, filter: i1 },
                Filter::ElemMatch { field: f2, filter: i2 },
            ) => f1 == f2 && i1 == i2,
            (Filter::And(a), Filter::And(b)) => a == b,
            (Filter::Or(a), Filter::Or(b)) => a == b,
            (Filter::Not(a), Filter::Not(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Filter {}

impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Filter::All => {}
            Filter::Comparison { field, op, value } => {
                field.hash(state);
                op.hash(state);
                value.hash(state);
            }
            Filter::Text { field, query } => {
                field.hash(state);
                query.hash(state);
            }
            Filter::Regex { field, pattern } => {
                field.hash(state);
                pattern.as_str().hash(state);
            }
            Filter::ElemMatch { field, filter } => {
                field.hash(state);
                filter.hash(state);
            }
            Filter::And(filters) | Filter::Or(filters) => filters.hash(state),
            Filter::Not(filter) => filter.hash(state),
        }
    }
}

impl Filter {
    /// Combines this filter with another using logical AND.
    pub fn and(self, filter: Filter) -> Filter {
        Filter::And(vec![self, filter])
    }

    /// Combines this filter with another using logical OR.
    pub fn or(self, filter: Filter) -> Filter {
        Filter::Or(vec![self, filter])
    }

    /// Negates this filter.
    pub fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }

    /// Evaluates the filter against a document.
    ///
    /// # Errors
    ///
    /// * `ValidationError` when an ordering operator is given a value that
    ///   cannot be ordered, or a path holds an invalid array index.
    /// * `FilterError` for a malformed full-text query.
    pub fn apply(&self, doc: &Document) -> NitriteResult<bool> {
        match self {
            Filter::All => Ok(true),
            Filter::Comparison { field, op, value } => compare(&doc.get(field)?, *op, value),
            Filter::Text { field, query } => text_search(&doc.get(field)?, query),
            Filter::Regex { field, pattern } => Ok(regex_search(&doc.get(field)?, pattern)),
            Filter::ElemMatch { field, filter } => elem_match(&doc.get(field)?, filter),
            Filter::And(filters) => {
                for filter in filters {
                    if !filter.apply(doc)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(filters) => {
                for filter in filters {
                    if filter.apply(doc)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(filter) => Ok(!filter.apply(doc)?),
        }
    }

    // evaluates against a single array element; field names are ignored for scalars
    pub(crate) fn apply_on_element(&self, element: &Value) -> NitriteResult<bool> {
        if let Value::Document(doc) = element {
            return self.apply(doc);
        }

        match self {
            Filter::All => Ok(true),
            Filter::Comparison { op, value, .. } => compare(element, *op, value),
            Filter::Text { query, .. } => text_search(element, query),
            Filter::Regex { pattern, .. } => Ok(regex_search(element, pattern)),
            Filter::ElemMatch { filter, .. } => elem_match(element, filter),
            Filter::And(filters) => {
                for filter in filters {
                    if !filter.apply_on_element(element)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(filters) => {
                for filter in filters {
                    if filter.apply_on_element(element)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(filter) => Ok(!filter.apply_on_element(element)?),
        }
    }

    /// The field a leaf filter targets.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Filter::Comparison { field, .. }
            | Filter::Text { field, .. }
            | Filter::Regex { field, .. }
            | Filter::ElemMatch { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Checks if a comparable index can answer this filter directly.
    ///
    /// Indexes hold scalar keys, so a comparison against a whole array or
    /// document is left to the collection scan.
    pub fn is_index_scannable(&self) -> bool {
        match self {
            Filter::Comparison {
                op: ComparisonOp::In | ComparisonOp::NotIn,
                value: Value::Array(values),
                ..
            } => values.iter().all(|v| !v.is_array() && !v.is_document()),
            Filter::Comparison { value, .. } => !value.is_array() && !value.is_document(),
            Filter::Regex { .. } => true,
            _ => false,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// Checks if this is an equality on the document id.
    pub(crate) fn as_id_equality(&self) -> Option<NitriteId> {
        match self {
            Filter::Comparison {
                field,
                op: ComparisonOp::Eq,
                value: Value::NitriteId(id),
            } if field == DOC_ID => Some(*id),
            _ => None,
        }
    }
}

fn compare(field_value: &Value, op: ComparisonOp, target: &Value) -> NitriteResult<bool> {
    match op {
        ComparisonOp::Eq => Ok(equals_or_contains(field_value, target)),
        ComparisonOp::Ne => Ok(!equals_or_contains(field_value, target)),
        ComparisonOp::In => Ok(in_list(field_value, target)),
        ComparisonOp::NotIn => Ok(!in_list(field_value, target)),
        _ => {
            if !target.is_comparable() {
                log::error!("Cannot compare with value {:?} using {}", target, op.symbol());
                return Err(NitriteError::new(
                    &format!("Cannot compare with value {} using {}", target, op.symbol()),
                    ErrorKind::ValidationError,
                ));
            }
            Ok(any_element(field_value, |v| {
                compare_values(v, target).is_some_and(|ordering| op.accepts(ordering))
            }))
        }
    }
}

fn in_list(field_value: &Value, list: &Value) -> bool {
    match list {
        Value::Array(values) => {
            values.contains(field_value) || any_element(field_value, |v| values.contains(v))
        }
        other => equals_or_contains(field_value, other),
    }
}

fn text_search(field_value: &Value, query: &str) -> NitriteResult<bool> {
    let terms = parse_text_query(query)?;
    Ok(any_element(field_value, |v| {
        text_of(v).is_some_and(|text| text_matches(&text, &terms))
    }))
}

fn regex_search(field_value: &Value, pattern: &Regex) -> bool {
    any_element(field_value, |v| text_of(v).is_some_and(|text| pattern.is_match(&text)))
}

fn elem_match(field_value: &Value, filter: &Filter) -> NitriteResult<bool> {
    if let Value::Array(items) = field_value {
        for item in items {
            if filter.apply_on_element(item)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn format_list(value: &Value) -> String {
    match value {
        Value::Array(values) => format!("[{}]", values.iter().join(", ")),
        other => other.to_string(),
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "AllFilter"),
            Filter::Comparison { field, op, value } => match op {
                ComparisonOp::In | ComparisonOp::NotIn => {
                    write!(f, "({} {} {})", field, op.symbol(), format_list(value))
                }
                _ => write!(f, "({} {} {})", field, op.symbol(), value),
            },
            Filter::Text { field, query } => write!(f, "({} : {})", field, query),
            Filter::Regex { field, pattern } => write!(f, "({} =~ {})", field, pattern.as_str()),
            Filter::ElemMatch { field, filter } => write!(f, "(elemMatch {} {})", field, filter),
            Filter::And(filters) => write!(f, "({})", filters.iter().join(" && ")),
            Filter::Or(filters) => write!(f, "({})", filters.iter().join(" || ")),
            Filter::Not(filter) => write!(f, "(not {})", filter),
        }
    }
}

/// Creates a filter that matches all documents.
pub fn all() -> Filter {
    Filter::All
}

/// Creates a filter that matches the document with the given id.
pub fn by_id(id: NitriteId) -> Filter {
    Filter::Comparison {
        field: DOC_ID.to_string(),
        op: ComparisonOp::Eq,
        value: Value::NitriteId(id),
    }
}

/// Matches documents satisfying every filter. A single filter is returned as is.
pub fn and(mut filters: Vec<Filter>) -> Filter {
    match filters.len() {
        0 => Filter::All,
        1 => filters.remove(0),
        _ => Filter::And(filters),
    }
}

/// Matches documents satisfying at least one filter. A single filter is returned as is.
pub fn or(mut filters: Vec<Filter>) -> Filter {
    match filters.len() {
        0 => Filter::All,
        1 => filters.remove(0),
        _ => Filter::Or(filters),
    }
}

/// Negates a filter.
pub fn not(filter: Filter) -> Filter {
    Filter::Not(Box::new(filter))
}
