use crate::common::Value;
use crate::errors::NitriteResult;
use regex::Regex;

use super::{ComparisonOp, Filter};

/// Creates a fluent filter builder for the specified field name.
///
/// Nested fields are addressed with the field separator, e.g.
/// `field("address.city")`.
///
/// # Arguments
///
/// * `field_name` - The name of the field to filter on
///
/// # Returns
///
/// A `FluentFilter` builder for constructing field-specific filters
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// Each method consumes the builder and returns a [Filter] that can be passed
/// to a collection's `find` or combined with other filters.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    fn comparison(self, op: ComparisonOp, value: Value) -> Filter {
        Filter::Comparison {
            field: self.field_name,
            op,
            value,
        }
    }

    /// Creates a filter that matches documents where the field equals the specified value.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to match against
    ///
    /// # Returns
    ///
    /// A `Filter` matching documents where the field equals the value
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        self.comparison(ComparisonOp::Eq, value.into())
    }

    /// Creates a filter that matches documents where the field does not equal the specified value.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to exclude from matches
    ///
    /// # Returns
    ///
    /// A `Filter` matching documents where the field differs from the value
    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        self.comparison(ComparisonOp::Ne, value.into())
    }

    /// Creates a filter that matches documents where the field is greater than the specified value.
    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        self.comparison(ComparisonOp::Gt, value.into())
    }

    /// Creates a filter that matches documents where the field is greater than or equal to the specified value.
    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        self.comparison(ComparisonOp::Gte, value.into())
    }

    /// Creates a filter that matches documents where the field is less than the specified value.
    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        self.comparison(ComparisonOp::Lt, value.into())
    }

    /// Creates a filter that matches documents where the field is less than or equal to the specified value.
    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        self.comparison(ComparisonOp::Lte, value.into())
    }

    /// Creates a filter that matches documents where the field lies between two bounds.
    ///
    /// The result is the conjunction of a lower and an upper comparison, so
    /// the planner can serve it from an index like any other range.
    ///
    /// # Arguments
    ///
    /// * `lower_bound` - The lower bound
    /// * `upper_bound` - The upper bound
    /// * `lower_inclusive` - Whether the lower bound matches
    /// * `upper_inclusive` - Whether the upper bound matches
    ///
    /// # Returns
    ///
    /// A `Filter` matching documents within the range
    pub fn between<T: Into<Value>>(
        self,
        lower_bound: T,
        upper_bound: T,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Filter {
        let lower_op = if lower_inclusive { ComparisonOp::Gte } else { ComparisonOp::Gt };
        let upper_op = if upper_inclusive { ComparisonOp::Lte } else { ComparisonOp::Lt };
        let lower = Filter::Comparison {
            field: self.field_name.clone(),
            op: lower_op,
            value: lower_bound.into(),
        };
        let upper = self.comparison(upper_op, upper_bound.into());
        Filter::And(vec![lower, upper])
    }

    /// Creates a filter that matches documents where the field lies between two
    /// bounds, both included.
    #[inline]
    pub fn between_inclusive<T: Into<Value>>(self, lower_bound: T, upper_bound: T) -> Filter {
        self.between(lower_bound, upper_bound, true, true)
    }

    /// Creates a full-text filter on the field.
    ///
    /// The query is a list of words, any of which may match, or a single word
    /// with a leading or trailing `*` wildcard. Malformed queries fail when
    /// the filter is planned or evaluated.
    ///
    /// # Arguments
    ///
    /// * `query` - The text query
    ///
    /// # Returns
    ///
    /// A `Filter` matching documents whose text contains a matching word
    #[inline]
    pub fn text(self, query: &str) -> Filter {
        Filter::Text {
            field: self.field_name,
            query: query.to_string(),
        }
    }

    /// Creates a filter that matches documents whose string field matches a regular expression.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The regular expression
    ///
    /// # Returns
    ///
    /// The `Filter`, or a `FilterError` if the pattern does not compile
    pub fn text_regex(self, pattern: &str) -> NitriteResult<Filter> {
        let pattern = Regex::new(pattern).map_err(|err| {
            log::error!("Invalid regular expression {}: {}", pattern, err);
            err
        })?;
        Ok(Filter::Regex {
            field: self.field_name,
            pattern,
        })
    }

    /// Creates a filter that matches documents where the field equals any of the values.
    ///
    /// # Arguments
    ///
    /// * `values` - The accepted values
    ///
    /// # Returns
    ///
    /// A `Filter` matching documents where the field is one of the values
    #[inline]
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(Into::into).collect();
        self.comparison(ComparisonOp::In, Value::Array(values))
    }

    /// Creates a filter that matches documents where the field equals none of the values.
    #[inline]
    pub fn not_in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(Into::into).collect();
        self.comparison(ComparisonOp::NotIn, Value::Array(values))
    }

    /// Creates a filter that matches documents where an element of the array
    /// field satisfies `filter`.
    ///
    /// Document elements are matched by field name. Scalar elements are
    /// matched directly and the inner filter's field name is ignored, so
    /// `field("scores").elem_match(field("$").gt(10))` finds any score above 10.
    #[inline]
    pub fn elem_match(self, filter: Filter) -> Filter {
        Filter::ElemMatch {
            field: self.field_name,
            filter: Box::new(filter),
        }
    }
}
