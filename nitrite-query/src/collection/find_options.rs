use crate::common::{Collation, NullOrder, SortOrder};

/// Options for controlling find operations on documents.
///
/// `FindOptions` allows you to specify sorting, pagination, and distinctness
/// for query results. It supports method chaining for convenient configuration.
///
/// # Examples
///
/// ```rust,ignore
/// use nitrite_query::collection::{distinct, limit_to, order_by, skip_by, FindOptions};
/// use nitrite_query::common::SortOrder;
///
/// // Create options with sorting, skip, and limit
/// let options = FindOptions::new()
///     .sort_by("age", SortOrder::Descending)
///     .skip(10)
///     .limit(20);
///
/// // Use convenience functions
/// let options = order_by("name", SortOrder::Ascending);
/// let options = skip_by(5);
/// let options = limit_to(100);
/// let options = distinct();
/// ```
///
/// Skip and limit are signed so that a negative value can be reported: the
/// planner rejects it with `ValidationError`.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub(crate) sort_by: Vec<(String, SortOrder)>,
    pub(crate) skip: Option<i64>,
    pub(crate) limit: Option<i64>,
    pub(crate) distinct: bool,
    pub(crate) collation: Option<Collation>,
    pub(crate) null_order: Option<NullOrder>,
}

/// Creates `FindOptions` with sorting by a field.
///
/// # Arguments
///
/// * `field_name` - The field to sort by
/// * `sort_order` - The sort order (Ascending or Descending)
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips a number of results.
///
/// Useful for pagination: skip the first N results and process the remaining.
pub fn skip_by(skip: i64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that limits the number of results.
///
/// Combined with skip for pagination: skip(10).limit(20) returns results 11-30.
pub fn limit_to(limit: i64) -> FindOptions {
    FindOptions::new().limit(limit)
}

/// Creates `FindOptions` that returns each record at most once.
pub fn distinct() -> FindOptions {
    FindOptions::new().distinct()
}

impl FindOptions {
    /// Creates a new `FindOptions` with default settings.
    ///
    /// No sorting, no skip or limit, duplicates allowed, no collation and the
    /// configured default null order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sort key. Keys are applied in the order they are added.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> Self {
        self.sort_by.push((field_name.to_string(), sort_order));
        self
    }

    /// Sets the number of results to skip.
    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of results to return.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Removes duplicate records from the result.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Compares string sort keys with the given collation.
    ///
    /// A collated sort is always done in memory; indexes never cover it.
    pub fn collation(mut self, collation: Collation) -> Self {
        self.collation = Some(collation);
        self
    }

    /// Places null sort keys first or last.
    pub fn null_order(mut self, null_order: NullOrder) -> Self {
        self.null_order = Some(null_order);
        self
    }

    pub fn sort_order(&self) -> &[(String, SortOrder)] {
        &self.sort_by
    }

    pub fn skip_count(&self) -> Option<i64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<i64> {
        self.limit
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = FindOptions::new();
        assert!(options.sort_order().is_empty());
        assert_eq!(options.skip_count(), None);
        assert_eq!(options.limit_count(), None);
        assert!(!options.is_distinct());
        assert!(options.collation.is_none());
        assert!(options.null_order.is_none());
    }

    #[test]
    fn test_chained_options() {
        let options = FindOptions::new()
            .sort_by("age", SortOrder::Descending)
            .sort_by("name", SortOrder::Ascending)
            .skip(10)
            .limit(20)
            .null_order(NullOrder::Last);

        assert_eq!(
            options.sort_order(),
            &[
                ("age".to_string(), SortOrder::Descending),
                ("name".to_string(), SortOrder::Ascending)
            ]
        );
        assert_eq!(options.skip_count(), Some(10));
        assert_eq!(options.limit_count(), Some(20));
        assert_eq!(options.null_order, Some(NullOrder::Last));
    }

    #[test]
    fn test_convenience_functions() {
        assert_eq!(order_by("a", SortOrder::Ascending).sort_order().len(), 1);
        assert_eq!(skip_by(5).skip_count(), Some(5));
        assert_eq!(limit_to(7).limit_count(), Some(7));
        assert!(distinct().is_distinct());
    }

    #[test]
    fn test_negative_values_are_kept_for_validation() {
        let options = skip_by(-1).limit(-2);
        assert_eq!(options.skip_count(), Some(-1));
        assert_eq!(options.limit_count(), Some(-2));
    }
}
