use crate::common::{Collation, NullOrder, SortOrder};
use crate::filter::Filter;
use crate::index::IndexDescriptor;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Represents an execution plan for a query.
///
/// A `FindPlan` describes how a query will be answered:
///
/// * **Lookup** - a direct by-id lookup, an index scan or a collection scan
/// * **Filtering** - the residual filter applied to every candidate
/// * **Sub-Plans** - one plan per branch of an OR that is answered by indexes
/// * **Sorting** - an index-covered order or a blocking in-memory sort
/// * **Pagination** - skip and limit
/// * **Distinct** - whether duplicate records are removed
///
/// Plans are produced by the query optimizer, never change after planning,
/// and can be inspected through [crate::common::DocumentCursor::find_plan].
///
/// At most one of an index scan and a list of sub-plans is set at the top
/// level. The index scan filter and the collection scan filter partition the
/// original filter: a leaf appears in one of them, never both.
#[derive(Clone, Debug, Default)]
pub struct FindPlan {
    inner: Arc<FindPlanInner>,
}

impl FindPlan {
    /// Creates a new empty `FindPlan`.
    ///
    /// ```ignore
    /// let plan = FindPlan::new();
    /// assert!(plan.by_id_filter().is_none());
    /// assert!(!plan.distinct());
    /// ```
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the by-id filter if the query names a single document id.
    pub fn by_id_filter(&self) -> Option<&Filter> {
        self.inner.by_id_filter.as_ref()
    }

    /// Returns the filter applied to every candidate record.
    ///
    /// With no index and no by-id lookup the candidates are the whole
    /// collection.
    pub fn collection_scan_filter(&self) -> Option<&Filter> {
        self.inner.collection_scan_filter.as_ref()
    }

    /// Returns the index to scan, if any.
    pub fn index_descriptor(&self) -> Option<&IndexDescriptor> {
        self.inner.index_descriptor.as_ref()
    }

    /// Returns the filters answered by the index, in index field order.
    pub fn index_scan_filter(&self) -> &[Filter] {
        &self.inner.index_scan_filter
    }

    /// Returns the reverse-scan flag of every index field that provides
    /// the requested sort order. Empty when the index does not sort.
    pub fn index_scan_order(&self) -> &HashMap<String, bool> {
        &self.inner.index_scan_order
    }

    /// Returns the plans of the branches of an indexed OR.
    pub fn sub_plans(&self) -> &[FindPlan] {
        &self.inner.sub_plans
    }

    /// Returns the sort applied in memory after filtering. Empty when no
    /// sort is needed or the index provides it.
    pub fn blocking_sort_order(&self) -> &[(String, SortOrder)] {
        &self.inner.blocking_sort_order
    }

    pub fn skip(&self) -> Option<u64> {
        self.inner.skip
    }

    pub fn limit(&self) -> Option<u64> {
        self.inner.limit
    }

    /// Returns whether duplicate records are removed.
    pub fn distinct(&self) -> bool {
        self.inner.distinct
    }

    pub fn collation(&self) -> Option<&Collation> {
        self.inner.collation.as_ref()
    }

    pub fn null_order(&self) -> NullOrder {
        self.inner.null_order
    }

    fn inner_mut(&mut self) -> &mut FindPlanInner {
        Arc::make_mut(&mut self.inner)
    }

    pub(crate) fn add_sub_plan(&mut self, sub_plan: FindPlan) {
        self.inner_mut().sub_plans.push(sub_plan);
    }

    pub(crate) fn set_by_id_filter(&mut self, filter: Filter) {
        self.inner_mut().by_id_filter = Some(filter);
    }

    pub(crate) fn set_collection_scan_filter(&mut self, filter: Filter) {
        self.inner_mut().collection_scan_filter = Some(filter);
    }

    pub(crate) fn set_index_descriptor(&mut self, descriptor: IndexDescriptor) {
        self.inner_mut().index_descriptor = Some(descriptor);
    }

    pub(crate) fn set_index_scan_filter(&mut self, filters: Vec<Filter>) {
        self.inner_mut().index_scan_filter = filters;
    }

    pub(crate) fn set_index_scan_order(&mut self, order: HashMap<String, bool>) {
        self.inner_mut().index_scan_order = order;
    }

    pub(crate) fn set_blocking_sort_order(&mut self, order: Vec<(String, SortOrder)>) {
        self.inner_mut().blocking_sort_order = order;
    }

    pub(crate) fn set_skip(&mut self, skip: u64) {
        self.inner_mut().skip = Some(skip);
    }

    pub(crate) fn set_limit(&mut self, limit: u64) {
        self.inner_mut().limit = Some(limit);
    }

    pub(crate) fn set_distinct(&mut self, distinct: bool) {
        self.inner_mut().distinct = distinct;
    }

    pub(crate) fn set_collation(&mut self, collation: Collation) {
        self.inner_mut().collation = Some(collation);
    }

    pub(crate) fn set_null_order(&mut self, null_order: NullOrder) {
        self.inner_mut().null_order = null_order;
    }

    /// Checks if the plan reads through an index.
    pub fn is_index_scan(&self) -> bool {
        self.inner.index_descriptor.is_some()
    }
}

impl Display for FindPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let inner = &self.inner;
        write!(f, "FindPlan {{")?;
        if let Some(filter) = &inner.by_id_filter {
            write!(f, " by_id: {}", filter)?;
        }
        if let Some(descriptor) = &inner.index_descriptor {
            write!(
                f,
                " index: {}, index_scan: [{}]",
                descriptor,
                inner.index_scan_filter.iter().join(", ")
            )?;
        }
        if let Some(filter) = &inner.collection_scan_filter {
            write!(f, " collection_scan: {}", filter)?;
        }
        if !inner.sub_plans.is_empty() {
            write!(f, " sub_plans: [{}]", inner.sub_plans.iter().join(", "))?;
        }
        if !inner.blocking_sort_order.is_empty() {
            let order = inner
                .blocking_sort_order
                .iter()
                .map(|(field, order)| format!("{} {:?}", field, order))
                .join(", ");
            write!(f, " blocking_sort: [{}]", order)?;
        }
        if let Some(skip) = inner.skip {
            write!(f, " skip: {}", skip)?;
        }
        if let Some(limit) = inner.limit {
            write!(f, " limit: {}", limit)?;
        }
        if inner.distinct {
            write!(f, " distinct")?;
        }
        write!(f, " }}")
    }
}

#[derive(Clone, Debug, Default)]
struct FindPlanInner {
    by_id_filter: Option<Filter>,
    collection_scan_filter: Option<Filter>,
    index_descriptor: Option<IndexDescriptor>,
    index_scan_filter: Vec<Filter>,
    index_scan_order: HashMap<String, bool>,
    sub_plans: Vec<FindPlan>,
    blocking_sort_order: Vec<(String, SortOrder)>,
    skip: Option<u64>,
    limit: Option<u64>,
    collation: Option<Collation>,
    null_order: NullOrder,
    distinct: bool,
}
