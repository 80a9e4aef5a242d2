use dashmap::DashMap;
use smallvec::{smallvec, SmallVec};

use crate::{
    collection::{FindOptions, FindPlan},
    common::{stream::validate_bounds, NullOrder, SortOrder},
    errors::{ErrorKind, NitriteError, NitriteResult},
    filter::{and, Filter},
    index::{IndexCatalog, IndexDescriptor},
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

type FilterVec = SmallVec<[Filter; 4]>;

/// Turns a filter and find options into a [FindPlan].
///
/// Plans are cached by filter, options and the version of the index catalog,
/// so any index change makes earlier plans unreachable. Collated queries are
/// never cached.
#[derive(Clone)]
pub(crate) struct FindOptimizer {
    inner: Arc<FindOptimizerInner>,
}

impl FindOptimizer {
    pub fn new(cache_limit: usize, default_null_order: NullOrder) -> Self {
        FindOptimizer {
            inner: Arc::new(FindOptimizerInner {
                plan_cache: DashMap::new(),
                cache_limit,
                default_null_order,
            }),
        }
    }

    pub fn create_find_plan(
        &self,
        filter: &Filter,
        find_options: &FindOptions,
        catalog: &IndexCatalog,
    ) -> NitriteResult<FindPlan> {
        self.inner.create_find_plan(filter, find_options, catalog)
    }

    pub fn invalidate_cache(&self) {
        self.inner.plan_cache.clear();
    }

    #[cfg(test)]
    fn cached_plans(&self) -> usize {
        self.inner.plan_cache.len()
    }
}

struct FindOptimizerInner {
    plan_cache: DashMap<PlanCacheKey, FindPlan>,
    cache_limit: usize,
    default_null_order: NullOrder,
}

impl FindOptimizerInner {
    fn create_find_plan(
        &self,
        filter: &Filter,
        find_options: &FindOptions,
        catalog: &IndexCatalog,
    ) -> NitriteResult<FindPlan> {
        validate_bounds(find_options.skip.unwrap_or(0), find_options.limit)?;

        let cacheable = find_options.collation.is_none();
        let cache_key = PlanCacheKey::new(filter, find_options, catalog.version());
        if cacheable {
            if let Some(cached) = self.plan_cache.get(&cache_key) {
                return Ok(cached.clone());
            }
        }

        let index_descriptors = catalog.usable_indexes();
        check_text_filters(filter, &index_descriptors)?;

        let mut find_plan = self.create_find_plan_internal(filter, &index_descriptors)?;
        self.read_sort_options(find_options, &mut find_plan);
        self.read_limit_options(find_options, &mut find_plan);

        let distinct = find_options.distinct || !find_plan.sub_plans().is_empty();
        find_plan.set_distinct(distinct);
        if let Some(collation) = find_options.collation {
            find_plan.set_collation(collation);
        }
        find_plan.set_null_order(find_options.null_order.unwrap_or(self.default_null_order));
        log::debug!("Planned {} as {}", filter, find_plan);

        if cacheable && self.plan_cache.len() < self.cache_limit {
            self.plan_cache.insert(cache_key, find_plan.clone());
        }
        Ok(find_plan)
    }

    fn create_find_plan_internal(
        &self,
        filter: &Filter,
        index_descriptors: &[IndexDescriptor],
    ) -> NitriteResult<FindPlan> {
        match filter {
            Filter::All => Ok(FindPlan::new()),
            Filter::Or(_) => self.create_or_plan(filter, index_descriptors),
            Filter::And(_) => {
                let mut filters = FilterVec::new();
                flatten_and_filter(filter, &mut filters);
                self.create_and_plan(filters, index_descriptors)
            }
            other => self.create_and_plan(smallvec![other.clone()], index_descriptors),
        }
    }

    fn create_and_plan(
        &self,
        mut filters: FilterVec,
        index_descriptors: &[IndexDescriptor],
    ) -> NitriteResult<FindPlan> {
        let mut find_plan = FindPlan::new();
        if filters.is_empty() {
            return Ok(find_plan);
        }

        // an id lookup beats any index
        if let Some(position) = filters.iter().position(|f| f.as_id_equality().is_some()) {
            let by_id = filters.remove(position);
            find_plan.set_by_id_filter(by_id);
            set_collection_scan(&mut find_plan, filters);
            return Ok(find_plan);
        }

        if filters.iter().any(|f| matches!(f, Filter::Text { .. })) {
            self.plan_text_filter(&mut find_plan, filters, index_descriptors)?;
            return Ok(find_plan);
        }

        if filters.iter().any(|f| matches!(f, Filter::Or(_))) {
            log::debug!("Mixed AND/OR filter is answered by a collection scan");
            set_collection_scan(&mut find_plan, filters);
            return Ok(find_plan);
        }

        self.plan_index_scan_filter(&mut find_plan, filters, index_descriptors);
        Ok(find_plan)
    }

    fn plan_text_filter(
        &self,
        find_plan: &mut FindPlan,
        filters: FilterVec,
        index_descriptors: &[IndexDescriptor],
    ) -> NitriteResult<()> {
        let (text_filters, rest): (FilterVec, FilterVec) = filters
            .into_iter()
            .partition(|f| matches!(f, Filter::Text { .. }));

        let field_names: HashSet<&str> = text_filters.iter().filter_map(Filter::field_name).collect();
        if field_names.len() > 1 {
            log::error!("Full-text filters on different fields cannot be combined");
            return Err(NitriteError::new(
                "Full-text filters on different fields cannot be combined",
                ErrorKind::FilterError,
            ));
        }

        let field_name = field_names.into_iter().next().unwrap_or_default();
        let descriptor = text_index_on(field_name, index_descriptors)
            .ok_or_else(|| not_text_indexed(field_name))?;

        find_plan.set_index_descriptor(descriptor.clone());
        find_plan.set_index_scan_filter(text_filters.into_vec());
        set_collection_scan(find_plan, rest);
        Ok(())
    }

    fn plan_index_scan_filter(
        &self,
        find_plan: &mut FindPlan,
        filters: FilterVec,
        index_descriptors: &[IndexDescriptor],
    ) {
        let available: HashSet<&str> = filters
            .iter()
            .filter(|f| f.is_index_scannable())
            .filter_map(Filter::field_name)
            .collect();

        let Some((descriptor, covered)) = best_index(&available, index_descriptors) else {
            set_collection_scan(find_plan, filters);
            return;
        };

        let index_fields = descriptor.index_fields();
        let covered_fields = &index_fields.field_names()[..covered];
        let on_covered_field = |f: &Filter| {
            f.is_index_scannable()
                && f.field_name().is_some_and(|name| covered_fields.iter().any(|c| c == name))
        };

        let mut index_scan_filters = Vec::new();
        for field_name in covered_fields {
            for filter in filters.iter() {
                if on_covered_field(filter) && filter.field_name() == Some(field_name.as_str()) {
                    index_scan_filters.push(filter.clone());
                }
            }
        }
        let rest: FilterVec = filters.into_iter().filter(|f| !on_covered_field(f)).collect();

        find_plan.set_index_descriptor(descriptor.clone());
        find_plan.set_index_scan_filter(index_scan_filters);
        set_collection_scan(find_plan, rest);
    }

    fn create_or_plan(
        &self,
        filter: &Filter,
        index_descriptors: &[IndexDescriptor],
    ) -> NitriteResult<FindPlan> {
        let mut operands = FilterVec::new();
        flatten_or_filter(filter, &mut operands);

        let mut sub_plans = Vec::with_capacity(operands.len());
        for operand in &operands {
            let sub_plan = self.create_find_plan_internal(operand, index_descriptors)?;
            if !sub_plan.is_index_scan() {
                log::debug!("{} has no index, {} is answered by a collection scan", operand, filter);
                let mut find_plan = FindPlan::new();
                find_plan.set_collection_scan_filter(filter.clone());
                return Ok(find_plan);
            }
            sub_plans.push(sub_plan);
        }

        let mut find_plan = FindPlan::new();
        for sub_plan in sub_plans {
            find_plan.add_sub_plan(sub_plan);
        }
        Ok(find_plan)
    }

    fn read_sort_options(&self, find_options: &FindOptions, find_plan: &mut FindPlan) {
        let sort_by = &find_options.sort_by;
        if sort_by.is_empty() {
            return;
        }

        let index_scan_order = find_plan
            .index_descriptor()
            .filter(|descriptor| !descriptor.is_full_text() && find_options.collation.is_none())
            .and_then(|descriptor| index_scan_order(&descriptor.index_fields().field_names(), sort_by));

        match index_scan_order {
            Some(order) => find_plan.set_index_scan_order(order),
            None => find_plan.set_blocking_sort_order(sort_by.clone()),
        }
    }

    fn read_limit_options(&self, find_options: &FindOptions, find_plan: &mut FindPlan) {
        // bounds were validated before planning
        if let Some(skip) = find_options.skip {
            find_plan.set_skip(skip as u64);
        }
        if let Some(limit) = find_options.limit {
            find_plan.set_limit(limit as u64);
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
struct PlanCacheKey {
    catalog_version: u64,
    filter: Filter,
    sort_by: Vec<(String, SortOrder)>,
    skip: Option<i64>,
    limit: Option<i64>,
    distinct: bool,
    null_order: Option<NullOrder>,
}

impl PlanCacheKey {
    fn new(filter: &Filter, find_options: &FindOptions, catalog_version: u64) -> Self {
        PlanCacheKey {
            catalog_version,
            filter: filter.clone(),
            sort_by: find_options.sort_by.clone(),
            skip: find_options.skip,
            limit: find_options.limit,
            distinct: find_options.distinct,
            null_order: find_options.null_order,
        }
    }
}

fn flatten_and_filter(filter: &Filter, filters: &mut FilterVec) {
    match filter {
        Filter::And(children) => {
            for child in children {
                flatten_and_filter(child, filters);
            }
        }
        Filter::All => {}
        other => filters.push(other.clone()),
    }
}

fn flatten_or_filter(filter: &Filter, filters: &mut FilterVec) {
    match filter {
        Filter::Or(children) => {
            for child in children {
                flatten_or_filter(child, filters);
            }
        }
        other => filters.push(other.clone()),
    }
}

fn set_collection_scan(find_plan: &mut FindPlan, filters: FilterVec) {
    if !filters.is_empty() {
        find_plan.set_collection_scan_filter(and(filters.into_vec()));
    }
}

/// Picks the comparable index covering the most leading fields.
///
/// An index whose fields are exactly the filtered fields wins outright, then
/// the longest covered prefix, then registration order.
fn best_index<'a>(
    available: &HashSet<&str>,
    index_descriptors: &'a [IndexDescriptor],
) -> Option<(&'a IndexDescriptor, usize)> {
    let mut best: Option<(&IndexDescriptor, usize)> = None;
    for descriptor in index_descriptors.iter().filter(|d| !d.is_full_text()) {
        let fields = descriptor.index_fields();
        let covered = fields.covered_prefix_len(available);
        if covered == 0 {
            continue;
        }
        if covered == fields.len() && covered == available.len() {
            return Some((descriptor, covered));
        }
        if best.map_or(true, |(_, longest)| covered > longest) {
            best = Some((descriptor, covered));
        }
    }
    best
}

/// Maps each sort key to a reverse flag when the keys are a prefix of the
/// index fields.
fn index_scan_order(
    index_fields: &[String],
    sort_by: &[(String, SortOrder)],
) -> Option<HashMap<String, bool>> {
    if sort_by.len() > index_fields.len() {
        return None;
    }

    let mut order = HashMap::with_capacity(sort_by.len());
    for ((sort_field, sort_order), index_field) in sort_by.iter().zip(index_fields) {
        if sort_field != index_field {
            return None;
        }
        order.insert(sort_field.clone(), sort_order.is_reverse());
    }
    Some(order)
}

fn text_index_on<'a>(field_name: &str, index_descriptors: &'a [IndexDescriptor]) -> Option<&'a IndexDescriptor> {
    index_descriptors
        .iter()
        .find(|d| d.is_full_text() && d.index_fields().first() == field_name)
}

/// Every full-text filter in the tree needs a full-text index on its field.
fn check_text_filters(filter: &Filter, index_descriptors: &[IndexDescriptor]) -> NitriteResult<()> {
    match filter {
        Filter::Text { field, .. } => match text_index_on(field, index_descriptors) {
            Some(_) => Ok(()),
            None => Err(not_text_indexed(field)),
        },
        Filter::And(children) | Filter::Or(children) => {
            for child in children {
                check_text_filters(child, index_descriptors)?;
            }
            Ok(())
        }
        Filter::Not(child) => check_text_filters(child, index_descriptors),
        _ => Ok(()),
    }
}

fn not_text_indexed(field_name: &str) -> NitriteError {
    log::error!("{} is not full text indexed", field_name);
    NitriteError::new(
        &format!("{} is not full text indexed", field_name),
        ErrorKind::FilterError,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{FindOptions, NitriteId};
    use crate::common::{Collation, Fields, FULL_TEXT_INDEX, NON_UNIQUE_INDEX, UNIQUE_INDEX};
    use crate::filter::{all, by_id, field, not, or};

    fn optimizer() -> FindOptimizer {
        FindOptimizer::new(100, NullOrder::Default)
    }

    fn catalog(indexes: Vec<(&str, Vec<&str>)>) -> IndexCatalog {
        let catalog = IndexCatalog::new();
        for (index_type, fields) in indexes {
            catalog
                .register(IndexDescriptor::new(index_type, Fields::with_names(fields).unwrap(), "test"))
                .unwrap();
        }
        catalog
    }

    fn plan(filter: Filter, options: FindOptions, catalog: &IndexCatalog) -> FindPlan {
        optimizer().create_find_plan(&filter, &options, catalog).unwrap()
    }

    fn index_fields(plan: &FindPlan) -> Vec<String> {
        plan.index_descriptor()
            .map(|d| d.index_fields().field_names().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_no_index_is_collection_scan() {
        let plan = plan(field("a").eq(1), FindOptions::new(), &catalog(vec![]));
        assert!(!plan.is_index_scan());
        assert_eq!(plan.collection_scan_filter(), Some(&field("a").eq(1)));
    }

    #[test]
    fn test_all_filter_has_no_scan_filter() {
        let plan = plan(all(), FindOptions::new(), &catalog(vec![]));
        assert!(plan.collection_scan_filter().is_none());
        assert!(plan.by_id_filter().is_none());
    }

    #[test]
    fn test_by_id_with_residual_filter() {
        let id = NitriteId::new();
        let catalog = catalog(vec![(UNIQUE_INDEX, vec!["a"])]);
        let plan = plan(and(vec![field("a").eq(1), by_id(id), all()]), FindOptions::new(), &catalog);

        assert_eq!(plan.by_id_filter(), Some(&by_id(id)));
        assert_eq!(plan.collection_scan_filter(), Some(&field("a").eq(1)));
        assert!(!plan.is_index_scan());
    }

    #[test]
    fn test_compound_index_covers_both_filters() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["lastName", "firstName"])]);
        let filter = and(vec![field("lastName").eq("ln2"), field("firstName").ne("fn1")]);
        let plan = plan(filter, FindOptions::new(), &catalog);

        assert_eq!(index_fields(&plan), vec!["lastName", "firstName"]);
        assert_eq!(
            plan.index_scan_filter(),
            &[field("lastName").eq("ln2"), field("firstName").ne("fn1")]
        );
        assert!(plan.collection_scan_filter().is_none());
    }

    #[test]
    fn test_index_scan_filters_follow_index_field_order() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a", "b"])]);
        let filter = and(vec![field("b").gt(1), field("c").eq(3), field("a").eq(2)]);
        let plan = plan(filter, FindOptions::new(), &catalog);

        assert_eq!(plan.index_scan_filter(), &[field("a").eq(2), field("b").gt(1)]);
        assert_eq!(plan.collection_scan_filter(), Some(&field("c").eq(3)));
    }

    #[test]
    fn test_prefix_gap_leaves_field_to_collection_scan() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a", "b", "c"])]);
        let filter = and(vec![field("a").eq(1), field("c").eq(3)]);
        let plan = plan(filter, FindOptions::new(), &catalog);

        assert_eq!(plan.index_scan_filter(), &[field("a").eq(1)]);
        assert_eq!(plan.collection_scan_filter(), Some(&field("c").eq(3)));
    }

    #[test]
    fn test_exact_match_beats_earlier_index() {
        let catalog = catalog(vec![
            (NON_UNIQUE_INDEX, vec!["a", "b", "c"]),
            (NON_UNIQUE_INDEX, vec!["a", "b"]),
        ]);
        let filter = and(vec![field("a").eq(1), field("b").eq(2)]);
        assert_eq!(index_fields(&plan(filter, FindOptions::new(), &catalog)), vec!["a", "b"]);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let catalog = catalog(vec![
            (NON_UNIQUE_INDEX, vec!["a"]),
            (NON_UNIQUE_INDEX, vec!["a", "b", "x"]),
        ]);
        let filter = and(vec![field("a").eq(1), field("b").eq(2), field("c").eq(3)]);
        assert_eq!(index_fields(&plan(filter, FindOptions::new(), &catalog)), vec!["a", "b", "x"]);
    }

    #[test]
    fn test_first_registered_wins_a_tie() {
        let catalog = catalog(vec![
            (NON_UNIQUE_INDEX, vec!["a", "x"]),
            (NON_UNIQUE_INDEX, vec!["a", "y"]),
        ]);
        assert_eq!(index_fields(&plan(field("a").eq(1), FindOptions::new(), &catalog)), vec!["a", "x"]);
    }

    #[test]
    fn test_index_being_built_is_skipped() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a"])]);
        catalog.begin_build(&Fields::with_names(vec!["a"]).unwrap()).unwrap();
        assert!(!plan(field("a").eq(1), FindOptions::new(), &catalog).is_index_scan());
    }

    #[test]
    fn test_whole_array_equality_is_not_index_scanned() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a"])]);
        let plan = plan(field("a").eq(vec![1, 2]), FindOptions::new(), &catalog);
        assert!(!plan.is_index_scan());
    }

    #[test]
    fn test_text_filter_requires_index() {
        let err = optimizer()
            .create_find_plan(&field("body").text("hello"), &FindOptions::new(), &catalog(vec![]))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);

        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["body"])]);
        let filter = or(vec![field("a").eq(1), field("body").text("hello")]);
        let err = optimizer().create_find_plan(&filter, &FindOptions::new(), &catalog).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn test_text_filters_on_different_fields() {
        let catalog = catalog(vec![(FULL_TEXT_INDEX, vec!["a"]), (FULL_TEXT_INDEX, vec!["b"])]);
        let filter = and(vec![field("a").text("x"), field("b").text("y")]);
        let err = optimizer().create_find_plan(&filter, &FindOptions::new(), &catalog).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn test_text_plan() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["n"]), (FULL_TEXT_INDEX, vec!["body"])]);
        let filter = and(vec![field("n").eq(1), field("body").text("hello")]);
        let plan = plan(filter, FindOptions::new(), &catalog);

        assert!(plan.index_descriptor().unwrap().is_full_text());
        assert_eq!(plan.index_scan_filter(), &[field("body").text("hello")]);
        assert_eq!(plan.collection_scan_filter(), Some(&field("n").eq(1)));
    }

    #[test]
    fn test_or_with_indexes_has_sub_plans() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a"]), (NON_UNIQUE_INDEX, vec!["b"])]);
        let filter = or(vec![field("a").eq(1), or(vec![field("b").eq(2), field("a").gt(5)])]);
        let plan = plan(filter, FindOptions::new(), &catalog);

        assert_eq!(plan.sub_plans().len(), 3);
        assert!(plan.distinct());
        assert!(plan.collection_scan_filter().is_none());
        assert!(plan.sub_plans().iter().all(FindPlan::is_index_scan));
    }

    #[test]
    fn test_or_without_index_is_collection_scan() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a"])]);
        let filter = or(vec![field("a").eq(1), field("b").eq(2)]);
        let plan = plan(filter.clone(), FindOptions::new(), &catalog);

        assert!(plan.sub_plans().is_empty());
        assert_eq!(plan.collection_scan_filter(), Some(&filter));
        assert!(!plan.distinct());
    }

    #[test]
    fn test_or_of_compound_ands() {
        let branches = || {
            or(vec![
                and(vec![field("a").eq(1), field("b").eq(2)]),
                and(vec![field("c").eq(3), field("d").eq(4)]),
            ])
        };

        let catalog_both = catalog(vec![(NON_UNIQUE_INDEX, vec!["a", "b"]), (NON_UNIQUE_INDEX, vec!["c", "d"])]);
        let plan_both = plan(branches(), FindOptions::new(), &catalog_both);
        assert_eq!(plan_both.sub_plans().len(), 2);
        assert!(plan_both.distinct());
        assert!(plan_both.index_scan_filter().is_empty());
        assert!(plan_both.collection_scan_filter().is_none());
        assert_eq!(index_fields(&plan_both.sub_plans()[0]), vec!["a", "b"]);
        assert_eq!(
            plan_both.sub_plans()[0].index_scan_filter(),
            &[field("a").eq(1), field("b").eq(2)]
        );
        assert_eq!(index_fields(&plan_both.sub_plans()[1]), vec!["c", "d"]);
        assert!(plan_both.sub_plans()[1].collection_scan_filter().is_none());

        let catalog_one = catalog(vec![(NON_UNIQUE_INDEX, vec!["a", "b"])]);
        let plan_one = plan(branches(), FindOptions::new(), &catalog_one);
        assert!(plan_one.sub_plans().is_empty());
        assert!(!plan_one.is_index_scan());
        assert_eq!(plan_one.collection_scan_filter(), Some(&branches()));
    }

    #[test]
    fn test_not_and_mixed_and_or_are_collection_scans() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a"]), (NON_UNIQUE_INDEX, vec!["b"])]);

        let plan_not = plan(not(field("a").eq(1)), FindOptions::new(), &catalog);
        assert!(!plan_not.is_index_scan());
        assert_eq!(plan_not.collection_scan_filter(), Some(&not(field("a").eq(1))));

        let mixed = and(vec![field("a").eq(1), or(vec![field("b").eq(2), field("b").eq(3)])]);
        let plan_mixed = plan(mixed.clone(), FindOptions::new(), &catalog);
        assert!(!plan_mixed.is_index_scan());
        assert!(plan_mixed.sub_plans().is_empty());
        assert_eq!(plan_mixed.collection_scan_filter(), Some(&mixed));
    }

    #[test]
    fn test_sort_covered_by_index() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a", "b"])]);
        let options = FindOptions::new()
            .sort_by("a", SortOrder::Descending)
            .sort_by("b", SortOrder::Ascending);
        let plan = plan(field("a").gt(1), options, &catalog);

        assert!(plan.blocking_sort_order().is_empty());
        assert_eq!(plan.index_scan_order().get("a"), Some(&true));
        assert_eq!(plan.index_scan_order().get("b"), Some(&false));
    }

    #[test]
    fn test_sort_not_covered() {
        let catalog = catalog(vec![(NON_UNIQUE_INDEX, vec!["a", "b"])]);

        let plan_b = plan(field("a").gt(1), FindOptions::new().sort_by("b", SortOrder::Ascending), &catalog);
        assert!(plan_b.index_scan_order().is_empty());
        assert_eq!(plan_b.blocking_sort_order(), &[("b".to_string(), SortOrder::Ascending)]);

        let collated = FindOptions::new()
            .sort_by("a", SortOrder::Ascending)
            .collation(Collation::default());
        let plan_collated = plan(field("a").gt(1), collated, &catalog);
        assert!(plan_collated.index_scan_order().is_empty());
        assert_eq!(plan_collated.blocking_sort_order().len(), 1);
        assert!(plan_collated.collation().is_some());

        let plan_scan = plan(field("c").eq(1), FindOptions::new().sort_by("a", SortOrder::Ascending), &catalog);
        assert_eq!(plan_scan.blocking_sort_order().len(), 1);
    }

    #[test]
    fn test_skip_and_limit() {
        let plan = plan(all(), FindOptions::new().skip(2).limit(3), &catalog(vec![]));
        assert_eq!(plan.skip(), Some(2));
        assert_eq!(plan.limit(), Some(3));

        let err = optimizer()
            .create_find_plan(&all(), &FindOptions::new().skip(-1), &catalog(vec![]))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);

        let err = optimizer()
            .create_find_plan(&all(), &FindOptions::new().limit(-1), &catalog(vec![]))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn test_null_order_defaults_to_configured_value() {
        let optimizer = FindOptimizer::new(10, NullOrder::Last);
        let catalog = catalog(vec![]);
        let plan = optimizer.create_find_plan(&all(), &FindOptions::new(), &catalog).unwrap();
        assert_eq!(plan.null_order(), NullOrder::Last);

        let options = FindOptions::new().null_order(NullOrder::First);
        let plan = optimizer.create_find_plan(&all(), &options, &catalog).unwrap();
        assert_eq!(plan.null_order(), NullOrder::First);
    }

    #[test]
    fn test_plan_cache() {
        let optimizer = optimizer();
        let catalog = catalog(vec![]);
        let filter = field("a").eq(1);

        let first = optimizer.create_find_plan(&filter, &FindOptions::new(), &catalog).unwrap();
        assert_eq!(optimizer.cached_plans(), 1);
        let second = optimizer.create_find_plan(&filter, &FindOptions::new(), &catalog).unwrap();
        assert_eq!(optimizer.cached_plans(), 1);
        assert_eq!(first.to_string(), second.to_string());

        catalog
            .register(IndexDescriptor::new(NON_UNIQUE_INDEX, Fields::with_names(vec!["a"]).unwrap(), "test"))
            .unwrap();
        let third = optimizer.create_find_plan(&filter, &FindOptions::new(), &catalog).unwrap();
        assert!(third.is_index_scan());

        let collated = FindOptions::new().collation(Collation::default());
        optimizer.create_find_plan(&filter, &collated, &catalog).unwrap();
        assert_eq!(optimizer.cached_plans(), 2);

        optimizer.invalidate_cache();
        assert_eq!(optimizer.cached_plans(), 0);
    }

    #[test]
    fn test_plan_cache_keys_on_filter_values() {
        let optimizer = optimizer();
        let catalog = catalog(vec![]);
        let id = NitriteId::new();

        let by_value = field("a").eq(id);
        let by_text = field("a").eq(id.to_string());
        assert_eq!(by_value.to_string(), by_text.to_string());

        let first = optimizer.create_find_plan(&by_value, &FindOptions::new(), &catalog).unwrap();
        let second = optimizer.create_find_plan(&by_text, &FindOptions::new(), &catalog).unwrap();
        assert_eq!(optimizer.cached_plans(), 2);
        assert_eq!(first.collection_scan_filter(), Some(&by_value));
        assert_eq!(second.collection_scan_filter(), Some(&by_text));

        let same = optimizer.create_find_plan(&field("a").eq(id), &FindOptions::new(), &catalog).unwrap();
        assert_eq!(same.collection_scan_filter(), Some(&by_value));
        assert_eq!(optimizer.cached_plans(), 2);
    }

    #[test]
    fn test_cache_limit() {
        let optimizer = FindOptimizer::new(2, NullOrder::Default);
        let catalog = catalog(vec![]);
        for i in 0..5 {
            optimizer.create_find_plan(&field("a").eq(i), &FindOptions::new(), &catalog).unwrap();
        }
        assert_eq!(optimizer.cached_plans(), 2);
    }
}
