use super::{nitrite_index::NitriteIndexProvider, IndexDescriptor};
use crate::{
    collection::{FindPlan, NitriteId},
    common::{FieldValues, Value},
    errors::{ErrorKind, NitriteError, NitriteResult},
    filter::{ComparisonOp, Filter},
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::sync::Arc;

static COMPOUND_MULTIKEY_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        "Compound multikey index is supported on the first field of the index only",
        ErrorKind::IndexingError,
    )
});

/// One level of a comparable index. The last level holds record ids, every
/// other level maps the values of the next field.
#[derive(Debug)]
enum IndexNode {
    Ids(Vec<NitriteId>),
    Level(BTreeMap<Value, IndexNode>),
}

impl IndexNode {
    fn is_empty(&self) -> bool {
        match self {
            IndexNode::Ids(ids) => ids.is_empty(),
            IndexNode::Level(level) => level.is_empty(),
        }
    }
}

/// An index over comparable values, for unique and non-unique indexes on
/// one or more fields.
///
/// Values are kept in nested ordered maps, one level per indexed field:
/// `Map[field1_value] -> Map[field2_value] -> [NitriteIds]`. Each level can
/// be traversed forward or in reverse, which lets the index produce a sort
/// order as well as answer filters.
///
/// # Characteristics
/// - **Multikey support**: An array in the first field is indexed per element;
///   arrays in later fields are rejected
/// - **Missing fields**: Index as null
/// - **Unique constraints**: A unique index maps each combination of values
///   to at most one record
#[derive(Clone)]
pub struct ComparableIndex {
    inner: Arc<ComparableIndexInner>,
}

impl ComparableIndex {
    pub fn new(index_descriptor: IndexDescriptor) -> ComparableIndex {
        ComparableIndex {
            inner: Arc::new(ComparableIndexInner {
                index_descriptor,
                root: RwLock::new(BTreeMap::new()),
            }),
        }
    }
}

impl Deref for ComparableIndex {
    type Target = Arc<ComparableIndexInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl NitriteIndexProvider for ComparableIndex {
    fn index_descriptor(&self) -> IndexDescriptor {
        self.inner.index_descriptor.clone()
    }

    fn write(&self, field_values: &FieldValues) -> NitriteResult<()> {
        self.inner.write(field_values)
    }

    fn remove(&self, field_values: &FieldValues) -> NitriteResult<()> {
        self.inner.remove(field_values)
    }

    fn drop_index(&self) -> NitriteResult<()> {
        self.inner.root.write().clear();
        Ok(())
    }

    fn find_nitrite_ids(&self, find_plan: &FindPlan) -> NitriteResult<Vec<NitriteId>> {
        self.inner.find_nitrite_ids(find_plan)
    }
}

pub struct ComparableIndexInner {
    index_descriptor: IndexDescriptor,
    root: RwLock<BTreeMap<Value, IndexNode>>,
}

impl ComparableIndexInner {
    fn write(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let paths = self.key_paths(field_values)?;
        let nitrite_id = *field_values.nitrite_id();
        let mut root = self.root.write();

        if self.index_descriptor.is_unique() {
            for path in &paths {
                if let Some(ids) = find_ids(&root, path) {
                    if ids.iter().any(|id| id != &nitrite_id) {
                        log::error!("Unique constraint violated for {:?}", field_values);
                        return Err(NitriteError::new(
                            &format!(
                                "Unique constraint violated for {:?} in {}",
                                path, self.index_descriptor
                            ),
                            ErrorKind::UniqueConstraintViolation,
                        ));
                    }
                }
            }
        }

        for path in paths {
            insert_id(&mut root, &path, nitrite_id);
        }
        Ok(())
    }

    fn remove(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let paths = match self.key_paths(field_values) {
            Ok(paths) => paths,
            // values that could never be written have nothing to remove
            Err(_) => return Ok(()),
        };

        let mut root = self.root.write();
        for path in paths {
            remove_id(&mut root, &path, field_values.nitrite_id());
        }
        Ok(())
    }

    /// Every key path a record occupies: one per element of a multikey
    /// first field, one otherwise.
    fn key_paths(&self, field_values: &FieldValues) -> NitriteResult<Vec<Vec<Value>>> {
        let values = field_values.values();
        let Some((_, first)) = values.first() else {
            return Ok(Vec::new());
        };

        let first_keys = match first {
            Value::Array(items) if items.is_empty() => vec![Value::Null],
            Value::Array(items) => items.iter().unique().cloned().collect(),
            value => vec![value.clone()],
        };

        let mut rest = Vec::with_capacity(values.len().saturating_sub(1));
        for (_, value) in &values[1..] {
            if value.is_array() {
                log::error!("Compound multikey index is supported on the first field of the index only");
                return Err(COMPOUND_MULTIKEY_ERROR.clone());
            }
            self.validate_key(value)?;
            rest.push(value.clone());
        }

        let mut paths = Vec::with_capacity(first_keys.len());
        for key in first_keys {
            self.validate_key(&key)?;
            let mut path = Vec::with_capacity(values.len());
            path.push(key);
            path.extend(rest.iter().cloned());
            paths.push(path);
        }
        Ok(paths)
    }

    fn validate_key(&self, value: &Value) -> NitriteResult<()> {
        if value.is_null() || value.is_comparable() {
            return Ok(());
        }
        log::error!("Found non comparable value {} in index {}", value, self.index_descriptor);
        Err(NitriteError::new(
            &format!("{} is not comparable and cannot be indexed", value),
            ErrorKind::IndexingError,
        ))
    }

    fn find_nitrite_ids(&self, find_plan: &FindPlan) -> NitriteResult<Vec<NitriteId>> {
        let fields = self.index_descriptor.index_fields();
        let scan = IndexScan {
            field_names: fields.field_names(),
            filters: find_plan.index_scan_filter(),
            scan_order: find_plan.index_scan_order(),
            nulls_first: find_plan.null_order().nulls_first(),
        };

        let root = self.root.read();
        let mut nitrite_ids = Vec::new();
        scan.scan_level(&root, 0, &mut nitrite_ids)?;
        Ok(nitrite_ids.into_iter().unique().collect())
    }
}

struct IndexScan<'a> {
    field_names: &'a [String],
    filters: &'a [Filter],
    scan_order: &'a HashMap<String, bool>,
    nulls_first: bool,
}

impl IndexScan<'_> {
    fn scan_level(
        &self,
        level: &BTreeMap<Value, IndexNode>,
        depth: usize,
        nitrite_ids: &mut Vec<NitriteId>,
    ) -> NitriteResult<()> {
        let Some(field_name) = self.field_names.get(depth) else {
            return Ok(());
        };

        let level_filters: Vec<&Filter> = self
            .filters
            .iter()
            .filter(|filter| filter.field_name() == Some(field_name.as_str()))
            .collect();
        let reverse = self.scan_order.get(field_name).copied().unwrap_or(false);

        for (key, node) in self.candidates(level, &level_filters, reverse) {
            if !key_matches(&level_filters, key)? {
                continue;
            }

            match node {
                IndexNode::Ids(ids) => nitrite_ids.extend(ids.iter().copied()),
                IndexNode::Level(sub_level) => self.scan_level(sub_level, depth + 1, nitrite_ids)?,
            }
        }
        Ok(())
    }

    /// Keys of a level in scan order. An equality narrows the level to a
    /// single lookup.
    fn candidates<'l>(
        &self,
        level: &'l BTreeMap<Value, IndexNode>,
        level_filters: &[&Filter],
        reverse: bool,
    ) -> Vec<(&'l Value, &'l IndexNode)> {
        let equality = level_filters.iter().find_map(|filter| match filter {
            Filter::Comparison {
                op: ComparisonOp::Eq,
                value,
                ..
            } => Some(value),
            _ => None,
        });
        if let Some(value) = equality {
            return level.get_key_value(value).into_iter().collect();
        }

        let non_null = level.iter().filter(|(key, _)| !key.is_null());
        let mut entries: Vec<(&Value, &IndexNode)> = if reverse {
            non_null.rev().collect()
        } else {
            non_null.collect()
        };

        if let Some(null_entry) = level.get_key_value(&Value::Null) {
            if self.nulls_first {
                entries.insert(0, null_entry);
            } else {
                entries.push(null_entry);
            }
        }
        entries
    }
}

fn key_matches(filters: &[&Filter], key: &Value) -> NitriteResult<bool> {
    for filter in filters {
        if !filter.apply_on_element(key)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn find_ids<'a>(root: &'a BTreeMap<Value, IndexNode>, path: &[Value]) -> Option<&'a Vec<NitriteId>> {
    let (key, rest) = path.split_first()?;
    match root.get(key)? {
        IndexNode::Ids(ids) if rest.is_empty() => Some(ids),
        IndexNode::Level(level) => find_ids(level, rest),
        IndexNode::Ids(_) => None,
    }
}

fn insert_id(level: &mut BTreeMap<Value, IndexNode>, path: &[Value], nitrite_id: NitriteId) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        let node = level.entry(key.clone()).or_insert_with(|| IndexNode::Ids(Vec::new()));
        if let IndexNode::Ids(ids) = node {
            if !ids.contains(&nitrite_id) {
                ids.push(nitrite_id);
            }
        }
    } else {
        let node = level
            .entry(key.clone())
            .or_insert_with(|| IndexNode::Level(BTreeMap::new()));
        if let IndexNode::Level(sub_level) = node {
            insert_id(sub_level, rest, nitrite_id);
        }
    }
}

fn remove_id(level: &mut BTreeMap<Value, IndexNode>, path: &[Value], nitrite_id: &NitriteId) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };

    let now_empty = match level.get_mut(key) {
        Some(IndexNode::Ids(ids)) => {
            ids.retain(|id| id != nitrite_id);
            ids.is_empty()
        }
        Some(IndexNode::Level(sub_level)) => {
            remove_id(sub_level, rest, nitrite_id);
            sub_level.is_empty()
        }
        None => false,
    };

    if now_empty {
        level.remove(key);
    }
}
