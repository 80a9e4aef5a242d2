use crate::collection::{Document, NitriteId};
use crate::common::{compare_values, text_of, Collation, NullOrder, SortOrder, Value};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use icu_collator::CollatorBorrowed;
use std::cmp::Ordering;

/// Multi-key comparator for documents.
///
/// Keys are compared in order. Null placement follows the [NullOrder] and is
/// not flipped by a descending key. Strings go through the ICU collator when a
/// [Collation] is configured. Array values cannot be sorted.
pub struct DocumentSorter {
    sort_order: Vec<(String, SortOrder)>,
    null_order: NullOrder,
    collator: Option<CollatorBorrowed<'static>>,
}

impl DocumentSorter {
    pub fn new(
        sort_order: Vec<(String, SortOrder)>,
        null_order: NullOrder,
        collation: Option<&Collation>,
    ) -> NitriteResult<Self> {
        let collator = match collation {
            Some(collation) => Some(collation.collator()?),
            None => None,
        };

        Ok(DocumentSorter {
            sort_order,
            null_order,
            collator,
        })
    }

    pub fn sort_order(&self) -> &[(String, SortOrder)] {
        &self.sort_order
    }

    /// Sorts the records in place. The sort is stable.
    ///
    /// Every sort key is read from every record before any comparison, so an
    /// invalid path or an array value fails the whole sort.
    pub fn sort(&self, records: Vec<(NitriteId, Document)>) -> NitriteResult<Vec<(NitriteId, Document)>> {
        let mut keyed = Vec::with_capacity(records.len());
        for (id, doc) in records {
            let keys = self.sort_keys(&doc)?;
            keyed.push((keys, id, doc));
        }

        keyed.sort_by(|(a, _, _), (b, _, _)| self.compare_keys(a, b));
        Ok(keyed.into_iter().map(|(_, id, doc)| (id, doc)).collect())
    }

    /// Compares two documents on every sort key.
    pub fn compare(&self, a: &Document, b: &Document) -> NitriteResult<Ordering> {
        let a_keys = self.sort_keys(a)?;
        let b_keys = self.sort_keys(b)?;
        Ok(self.compare_keys(&a_keys, &b_keys))
    }

    fn sort_keys(&self, doc: &Document) -> NitriteResult<Vec<Value>> {
        let mut keys = Vec::with_capacity(self.sort_order.len());
        for (field, _) in &self.sort_order {
            let value = doc.get(field)?;
            if value.is_array() {
                log::error!("Cannot sort on an array value of field {}", field);
                return Err(NitriteError::new(
                    &format!("Cannot sort on an array value of field {}", field),
                    ErrorKind::ValidationError,
                ));
            }
            keys.push(value);
        }
        Ok(keys)
    }

    fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        for ((a_value, b_value), (_, order)) in a.iter().zip(b).zip(&self.sort_order) {
            let cmp = match (a_value.is_null(), b_value.is_null()) {
                (true, true) => continue,
                (true, false) => return self.null_placement(),
                (false, true) => return self.null_placement().reverse(),
                (false, false) => self.compare_values(a_value, b_value),
            };

            if cmp != Ordering::Equal {
                return match order {
                    SortOrder::Ascending => cmp,
                    SortOrder::Descending => cmp.reverse(),
                };
            }
        }
        Ordering::Equal
    }

    #[inline]
    fn null_placement(&self) -> Ordering {
        if self.null_order.nulls_first() {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        if let Some(collator) = &self.collator {
            if let (Some(a_text), Some(b_text)) = (text_of(a), text_of(b)) {
                return collator.compare(&a_text, &b_text);
            }
        }
        compare_values(a, b).unwrap_or_else(|| a.cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use icu_collator::options::{CollatorOptions, Strength};

    fn records(docs: Vec<Document>) -> Vec<(NitriteId, Document)> {
        docs.into_iter().map(|mut d| (d.id().unwrap(), d)).collect()
    }

    fn names(sorted: &[(NitriteId, Document)]) -> Vec<String> {
        sorted
            .iter()
            .map(|(_, d)| d.get("name").unwrap().as_string().cloned().unwrap_or_default())
            .collect()
    }

    #[test]
    fn sorts_by_multiple_keys() {
        let sorter = DocumentSorter::new(
            vec![
                ("last".to_string(), SortOrder::Ascending),
                ("age".to_string(), SortOrder::Descending),
            ],
            NullOrder::Default,
            None,
        )
        .unwrap();

        let sorted = sorter
            .sort(records(vec![
                doc! { name: "c", last: "b", age: 1 },
                doc! { name: "a", last: "a", age: 10 },
                doc! { name: "d", last: "b", age: 5 },
                doc! { name: "b", last: "a", age: 20 },
            ]))
            .unwrap();
        assert_eq!(names(&sorted), vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn null_placement_ignores_direction() {
        let input = || {
            records(vec![
                doc! { name: "x", age: 2 },
                doc! { name: "n" },
                doc! { name: "y", age: 1 },
            ])
        };

        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let first = DocumentSorter::new(vec![("age".into(), order)], NullOrder::First, None)
                .unwrap()
                .sort(input())
                .unwrap();
            assert_eq!(names(&first)[0], "n");

            let last = DocumentSorter::new(vec![("age".into(), order)], NullOrder::Last, None)
                .unwrap()
                .sort(input())
                .unwrap();
            assert_eq!(names(&last)[2], "n");
        }

        let default = DocumentSorter::new(
            vec![("age".into(), SortOrder::Descending)],
            NullOrder::Default,
            None,
        )
        .unwrap()
        .sort(input())
        .unwrap();
        assert_eq!(names(&default), vec!["n", "x", "y"]);
    }

    #[test]
    fn sort_is_stable() {
        let sorter =
            DocumentSorter::new(vec![("k".into(), SortOrder::Ascending)], NullOrder::First, None).unwrap();
        let sorted = sorter
            .sort(records(vec![
                doc! { name: "1", k: 1 },
                doc! { name: "2", k: 0 },
                doc! { name: "3", k: 1 },
                doc! { name: "4", k: 0 },
            ]))
            .unwrap();
        assert_eq!(names(&sorted), vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn numbers_compare_across_kinds() {
        let sorter =
            DocumentSorter::new(vec![("v".into(), SortOrder::Ascending)], NullOrder::First, None).unwrap();
        let sorted = sorter
            .sort(records(vec![
                doc! { name: "a", v: 2.5 },
                doc! { name: "b", v: 1 },
                doc! { name: "c", v: 3u64 },
            ]))
            .unwrap();
        assert_eq!(names(&sorted), vec!["b", "a", "c"]);
    }

    #[test]
    fn arrays_cannot_be_sorted() {
        let sorter =
            DocumentSorter::new(vec![("v".into(), SortOrder::Ascending)], NullOrder::First, None).unwrap();
        let err = sorter
            .sort(records(vec![doc! { v: 1 }, doc! { v: [1, 2] }]))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn collator_orders_strings() {
        let plain =
            DocumentSorter::new(vec![("name".into(), SortOrder::Ascending)], NullOrder::First, None).unwrap();
        let input = || records(vec![doc! { name: "b" }, doc! { name: "B" }, doc! { name: "a" }]);
        assert_eq!(names(&plain.sort(input()).unwrap()), vec!["B", "a", "b"]);

        let mut options = CollatorOptions::default();
        options.strength = Some(Strength::Tertiary);
        let collation = Collation::from(options);
        let collated =
            DocumentSorter::new(vec![("name".into(), SortOrder::Ascending)], NullOrder::First, Some(&collation))
                .unwrap();
        assert_eq!(names(&collated.sort(input()).unwrap()), vec!["a", "b", "B"]);
    }

    #[test]
    fn compare_two_documents() {
        let sorter =
            DocumentSorter::new(vec![("v".into(), SortOrder::Descending)], NullOrder::First, None).unwrap();
        assert_eq!(
            sorter.compare(&doc! { v: 1 }, &doc! { v: 2 }).unwrap(),
            Ordering::Greater
        );
        assert_eq!(sorter.compare(&doc! {}, &doc! {}).unwrap(), Ordering::Equal);
    }
}
