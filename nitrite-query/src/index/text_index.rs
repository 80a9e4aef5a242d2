use super::{nitrite_index::NitriteIndexProvider, IndexDescriptor};
use crate::{
    collection::{FindPlan, NitriteId},
    common::{parse_text_query, tokenize, FieldValues, TextTerm, Value},
    errors::{ErrorKind, NitriteError, NitriteResult},
    filter::Filter,
};
use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound::{Included, Unbounded};
use std::sync::Arc;

/// A full-text index on a single string field.
///
/// Strings are split into lowercase words and each word maps to the records
/// containing it. Queries are answered from the word map: exact words by
/// lookup, `pre*` by a range scan, `*suf` and `*mid*` by scanning the words.
#[derive(Clone)]
pub struct TextIndex {
    inner: Arc<TextIndexInner>,
}

struct TextIndexInner {
    index_descriptor: IndexDescriptor,
    words: RwLock<BTreeMap<String, Vec<NitriteId>>>,
}

impl TextIndex {
    pub fn new(index_descriptor: IndexDescriptor) -> TextIndex {
        TextIndex {
            inner: Arc::new(TextIndexInner {
                index_descriptor,
                words: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    fn words_of(&self, field_values: &FieldValues) -> NitriteResult<HashSet<String>> {
        let mut words = HashSet::new();
        for (field, value) in field_values.values() {
            match value {
                Value::Null => {}
                Value::String(text) => words.extend(tokenize(text)),
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(text) => words.extend(tokenize(text)),
                            Value::Null => {}
                            other => return Err(not_text(field, other)),
                        }
                    }
                }
                other => return Err(not_text(field, other)),
            }
        }
        Ok(words)
    }

    fn search(&self, query: &str) -> NitriteResult<Vec<NitriteId>> {
        let terms = parse_text_query(query)?;
        let words = self.inner.words.read();
        let mut nitrite_ids = Vec::new();

        for term in terms {
            match &term {
                TextTerm::Exact(word) => {
                    if let Some(ids) = words.get(word) {
                        nitrite_ids.extend(ids.iter().copied());
                    }
                }
                TextTerm::Prefix(prefix) => {
                    for (_, ids) in words
                        .range::<String, _>((Included(prefix), Unbounded))
                        .take_while(|(word, _)| word.starts_with(prefix.as_str()))
                    {
                        nitrite_ids.extend(ids.iter().copied());
                    }
                }
                TextTerm::Suffix(_) | TextTerm::Contains(_) => {
                    for (_, ids) in words.iter().filter(|(word, _)| term.matches(word)) {
                        nitrite_ids.extend(ids.iter().copied());
                    }
                }
            }
        }
        Ok(nitrite_ids.into_iter().unique().collect())
    }
}

fn not_text(field: &str, value: &Value) -> NitriteError {
    log::error!("Full-text index on {} found non string value {}", field, value);
    NitriteError::new(
        &format!("Full-text index can only be applied on string values, found {} in {}", value, field),
        ErrorKind::IndexingError,
    )
}

impl NitriteIndexProvider for TextIndex {
    fn index_descriptor(&self) -> IndexDescriptor {
        self.inner.index_descriptor.clone()
    }

    fn write(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let words = self.words_of(field_values)?;
        let nitrite_id = *field_values.nitrite_id();
        let mut index = self.inner.words.write();
        for word in words {
            let ids = index.entry(word).or_default();
            if !ids.contains(&nitrite_id) {
                ids.push(nitrite_id);
            }
        }
        Ok(())
    }

    fn remove(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let Ok(words) = self.words_of(field_values) else {
            return Ok(());
        };
        let mut index = self.inner.words.write();
        for word in words {
            if let Some(ids) = index.get_mut(&word) {
                ids.retain(|id| id != field_values.nitrite_id());
                if ids.is_empty() {
                    index.remove(&word);
                }
            }
        }
        Ok(())
    }

    fn drop_index(&self) -> NitriteResult<()> {
        self.inner.words.write().clear();
        Ok(())
    }

    /// Answers every text filter of the plan; records must match all of them.
    fn find_nitrite_ids(&self, find_plan: &FindPlan) -> NitriteResult<Vec<NitriteId>> {
        let mut result: Option<Vec<NitriteId>> = None;
        for filter in find_plan.index_scan_filter() {
            let Filter::Text { query, .. } = filter else {
                log::error!("Full-text index cannot answer filter {}", filter);
                return Err(NitriteError::new(
                    &format!("Full-text index cannot answer filter {}", filter),
                    ErrorKind::FilterError,
                ));
            };

            let ids = self.search(query)?;
            result = Some(match result {
                None => ids,
                Some(previous) => {
                    let current: HashSet<NitriteId> = ids.into_iter().collect();
                    previous.into_iter().filter(|id| current.contains(id)).collect()
                }
            });
        }
        Ok(result.unwrap_or_default())
    }

    fn is_unique(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Fields, FULL_TEXT_INDEX};
    use crate::filter::field;

    fn index() -> TextIndex {
        TextIndex::new(IndexDescriptor::new(
            FULL_TEXT_INDEX,
            Fields::with_names(vec!["body"]).unwrap(),
            "test",
        ))
    }

    fn write(index: &TextIndex, value: Value) -> NitriteResult<NitriteId> {
        let id = NitriteId::new();
        let field_values = FieldValues::new(
            vec![("body".to_string(), value)],
            id,
            index.index_descriptor().index_fields(),
        );
        index.write(&field_values)?;
        Ok(id)
    }

    fn find(index: &TextIndex, filters: Vec<Filter>) -> NitriteResult<Vec<NitriteId>> {
        let mut plan = FindPlan::new();
        plan.set_index_scan_filter(filters);
        index.find_nitrite_ids(&plan)
    }

    #[test]
    fn word_queries() {
        let index = index();
        let a = write(&index, Value::from("The quick brown fox")).unwrap();
        let b = write(&index, Value::from("A lazy brown dog")).unwrap();
        write(&index, Value::Null).unwrap();

        assert_eq!(find(&index, vec![field("body").text("fox")]).unwrap(), vec![a]);
        assert_eq!(find(&index, vec![field("body").text("BROWN")]).unwrap(), vec![a, b]);
        assert_eq!(find(&index, vec![field("body").text("fox dog")]).unwrap(), vec![a, b]);
        assert!(find(&index, vec![field("body").text("cat")]).unwrap().is_empty());
    }

    #[test]
    fn wildcard_queries() {
        let index = index();
        let a = write(&index, Value::from("quickly running")).unwrap();
        let b = write(&index, Value::from("quiet evening")).unwrap();

        assert_eq!(find(&index, vec![field("body").text("qui*")]).unwrap(), vec![a, b]);
        assert_eq!(find(&index, vec![field("body").text("*ning")]).unwrap(), vec![b, a]);
        assert_eq!(find(&index, vec![field("body").text("*ick*")]).unwrap(), vec![a]);

        let err = find(&index, vec![field("body").text("*")]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn multiple_text_filters_intersect() {
        let index = index();
        let a = write(&index, Value::from("red apple")).unwrap();
        write(&index, Value::from("red cherry")).unwrap();

        let ids = find(&index, vec![field("body").text("red"), field("body").text("apple")]).unwrap();
        assert_eq!(ids, vec![a]);
    }

    #[test]
    fn arrays_of_strings_and_non_strings() {
        let index = index();
        let a = write(&index, Value::from(vec!["one two", "three"])).unwrap();
        assert_eq!(find(&index, vec![field("body").text("three")]).unwrap(), vec![a]);

        let err = write(&index, Value::I32(5)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexingError);
    }

    #[test]
    fn remove_and_drop() {
        let index = index();
        let id = NitriteId::new();
        let field_values = FieldValues::new(
            vec![("body".to_string(), Value::from("hello world"))],
            id,
            index.index_descriptor().index_fields(),
        );
        index.write(&field_values).unwrap();
        index.remove(&field_values).unwrap();
        assert!(find(&index, vec![field("body").text("hello")]).unwrap().is_empty());

        write(&index, Value::from("hello")).unwrap();
        index.drop_index().unwrap();
        assert!(find(&index, vec![field("body").text("hello")]).unwrap().is_empty());
    }

    #[test]
    fn non_text_filter_is_rejected() {
        let index = index();
        let err = find(&index, vec![field("body").eq("x")]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }
}
