use icu::locale::locale;
use icu_collator::options::CollatorOptions;
use nitrite_query::collection::{distinct, limit_to, order_by, skip_by, FindOptions};
use nitrite_query::common::{Collation, NullOrder, SortOrder, Value};
use nitrite_query::doc;
use nitrite_query::errors::ErrorKind;
use nitrite_query::filter::{all, and, by_id, field, or};
use nitrite_query::index::non_unique_index;
use nitrite_query_int_test::test_util::{cleanup, create_test_context, insert_test_documents, is_sorted, run_test};

fn strings(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}

#[test]
fn test_find_all() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            insert_test_documents(&coll)?;

            let cursor = coll.find(all())?;
            assert_eq!(cursor.size()?, 3);
            assert_eq!(coll.find_all()?.size()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            insert_test_documents(&coll)?;

            assert_eq!(coll.find(field("age").gt(12))?.size()?, 1);
            assert_eq!(coll.find(field("age").gte(12))?.size()?, 2);
            assert_eq!(coll.find(field("age").lt(12))?.size()?, 1);
            assert_eq!(coll.find(field("age").lte(14))?.size()?, 3);
            assert_eq!(coll.find(field("age").between_inclusive(10, 12))?.size()?, 2);

            let cursor = coll.find(field("age").lte(14).and(field("first_name").eq("fn1")))?;
            assert_eq!(cursor.size()?, 1);

            let cursor = coll.find(field("age").lte(14).or(field("first_name").eq("fn12")))?;
            assert_eq!(cursor.size()?, 3);

            let nested = and(vec![
                or(vec![field("age").lte(14), field("first_name").eq("fn12")]),
                field("last_name").eq("ln1"),
            ]);
            assert_eq!(coll.find(nested.clone())?.size()?, 1);
            assert_eq!(coll.find(nested.not())?.size()?, 2);

            assert_eq!(coll.find(field("arr.1").eq(4))?.size()?, 2);
            assert_eq!(coll.find(field("arr.1").lt(4))?.size()?, 1);
            assert_eq!(coll.find(field("list").eq("three"))?.size()?, 2);

            let cursor = coll.find(field("last_name").in_array(vec!["ln1", "ln2", "ln10"]))?;
            assert_eq!(cursor.size()?, 3);
            let cursor = coll.find(field("first_name").not_in_array(vec!["fn1", "fn2"]))?;
            assert_eq!(cursor.size()?, 1);

            assert_eq!(coll.find(all().not())?.size()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            let result = coll.insert(doc! { name: "only" })?;
            let id = result.affected_nitrite_ids()[0];
            insert_test_documents(&coll)?;

            let cursor = coll.find(by_id(id))?;
            let docs: Vec<_> = cursor.iter().collect::<Result<_, _>>()?;
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].get("name")?, Value::from("only"));

            let cursor = coll.find(by_id(id).and(field("name").eq("other")))?;
            assert_eq!(cursor.size()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_skip_limit() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            insert_test_documents(&coll)?;

            assert_eq!(coll.find_with_options(all(), &skip_by(0).limit(1))?.size()?, 1);
            assert_eq!(coll.find_with_options(all(), &skip_by(1).limit(3))?.size()?, 2);
            assert_eq!(coll.find_with_options(all(), &skip_by(0).limit(30))?.size()?, 3);
            assert_eq!(coll.find_with_options(all(), &skip_by(2).limit(3))?.size()?, 1);
            assert_eq!(coll.find_with_options(all(), &skip_by(3))?.size()?, 0);
            assert_eq!(coll.find_with_options(all(), &limit_to(0))?.size()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_negative_skip_limit() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            insert_test_documents(&coll)?;

            let err = coll.find_with_options(all(), &skip_by(-1)).err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);

            let err = coll.find_with_options(all(), &limit_to(-1)).err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_sorted() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            insert_test_documents(&coll)?;

            let cursor = coll.find_with_options(all(), &order_by("age", SortOrder::Descending))?;
            let ages: Vec<Value> = cursor.iter().map(|d| d.unwrap().get("age").unwrap()).collect();
            assert_eq!(ages, vec![Value::I32(14), Value::I32(12), Value::I32(10)]);

            let options = order_by("last_name", SortOrder::Ascending).sort_by("first_name", SortOrder::Descending);
            let cursor = coll.find_with_options(all(), &options)?;
            let names = strings(cursor.iter().map(|d| d.unwrap().get("first_name").unwrap()).collect());
            assert_eq!(names, vec!["fn1", "fn3", "fn2"]);

            let options = order_by("age", SortOrder::Ascending).skip(1).limit(1);
            let cursor = coll.find_with_options(all(), &options)?;
            let ages: Vec<Value> = cursor.iter().map(|d| d.unwrap().get("age").unwrap()).collect();
            assert_eq!(ages, vec![Value::I32(12)]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_by_indexed_field_matches_blocking_sort() {
    run_test(
        create_test_context,
        |ctx| {
            let plain = ctx.collection("plain")?;
            let indexed = ctx.collection("indexed")?;
            indexed.create_index(vec!["score"], &non_unique_index())?;

            for score in [5, 3, 9, 1, 7, 3, 8] {
                plain.insert(doc! { score: score })?;
                indexed.insert(doc! { score: score })?;
            }

            for order in [SortOrder::Ascending, SortOrder::Descending] {
                let options = order_by("score", order);
                let expected: Vec<Value> = plain
                    .find_with_options(field("score").gt(2), &options)?
                    .iter()
                    .map(|d| d.unwrap().get("score").unwrap())
                    .collect();
                let cursor = indexed.find_with_options(field("score").gt(2), &options)?;
                assert!(cursor.find_plan().unwrap().blocking_sort_order().is_empty());
                let actual: Vec<Value> = cursor.iter().map(|d| d.unwrap().get("score").unwrap()).collect();

                assert_eq!(actual, expected);
                assert!(is_sorted(actual, order == SortOrder::Ascending));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_null_order() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            coll.insert_many(vec![
                doc! { name: "b", rank: 2 },
                doc! { name: "none" },
                doc! { name: "a", rank: 1 },
            ])?;

            let options = order_by("rank", SortOrder::Ascending);
            let names = strings(
                coll.find_with_options(all(), &options)?
                    .iter()
                    .map(|d| d.unwrap().get("name").unwrap())
                    .collect(),
            );
            assert_eq!(names, vec!["none", "a", "b"]);

            let options = order_by("rank", SortOrder::Descending).null_order(NullOrder::Last);
            let names = strings(
                coll.find_with_options(all(), &options)?
                    .iter()
                    .map(|d| d.unwrap().get("name").unwrap())
                    .collect(),
            );
            assert_eq!(names, vec!["b", "a", "none"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_with_collation() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            coll.insert(doc! { id: "test-1", fruit: "Apple" })?;
            coll.insert(doc! { id: "test-2", fruit: "Ôrange" })?;
            coll.insert(doc! { id: "test-3", fruit: "Pineapple" })?;

            let collation = Collation::new(locale!("fr").into(), CollatorOptions::default());
            let options = order_by("fruit", SortOrder::Ascending).collation(collation);
            let cursor = coll.find_with_options(all(), &options)?;
            let fruits = strings(cursor.iter().map(|d| d.unwrap().get("fruit").unwrap()).collect());
            assert_eq!(fruits, vec!["Apple", "Ôrange", "Pineapple"]);

            let cursor = coll.find_with_options(all(), &order_by("fruit", SortOrder::Ascending))?;
            let fruits = strings(cursor.iter().map(|d| d.unwrap().get("fruit").unwrap()).collect());
            assert_eq!(fruits, vec!["Apple", "Pineapple", "Ôrange"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_distinct() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            insert_test_documents(&coll)?;

            let filter = or(vec![field("last_name").eq("ln2"), field("age").lt(13)]);
            assert_eq!(coll.find(filter.clone())?.size()?, 3);
            assert_eq!(coll.find_with_options(filter, &distinct())?.size()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_regex_and_elem_match() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("test")?;
            insert_test_documents(&coll)?;
            coll.insert(doc! { scores: [{ subject: "math", mark: 90 }, { subject: "art", mark: 40 }] })?;

            assert_eq!(coll.find(field("first_name").text_regex("^fn[12]$")?)?.size()?, 2);

            let good_math = field("subject").eq("math").and(field("mark").gte(80));
            assert_eq!(coll.find(field("scores").elem_match(good_math))?.size()?, 1);

            let good_art = field("subject").eq("art").and(field("mark").gte(80));
            assert_eq!(coll.find(field("scores").elem_match(good_art))?.size()?, 0);

            assert_eq!(coll.find(field("arr").elem_match(field("$").gt(8)))?.size()?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_on_empty_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let coll = ctx.collection("empty")?;
            let options = FindOptions::new().sort_by("x", SortOrder::Ascending).skip(5).limit(5);
            let cursor = coll.find_with_options(field("x").eq(1), &options)?;
            assert_eq!(cursor.size()?, 0);
            assert!(cursor.first().is_none());
            Ok(())
        },
        cleanup,
    )
}
