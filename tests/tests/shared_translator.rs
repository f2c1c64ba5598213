mod common;

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use docql::Predicate;
use serde_json::json;

#[test]
fn condition_is_built_once_per_query() -> Result<()> {
    let translator = common::translator();
    let query = translator.find(json!({ "name": "foo", "$or": [{ "a": 1 }, { "b": 2 }] }));

    let first: &Predicate = query.condition()?.expect("condition");
    let second: &Predicate = query.condition()?.expect("condition");
    assert!(std::ptr::eq(first, second));

    // Rendering reuses the same tree
    let sql = query.to_sql()?;
    assert!(std::ptr::eq(first, query.condition()?.expect("condition")));
    assert_eq!(sql, r#"SELECT "test"."data" FROM "test" WHERE data#>>'{name}' = 'foo' AND ((data#>>'{a}')::integer = 1 OR (data#>>'{b}')::integer = 2)"#);
    Ok(())
}

#[test]
fn translator_is_shared_across_threads() {
    let translator = Arc::new(common::translator().with_schema(common::schema()));

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let translator = translator.clone();
                scope.spawn(move || translator.where_clause(&json!({ "weight": { "$gt": i } })))
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let sql = handle.join().expect("thread panicked").expect("translate");
            assert_eq!(sql, format!("(data#>>'{{weight}}')::numeric > {}", i));
        }
    });
}

#[test]
fn queries_from_one_translator_are_independent() -> Result<()> {
    let translator = common::translator();
    let a = translator.find(json!({ "name": "a" })).limit(1);
    let b = translator.find(json!({ "name": "b" }));
    assert_eq!(b.to_sql()?, r#"SELECT "test"."data" FROM "test" WHERE data#>>'{name}' = 'b'"#);
    assert_eq!(a.to_sql()?, r#"SELECT "test"."data" FROM "test" WHERE data#>>'{name}' = 'a' LIMIT 1"#);
    Ok(())
}
