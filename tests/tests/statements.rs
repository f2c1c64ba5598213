mod common;

use anyhow::Result;
use docql::{TranslateError, Translator};
use serde_json::json;

#[test]
fn select_with_paging_and_sort() -> Result<()> {
    let translator = common::translator();

    assert_eq!(translator.find(json!({})).to_sql()?, r#"SELECT "test"."data" FROM "test""#);
    assert_eq!(translator.find(json!({ "_id": "foo" })).limit(1).to_sql()?, r#"SELECT "test"."data" FROM "test" WHERE "test"."id" = 'foo' LIMIT 1"#);
    assert_eq!(
        translator.find(json!({ "_id": "foo" })).limit(1).skip(10).to_sql()?,
        r#"SELECT "test"."data" FROM "test" WHERE "test"."id" = 'foo' LIMIT 1 OFFSET 10"#
    );
    assert_eq!(
        translator.find(json!({ "_id": "foo" })).skip(10).sort(json!({ "_id": 1 })).to_sql()?,
        r#"SELECT "test"."data" FROM "test" WHERE "test"."id" = 'foo' ORDER BY "test"."id" ASC OFFSET 10"#
    );
    assert_eq!(
        translator.find(json!({ "_id": "foo" })).sort(json!({ "name": -1, "email": 1 })).to_sql()?,
        r#"SELECT "test"."data" FROM "test" WHERE "test"."id" = 'foo' ORDER BY data#>>'{name}' DESC, data#>>'{email}' ASC"#
    );
    Ok(())
}

#[test]
fn sort_documents_accumulate() -> Result<()> {
    let translator = common::translator().with_schema(common::schema());
    let sql = translator.find(json!({ "active": true })).sort(json!({ "weight": -1 })).sort(json!({ "_id": "asc" })).to_sql()?;
    assert_eq!(
        sql,
        r#"SELECT "test"."data" FROM "test" WHERE (data#>>'{active}') = 'true' ORDER BY (data#>>'{weight}')::numeric DESC, "test"."id" ASC"#
    );
    Ok(())
}

#[test]
fn count_and_delete_share_the_condition() -> Result<()> {
    let translator = common::translator();
    let query = translator.find(json!({ "weight": { "$gt": 66 } }));
    assert_eq!(query.count_sql()?, r#"SELECT COUNT(*) FROM "test" WHERE (data#>>'{weight}')::integer > 66"#);
    assert_eq!(query.delete_sql()?, r#"DELETE FROM "test" WHERE (data#>>'{weight}')::integer > 66"#);
    Ok(())
}

#[test]
fn insert_quotes_the_payload() -> Result<()> {
    let translator = Translator::new("people");
    assert_eq!(
        translator.insert(&json!({ "_id": "p1", "name": "O'Brien", "tags": ["a"] }))?,
        r#"INSERT INTO "people" ("id", "data") VALUES ('p1', '{"_id":"p1","name":"O''Brien","tags":["a"]}')"#
    );
    assert_eq!(translator.insert(&json!({ "name": "nobody" })).unwrap_err(), TranslateError::MissingIdentity("_id".into()));
    Ok(())
}

#[test]
fn index_definitions() -> Result<()> {
    let translator = common::mapped_translator().with_schema(common::schema());
    assert_eq!(translator.index("weight").to_sql()?, r#"CREATE INDEX "test_weight_idx" ON "test" (((data#>>'{weight}')::numeric))"#);
    assert_eq!(translator.index("name").if_not_exists().to_sql()?, r#"CREATE INDEX IF NOT EXISTS "test_name_idx" ON "test" ((data#>>'{name}'))"#);
    assert_eq!(translator.index("user_id").unique().to_sql()?, r#"CREATE UNIQUE INDEX "test_user_id_idx" ON "test" ("user_id")"#);
    Ok(())
}

#[test]
fn projection() -> Result<()> {
    let translator = common::translator();
    let sql = translator.find(json!({ "name": "foo" })).select(["_id", "email.address"]).to_sql()?;
    assert_eq!(sql, r#"SELECT "test"."id", data#>>'{email,address}' FROM "test" WHERE data#>>'{name}' = 'foo'"#);
    Ok(())
}
