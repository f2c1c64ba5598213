mod common;

use anyhow::Result;
use docql::{PathTarget, Translator, TranslatorConfig};
use serde_json::json;

#[test]
fn mapped_fields_compare_natively() -> Result<()> {
    let translator = common::mapped_translator();
    assert_eq!(translator.resolve("user_id"), PathTarget::Shadow("user_id".into()));

    assert_eq!(translator.find(json!({ "user_id": "2" })).to_sql()?, r#"SELECT "test"."data" FROM "test" WHERE "test"."user_id" = '2'"#);
    assert_eq!(
        translator.find(json!({ "created_at": { "$in": ["2014-01-01", "2015-01-01"] }, "foo": "bar" })).to_sql()?,
        r#"SELECT "test"."data" FROM "test" WHERE "test"."created_at" IN ('2014-01-01', '2015-01-01') AND data#>>'{foo}' = 'bar'"#
    );
    Ok(())
}

#[test]
fn custom_combinators_apply_to_mapped_columns() -> Result<()> {
    let translator = common::mapped_translator();
    assert_eq!(translator.where_clause(&json!({ "user_id": { "$land": "x" } }))?, r#""test"."user_id" && 'x'"#);
    assert_eq!(translator.where_clause(&json!({ "_id": { "$land": "x" } }))?, r#""test"."id" && 'x'"#);
    Ok(())
}

#[test]
fn insert_writes_present_mapped_columns() -> Result<()> {
    let translator = common::mapped_translator();
    let sql = translator.insert(&json!({ "_id": 1, "user_id": 2, "created_at": "2014-01-01 10:00:00", "foo": "bar" }))?;
    assert!(sql.starts_with(r#"INSERT INTO "test" ("id", "data", "user_id", "created_at") VALUES (1, '{"#), "{}", sql);
    assert!(sql.ends_with(r#"}', 2, '2014-01-01 10:00:00')"#), "{}", sql);
    assert!(!sql.contains("updated_at"));
    Ok(())
}

#[test]
fn update_sets_payload_then_mapped_columns() -> Result<()> {
    let translator = common::mapped_translator();
    let sql = translator.find(json!({ "_id": 1 })).update_sql(&json!({ "_id": 1, "user_id": 2, "created_at": "2014-01-01 10:00:00" }))?;
    assert_eq!(
        sql,
        r#"UPDATE "test" SET "data" = '{"_id":1,"user_id":2,"created_at":"2014-01-01 10:00:00"}', "user_id" = 2, "created_at" = '2014-01-01 10:00:00' WHERE "test"."id" = 1"#
    );
    Ok(())
}

#[test]
fn mapped_columns_may_be_renamed() -> Result<()> {
    let config = TranslatorConfig::from_json(r#"{ "table": "events", "mapped_properties": { "owner": "user_id" } }"#)?;
    let translator = Translator::from_config(config)?;
    assert_eq!(translator.where_clause(&json!({ "owner": 7 }))?, r#""events"."user_id" = 7"#);
    assert_eq!(
        translator.insert(&json!({ "_id": "e1", "owner": 7 }))?,
        r#"INSERT INTO "events" ("id", "data", "user_id") VALUES ('e1', '{"_id":"e1","owner":7}', 7)"#
    );
    Ok(())
}
