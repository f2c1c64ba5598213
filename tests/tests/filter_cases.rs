//! Filter Cases: filter documents and the WHERE text (or error) they compile to.
//!
//! Test cases loaded from `tests/filter_cases.json`. Each suite runs against the `test` table with
//! the `$as`/`$land` custom operators, either without a schema (`dynamic`) or with the shared
//! JSON-Schema (`schema`).

mod common;

use docql::{TranslateError, Translator};
use serde::Deserialize;

const FILTER_CASES_JSON: &str = include_str!("../filter_cases.json");

#[derive(Debug, Deserialize)]
struct FilterCases {
    suites: Vec<TestSuite>,
}
#[derive(Debug, Deserialize)]
struct TestSuite {
    name: String,
    mode: Mode,
    cases: Vec<TestCase>,
}
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    Dynamic,
    Schema,
}
#[derive(Debug, Deserialize)]
struct TestCase {
    name: String,
    filter: serde_json::Value,
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn all_suites() -> Vec<TestSuite> {
    let cases: FilterCases = serde_json::from_str(FILTER_CASES_JSON).expect("parse");
    cases.suites
}

fn translator(mode: Mode) -> Translator {
    match mode {
        Mode::Dynamic => common::translator(),
        Mode::Schema => common::translator().with_schema(common::schema()),
    }
}

/// `UnsupportedOperator("$bar")` -> `UnsupportedOperator`
fn variant(err: &TranslateError) -> String { format!("{:?}", err).split(['(', ' ', '{']).next().unwrap_or_default().to_string() }

#[test]
fn filter_cases() {
    let mut failures = Vec::new();
    let mut total = 0;

    for suite in all_suites() {
        let translator = translator(suite.mode);
        for case in suite.cases {
            total += 1;
            let label = format!("{} / {}", suite.name, case.name);
            let result = translator.where_clause(&case.filter);
            match (&case.sql, &case.error, result) {
                (Some(expected), None, Ok(sql)) if &sql == expected => {}
                (None, Some(expected), Err(err)) if &variant(&err) == expected => {}
                (sql, error, result) => failures.push(format!("{}: expected {:?}/{:?}, got {:?}", label, sql, error, result)),
            }
        }
    }

    tracing::info!("filter cases: {} run, {} failed", total, failures.len());
    assert!(failures.is_empty(), "{} of {} filter cases failed:\n{}", failures.len(), total, failures.join("\n"));
}

#[test]
fn every_case_has_one_expectation() {
    for suite in all_suites() {
        for case in &suite.cases {
            assert!(case.sql.is_some() != case.error.is_some(), "{} / {} must name exactly one of sql or error", suite.name, case.name);
        }
    }
}
