use std::str::FromStr;

use docql::{ComparisonOperator, CustomOperator, JsonSchema, Translator};
use serde_json::json;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// The `test` table with `$as` (equality) and `$land` (`&&`) registered.
#[allow(unused)]
pub fn translator() -> Translator {
    Translator::new("test")
        .with_custom_operator("$as", ComparisonOperator::Equal)
        .and_then(|t| t.with_custom_operator("$land", CustomOperator::infix("&&")))
        .unwrap()
}

#[allow(unused)]
pub fn schema() -> JsonSchema {
    JsonSchema::from_value(&json!({
        "type": "object",
        "properties": {
            "name": { "type": ["string", "null"] },
            "weight": { "type": "number" },
            "age": { "type": ["integer", "null"] },
            "tag": { "type": "array" },
            "active": { "type": "boolean" }
        }
    }))
    .unwrap()
}

#[allow(unused)]
pub fn mapped_translator() -> Translator { translator().with_mapped_properties(["user_id", "created_at", "updated_at"]) }
