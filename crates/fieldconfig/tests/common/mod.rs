//! Shared fixtures for integration tests.

use fieldconfig::{Config, Mapping, Value};
use serde_json::json;

/// A mapping with one of every payload shape, including a nested subtree.
#[allow(dead_code)]
pub fn sample_mapping() -> Mapping {
    let mut mapping = match Value::from(json!({
        "flt": 3.45,
        "usr": "alice",
        "qty": 5,
        "lst": [3, 4, 5],
    })) {
        Value::Map(map) => map,
        other => panic!("fixture is not a mapping: {other}"),
    };
    mapping.insert("tpl".to_owned(), Value::tuple([10, 20]));
    mapping.insert(
        "nd".to_owned(),
        Value::from(json!({"flt": -4.56, "subd": {"key": "hello"}})),
    );
    mapping
}

/// A config built from [`sample_mapping`] with intermediate attribute
/// creation enabled.
#[allow(dead_code)]
pub fn sample_config() -> Config {
    Config::from_mapping(sample_mapping())
        .expect("fixture mapping is valid")
        .with_intermediate_attribute_creation(true)
}

/// Build a mapping from literal pairs.
#[allow(dead_code)]
pub fn mapping(entries: Vec<(&str, Value)>) -> Mapping {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}
