use super::*;
use crate::error::ErrorKind;
use crate::field::Validator;
use crate::value::ValueType;

fn mapping(entries: Vec<(&str, Value)>) -> Mapping {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

fn sample() -> Mapping {
    mapping(vec![
        ("flt", Value::from(3.45)),
        ("usr", Value::from("alice")),
        ("qty", Value::from(5)),
        ("lst", Value::from(vec![3, 4, 5])),
        ("tpl", Value::tuple([10, 20])),
        (
            "nd",
            Value::Map(mapping(vec![
                ("flt", Value::from(-4.56)),
                ("subd", Value::Map(mapping(vec![("key", Value::from("hello"))]))),
            ])),
        ),
    ])
}

#[test]
fn test_instantiation_with_data() {
    let cfg = Config::from_mapping(sample()).unwrap();
    assert_eq!(cfg.to_dict(), sample());
    assert!(cfg["nd"].as_config().is_some());
    assert_eq!(cfg["nd.subd.key"], Value::from("hello"));
    assert_eq!(cfg.keys().collect::<Vec<_>>(), vec!["flt", "usr", "qty", "lst", "tpl", "nd"]);
}

#[test]
fn test_dynamic_item_set_and_get() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.child_mut("a.b").unwrap().set("c", 1).unwrap();
    cfg.set("a.b.c", 2).unwrap();
    assert_eq!(cfg["a.b.c"], Value::Int(2));
    assert_eq!(cfg.child_mut("a.b").unwrap()["c"], Value::Int(2));

    let mut cfg = Config::new();
    cfg.set("a", Config::new()).unwrap();
    cfg.child_mut("a").unwrap().set("b", 1).unwrap();
    cfg.set("a.b", 2).unwrap();
    assert_eq!(cfg["a.b"], Value::Int(2));
}

#[test]
fn test_intermediate_attribute_creation() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a.b", 1).unwrap();
    assert_eq!(cfg["a.b"], Value::Int(1));
    assert!(cfg.child_mut("a").unwrap().is_intermediate_attribute_creation_enabled());

    let mut cfg = Config::new();
    cfg.enable_intermediate_attribute_creation();
    cfg.set("a.b", 1).unwrap();
    assert_eq!(cfg["a.b"], Value::Int(1));

    let mut cfg = Config::new();
    let err = cfg.set("a.b", 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot add key a because the config has intermediate attribute creation disabled."
    );
    assert_eq!(err.kind(), ErrorKind::PathResolution);

    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.disable_intermediate_attribute_creation();
    let err = cfg.set("b.c", 2).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot add key b because the config has intermediate attribute creation disabled."
    );
}

#[test]
fn test_creation_policy_is_recursive() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a.b", 1).unwrap();
    cfg.disable_intermediate_attribute_creation();

    let err = cfg.set("a.x.y", 1).unwrap_err();
    assert!(matches!(err, ConfigError::IntermediateCreationDisabled { key } if key == "x"));
}

#[test]
fn test_mapping_values_inherit_creation_policy() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a", Value::Map(mapping(vec![("b", Value::from(1))])))
        .unwrap();
    cfg.set("a.c.d", 2).unwrap();
    assert_eq!(cfg["a.c.d"], Value::Int(2));
}

#[test]
fn test_reads_have_no_side_effects() {
    let cfg = Config::new();
    let err = cfg.get("missing").unwrap_err();
    assert!(matches!(err, ConfigError::IntermediateCreationDisabled { .. }));

    let cfg = Config::new().with_intermediate_attribute_creation(true);
    let err = cfg.get("a.b").unwrap_err();
    assert_eq!(err.to_string(), "Key 'a.b' not found");
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(!cfg.contains("a"));
    assert!(cfg.is_empty());
}

#[test]
fn test_traversing_a_leaf_fails() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a", 1).unwrap();

    let err = cfg.set("a.b", 2).unwrap_err();
    assert!(matches!(err, ConfigError::NotASubtree { ref key, .. } if key == "a"));
    assert!(matches!(cfg.get("a.b"), Err(ConfigError::NotASubtree { .. })));
}

#[test]
fn test_invalid_paths() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    for path in ["", "a.", ".a", "a..b"] {
        let err = cfg.set(path, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath, "{path}");
    }
}

#[test]
fn test_freeze() {
    let mut cfg = Config::new();
    assert!(!cfg.is_frozen());
    cfg.freeze();
    assert!(cfg.is_frozen());

    let mut cfg = Config::new();
    cfg.freeze();
    let err = cfg.set("a", 2).unwrap_err();
    assert_eq!(err.to_string(), "Config is frozen");

    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.freeze();
    let err = cfg.set("a.b", 1).unwrap_err();
    assert_eq!(err.to_string(), "Cannot add key a because the config is frozen.");
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn test_structural_checks_precede_creation_policy() {
    let mut cfg = Config::new();
    cfg.freeze();
    let err = cfg.set("a.b", 1).unwrap_err();
    assert_eq!(err.to_string(), "Cannot add key a because the config is frozen.");
    assert_eq!(err.kind(), ErrorKind::Structural);

    let mut cfg = Config::new();
    cfg.set("alpha", Config::new()).unwrap();
    cfg.lock();
    let err = cfg.set("alpah.x", 1).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::LockedKey { ref key, suggestion: Some(ref closest) }
            if key == "alpah" && closest == "alpha"
    ));
}

#[test]
fn test_policy_checks_precede_nested_mapping_errors() {
    let mut cfg = Config::new();
    cfg.freeze();
    let err = cfg
        .set("a", Value::Map(mapping(vec![("__str__", Value::from(1))])))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Frozen));

    let mut cfg = Config::new();
    cfg.lock();
    let err = cfg
        .set("a", Value::Map(mapping(vec![("__str__", Value::from(1))])))
        .unwrap_err();
    assert!(matches!(err, ConfigError::LockedKey { .. }));
}

#[test]
fn test_nested_mapping_dotted_keys_use_parent_policy() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a", Value::Map(mapping(vec![("x.y", Value::from(1))])))
        .unwrap();
    assert_eq!(cfg["a.x.y"], Value::Int(1));

    let mut cfg = Config::new();
    let err = cfg
        .set("a", Value::Map(mapping(vec![("x.y", Value::from(1))])))
        .unwrap_err();
    assert!(matches!(err, ConfigError::IntermediateCreationDisabled { ref key } if key == "x"));
}

#[test]
fn test_freeze_is_recursive() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a.b", 1).unwrap();
    cfg.freeze();

    assert!(cfg.child_mut("a").unwrap().is_frozen());
    assert!(matches!(cfg.set("a.b", 2), Err(ConfigError::Frozen)));
    assert!(matches!(cfg.delete("a.b"), Err(ConfigError::Frozen)));
    assert!(matches!(cfg.update(mapping(vec![("a.b", Value::from(3))])), Err(ConfigError::Frozen)));
    assert_eq!(cfg["a.b"], Value::Int(1));
}

#[test]
fn test_frozen_subtree_cannot_be_replaced_or_removed() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a.b", 1).unwrap();
    cfg.child_mut("a").unwrap().freeze();

    assert!(!cfg.is_frozen());
    let err = cfg.set("a", Value::Map(Mapping::new())).unwrap_err();
    assert!(matches!(err, ConfigError::Frozen));
    assert!(matches!(cfg.delete("a"), Err(ConfigError::Frozen)));

    cfg.set("c", 3).unwrap();
    assert_eq!(cfg["c"], Value::Int(3));
}

#[test]
fn test_set_attribute() {
    let mut cfg = Config::new();
    cfg.set("b", 1).unwrap();
    cfg.set("c", 2).unwrap();
    assert_eq!(
        cfg.to_dict(),
        mapping(vec![("b", Value::from(1)), ("c", Value::from(2))])
    );

    let mut cfg = Config::new();
    let err = cfg.set("__str__", 1).unwrap_err();
    assert_eq!(err.to_string(), "__str__ cannot be overridden.");
    assert_eq!(err.kind(), ErrorKind::ReservedName);
}

#[test]
fn test_reserved_names_in_paths_and_mappings() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    assert!(matches!(cfg.set("__dict__.a", 1), Err(ConfigError::ReservedName { .. })));

    let err = Config::from_mapping(mapping(vec![("__init__", Value::from(1))])).unwrap_err();
    assert_eq!(err.to_string(), "__init__ cannot be overridden.");
    assert!(RESERVED_KEYS.contains(&"__getattr__"));
}

#[test]
fn test_update() {
    let mut cfg = Config::new();
    cfg.set("a", Config::new()).unwrap();
    cfg.set("a.b", Config::new()).unwrap();
    cfg.set("a.b.c", 1).unwrap();
    cfg.set("a.b.d", 2).unwrap();
    cfg.update(mapping(vec![("a.b.c", Value::from(3)), ("a.b.d", Value::from(4))]))
        .unwrap();
    assert_eq!(cfg["a.b.c"], Value::Int(3));
    assert_eq!(cfg["a.b.d"], Value::Int(4));

    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.update(mapping(vec![("a.b.c", Value::from(3))])).unwrap();
    assert_eq!(cfg["a.b.c"], Value::Int(3));
}

#[test]
fn test_update_merges_nested_mappings() {
    let mut cfg = Config::from_mapping(sample()).unwrap();
    cfg.update(mapping(vec![(
        "nd",
        Value::Map(mapping(vec![(
            "subd",
            Value::Map(mapping(vec![("key", Value::from("world"))])),
        )])),
    )]))
    .unwrap();

    assert_eq!(cfg["nd.subd.key"], Value::from("world"));
    assert_eq!(cfg["nd.flt"], Value::Float(-4.56));
}

#[test]
fn test_update_preserves_leaf_type() {
    let mut cfg = Config::new();
    cfg.set("x", 2.0).unwrap();
    cfg.update(mapping(vec![("x", Value::from(4))])).unwrap();
    assert_eq!(cfg["x"], Value::Float(4.0));
    assert_eq!(cfg.field("x").unwrap().map(Field::ftype), Some(ValueType::Float));

    let err = cfg.update(mapping(vec![("x", Value::from("four"))])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot cast value 'four' of type 'str' to type 'float'."
    );
    assert_eq!(cfg["x"], Value::Float(4.0));
}

#[test]
fn test_update_stops_at_first_failure() {
    let mut cfg = Config::new();
    cfg.set("a", 1).unwrap();
    cfg.set("b", 2).unwrap();
    cfg.lock();

    let err = cfg
        .update(mapping(vec![
            ("a", Value::from(10)),
            ("zzz", Value::from(0)),
            ("b", Value::from(20)),
        ]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::LockedKey { .. }));
    assert_eq!(cfg["a"], Value::Int(10));
    assert_eq!(cfg["b"], Value::Int(2));
}

#[test]
fn test_set_does_not_pin_types() {
    let mut cfg = Config::new();
    cfg.set("x", 2.0).unwrap();
    cfg.set("x", "two").unwrap();
    assert_eq!(cfg["x"], Value::from("two"));
    assert!(cfg.field("x").unwrap().is_none());
}

#[test]
fn test_lock() {
    let mut cfg = Config::new();
    cfg.set("aaaaa", 1).unwrap();
    cfg.lock();
    assert!(cfg.is_locked());

    cfg.set("aaaaa", 2).unwrap();
    assert_eq!(cfg["aaaaa"], Value::Int(2));

    let err = cfg.set("aaaab", 3).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot add key aaaab because the config is locked.\n\
         Did you mean \"aaaaa\" instead of \"aaaab\"?"
    );

    let err = cfg.set("zzz", 3).unwrap_err();
    assert_eq!(err.to_string(), "Cannot add key zzz because the config is locked.");
}

#[test]
fn test_lock_is_per_node() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("model.lr", 0.1).unwrap();
    cfg.lock();

    cfg.set("model.momentum", 0.9).unwrap();
    assert!(!cfg.child_mut("model").unwrap().is_locked());

    let err = cfg.set("optim.lr", 0.1).unwrap_err();
    assert!(matches!(err, ConfigError::LockedKey { ref key, .. } if key == "optim"));

    let err = cfg.delete("model").unwrap_err();
    assert!(matches!(err, ConfigError::LockedRemoval { .. }));
}

#[test]
fn test_delete() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a.b", 1).unwrap();
    cfg.set("c", 2).unwrap();

    assert_eq!(cfg.delete("a.b").unwrap(), Value::Int(1));
    assert!(cfg.child_mut("a").unwrap().is_empty());
    assert!(cfg.contains("a"));

    assert_eq!(cfg.delete("c").unwrap(), Value::Int(2));
    assert_eq!(cfg.keys().collect::<Vec<_>>(), vec!["a"]);

    let err = cfg.delete("nope.x").unwrap_err();
    assert_eq!(err.to_string(), "Key 'nope.x' not found");
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(!cfg.contains("nope"));
}

#[test]
fn test_delete_through_leaf_is_a_lookup_error() {
    let mut cfg = Config::new();
    cfg.set("a", 1).unwrap();

    let err = cfg.delete("a.b").unwrap_err();
    assert_eq!(err.to_string(), "Key 'a.b' not found");
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(cfg["a"], Value::Int(1));
}

#[test]
fn test_subtree_override_rejected() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("a.b", 1).unwrap();

    let err = cfg.set("a", 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to override field 'a' with value '1' of type 'int'. \
         The field 'a' must be assigned a value of type 'Mapping'."
    );

    let err = cfg.set_field("a", Field::new(1, None).unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::SubtreeOverride { .. }));

    cfg.set("a", Value::Map(mapping(vec![("z", Value::from(9))])))
        .unwrap();
    assert_eq!(cfg.to_dict()["a"], Value::Map(mapping(vec![("z", Value::from(9))])));
}

#[test]
fn test_set_field() {
    let mut cfg = Config::new();
    let field = Field::new(1, Some(ValueType::Float))
        .unwrap()
        .with_validator(Validator::new("positive", |x| x.as_float().is_some_and(|f| f > 0.0)));
    cfg.set_field("lr", field).unwrap();
    assert_eq!(cfg["lr"], Value::Float(1.0));

    cfg.set("lr", 3).unwrap();
    assert_eq!(cfg["lr"], Value::Float(3.0));

    cfg.set("lr", -1).unwrap();
    let err = cfg.get("lr").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(cfg.to_dict()["lr"], Value::Float(-1.0));

    let err = cfg.set("lr", "fast").unwrap_err();
    assert!(matches!(err, ConfigError::Cast { .. }));
}

#[test]
fn test_required_field_in_config() {
    let mut cfg = Config::new();
    cfg.set_field("name", Field::typed(ValueType::Text).with_required(true))
        .unwrap();

    let err = cfg.get("name").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Value is None. Please set a valid value before retrieving."
    );
    cfg.set("name", "run-1").unwrap();
    assert_eq!(cfg["name"], Value::from("run-1"));
}

#[test]
fn test_mapping_field_rejected() {
    let mut cfg = Config::new();
    let err = cfg
        .set_field("m", Field::typed(ValueType::Mapping))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MappingField { .. }));
    assert!(cfg.is_empty());
}

#[test]
fn test_clone_is_independent() {
    let mut cfg = Config::from_mapping(sample()).unwrap();
    let copy = cfg.clone();
    cfg.set("nd.subd.key", "changed").unwrap();

    assert_eq!(copy["nd.subd.key"], Value::from("hello"));
    assert_ne!(copy, cfg);
}

#[test]
fn test_display() {
    let mut cfg = Config::new().with_intermediate_attribute_creation(true);
    cfg.set("name", "x").unwrap();
    cfg.set("nested.n", 1).unwrap();
    cfg.set("pair", Value::tuple([1.5, 2.0])).unwrap();
    assert_eq!(
        cfg.to_string(),
        r#"{"name": "x", "nested": {"n": 1}, "pair": (1.5, 2.0)}"#
    );
}

#[test]
#[should_panic(expected = "Key 'missing' not found")]
fn test_index_panics_on_missing_key() {
    let cfg = Config::new().with_intermediate_attribute_creation(true);
    let _ = &cfg["missing"];
}
