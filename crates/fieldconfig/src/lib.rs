#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Nested configuration container with dotted paths, typed fields, lock and
//! freeze.
//!
//! A [`Config`] is an insertion-ordered tree of keys. Leaves are plain
//! [`Value`]s or typed [`Field`]s; interior nodes are child `Config`s.
//!
//! # Usage
//!
//! ```rust
//! use fieldconfig::{Config, Field, Value, ValueType, validator};
//!
//! let mut cfg = Config::new().with_intermediate_attribute_creation(true);
//! cfg.set("model.name", "resnet").unwrap();
//! cfg.set_field(
//!     "train.epochs",
//!     Field::typed(ValueType::Int)
//!         .with_validator(validator!(|x: &Value| x.as_int().is_some_and(|n| n > 0)))
//!         .with_required(true),
//! )
//! .unwrap();
//!
//! // Values are cast into the Field's declared type.
//! cfg.set("train.epochs", 12.7).unwrap();
//! assert_eq!(cfg["train.epochs"], Value::Int(12));
//!
//! // Once locked, a misspelt key is rejected with a suggestion.
//! cfg.child_mut("train").unwrap().lock();
//! let err = cfg.set("train.epoch", 3).unwrap_err();
//! assert!(err.to_string().contains("Did you mean \"epochs\""));
//! ```
//!
//! # Policies
//!
//! Each node carries three flags:
//!
//! 1. **Intermediate attribute creation**: missing subtrees along a write
//!    path are created on demand. Set recursively.
//! 2. **Lock**: no new keys on this node. Applies to one node only.
//! 3. **Freeze**: no writes at all on this node and everything below it.
//!
//! Lock and freeze cannot be undone.
//!
//! # Design
//!
//! This crate does no I/O. Mappings come in through [`Config::from_mapping`],
//! `serde_json` or `toml` values, and leave through [`Config::to_dict`],
//! [`Config::to_flat_dict`] or `serde`.

/// The nested configuration container.
pub mod config;
/// Configuration error types.
pub mod error;
/// Typed, validated leaf values.
pub mod field;
/// Conversion to and from serde data formats.
pub mod interop;
/// Tagged leaf values and their runtime types.
pub mod value;

// Re-export primary types at the crate root.
pub use config::{Config, RESERVED_KEYS};
pub use error::{ConfigError, ConfigResult, ErrorKind};
pub use field::{Field, Validator};
pub use value::{Mapping, Opaque, OpaqueType, Value, ValueType};
