//! The nested configuration container.
//!
//! A [`Config`] maps string keys to values, where a value is either a leaf
//! payload, a typed [`Field`], or another `Config`. Every operation accepts a
//! dotted path (`"model.optimizer.lr"`) that is resolved one segment at a
//! time.
//!
//! Three per-node policies control mutation:
//!
//! - **intermediate attribute creation**: when enabled, writes (and
//!   [`Config::child_mut`]) create missing subtrees along the path.
//! - **lock**: no new keys on this node; existing keys may be reassigned.
//! - **freeze**: no writes of any kind on this node or anything below it.
//!
//! Lock and freeze are one-way.

mod convert;
mod path;
mod policy;
mod write;

#[cfg(test)]
mod tests;

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use tracing::debug;

pub use policy::RESERVED_KEYS;

use crate::error::{ConfigError, ConfigResult};
use crate::field::Field;
use crate::value::{Mapping, Value, fmt_mapping};

/// What a key is bound to.
#[derive(Debug, Clone)]
enum Slot {
    /// An untyped payload or a subtree.
    Value(Value),
    /// A typed leaf.
    Field(Field),
}

impl Slot {
    /// The stored value, without Field checks.
    fn raw(&self) -> &Value {
        match self {
            Self::Value(value) => value,
            Self::Field(field) => field.value(),
        }
    }

    /// The stored value, after Field checks.
    fn read(&self) -> ConfigResult<&Value> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Field(field) => field.get(),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Field(field) => field.into_value(),
        }
    }

    fn as_subtree(&self) -> Option<&Config> {
        match self {
            Self::Value(Value::Config(config)) => Some(config),
            _ => None,
        }
    }

    fn as_subtree_mut(&mut self) -> Option<&mut Config> {
        match self {
            Self::Value(Value::Config(config)) => Some(config),
            _ => None,
        }
    }
}

/// A nested, dictionary-like configuration container.
///
/// ```
/// use fieldconfig::{Config, Value};
///
/// let mut cfg = Config::new().with_intermediate_attribute_creation(true);
/// cfg.set("model.optimizer.lr", 0.1).unwrap();
/// cfg.lock();
///
/// assert_eq!(cfg["model.optimizer.lr"], Value::Float(0.1));
/// assert!(cfg.set("model.optimiser", 1).is_ok()); // only the root is locked
/// assert!(cfg.set("modle", 1).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: IndexMap<String, Slot>,
    create_intermediate_attributes: bool,
    frozen: bool,
    locked: bool,
}

impl Config {
    /// Create an empty, unlocked, unfrozen config with intermediate
    /// attribute creation disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from a nested mapping.
    ///
    /// Nested mappings become child configs; every other value is stored as
    /// given. Keys are written through [`Config::set`], so dotted keys are
    /// treated as paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is reserved, empty, or a dotted key needs
    /// an intermediate node that does not exist.
    pub fn from_mapping(mapping: Mapping) -> ConfigResult<Self> {
        let mut config = Self::new();
        for (key, value) in mapping {
            config.set(&key, value)?;
        }
        Ok(config)
    }

    /// Set the intermediate attribute creation policy on this node and every
    /// subtree below it.
    #[must_use]
    pub fn with_intermediate_attribute_creation(mut self, enabled: bool) -> Self {
        self.set_intermediate_attribute_creation(enabled);
        self
    }

    /// Enable intermediate attribute creation on this node and every subtree
    /// below it.
    pub fn enable_intermediate_attribute_creation(&mut self) {
        self.set_intermediate_attribute_creation(true);
        debug!("enabled intermediate attribute creation");
    }

    /// Disable intermediate attribute creation on this node and every
    /// subtree below it.
    pub fn disable_intermediate_attribute_creation(&mut self) {
        self.set_intermediate_attribute_creation(false);
        debug!("disabled intermediate attribute creation");
    }

    /// Whether missing nodes are created on demand.
    #[must_use]
    pub fn is_intermediate_attribute_creation_enabled(&self) -> bool {
        self.create_intermediate_attributes
    }

    fn set_intermediate_attribute_creation(&mut self, enabled: bool) {
        self.create_intermediate_attributes = enabled;
        for child in self.subtrees_mut() {
            child.set_intermediate_attribute_creation(enabled);
        }
    }

    /// Freeze this node and every subtree below it. Irreversible.
    pub fn freeze(&mut self) {
        self.freeze_recursive();
        debug!(keys = self.entries.len(), "config frozen");
    }

    fn freeze_recursive(&mut self) {
        self.frozen = true;
        for child in self.subtrees_mut() {
            child.freeze_recursive();
        }
    }

    /// Whether this node rejects all writes.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Lock this node against new keys. Subtrees are unaffected.
    /// Irreversible.
    pub fn lock(&mut self) {
        self.locked = true;
        debug!(keys = self.entries.len(), "config locked");
    }

    /// Whether this node rejects new keys.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Read the value at `path`.
    ///
    /// Field-backed leaves are checked (required and validator) before
    /// their value is returned. Subtrees are returned as
    /// [`Value::Config`]. Reads never create nodes.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::IntermediateCreationDisabled`] if a segment is
    ///   missing on a node with intermediate creation disabled.
    /// - [`ConfigError::KeyNotFound`] if a segment is missing otherwise.
    /// - [`ConfigError::NotASubtree`] if a parent segment is a leaf.
    /// - [`ConfigError::RequiredValue`] / [`ConfigError::Validation`] from
    ///   the leaf's Field.
    pub fn get(&self, path: &str) -> ConfigResult<&Value> {
        self.lookup(path)?.read()
    }

    /// The Field backing the leaf at `path`, if the leaf is typed.
    ///
    /// # Errors
    ///
    /// Same resolution errors as [`Config::get`].
    pub fn field(&self, path: &str) -> ConfigResult<Option<&Field>> {
        match self.lookup(path)? {
            Slot::Field(field) => Ok(Some(field)),
            Slot::Value(_) => Ok(None),
        }
    }

    /// Whether `path` resolves to a bound key.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_ok()
    }

    /// Navigate to the subtree at `path`, creating missing nodes when
    /// intermediate attribute creation is enabled.
    ///
    /// This is the equivalent of chained attribute access (`cfg.a.b`).
    ///
    /// # Errors
    ///
    /// - [`ConfigError::IntermediateCreationDisabled`] if a segment is
    ///   missing and creation is disabled.
    /// - [`ConfigError::FrozenKey`] / [`ConfigError::LockedKey`] if a missing
    ///   segment would be added to a frozen or locked node.
    /// - [`ConfigError::NotASubtree`] if a segment is a leaf.
    pub fn child_mut(&mut self, path: &str) -> ConfigResult<&mut Config> {
        let segments = path::segments(path)?;
        self.descend_mut(&segments)
    }

    /// Keys of this node, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Key/value pairs of this node, in insertion order, without Field
    /// checks.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(key, slot)| (key.as_str(), slot.raw()))
    }

    /// Number of keys on this node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this node has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, path: &str) -> ConfigResult<&Slot> {
        let (parents, key) = path::split_last(path)?;
        let node = self.descend(&parents, path)?;
        node.entries
            .get(key)
            .ok_or_else(|| node.missing_key(key, path))
    }

    fn descend(&self, segments: &[&str], path: &str) -> ConfigResult<&Config> {
        let mut node = self;
        for segment in segments {
            let slot = node
                .entries
                .get(*segment)
                .ok_or_else(|| node.missing_key(segment, path))?;
            node = slot
                .as_subtree()
                .ok_or_else(|| not_a_subtree(segment, slot))?;
        }
        Ok(node)
    }

    fn missing_key(&self, key: &str, path: &str) -> ConfigError {
        if self.create_intermediate_attributes {
            ConfigError::KeyNotFound {
                key: path.to_owned(),
            }
        } else {
            ConfigError::IntermediateCreationDisabled {
                key: key.to_owned(),
            }
        }
    }

    fn subtrees_mut(&mut self) -> impl Iterator<Item = &mut Config> {
        self.entries.values_mut().filter_map(Slot::as_subtree_mut)
    }
}

fn not_a_subtree(key: &str, slot: &Slot) -> ConfigError {
    ConfigError::NotASubtree {
        key: key.to_owned(),
        value_type: slot.raw().value_type().to_string(),
    }
}

impl PartialEq for Config {
    /// Two configs are equal when they hold equal values under the same
    /// keys. Policy flags and Field metadata are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(key, slot)| {
                other
                    .entries
                    .get(key)
                    .is_some_and(|other_slot| slot.raw() == other_slot.raw())
            })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_mapping(self.entries.iter().map(|(key, slot)| (key, slot.raw())), f)
    }
}

impl Index<&str> for Config {
    type Output = Value;

    /// Dotted-path read, equivalent to [`Config::get`].
    ///
    /// # Panics
    ///
    /// Panics if [`Config::get`] fails.
    fn index(&self, path: &str) -> &Value {
        match self.get(path) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl TryFrom<Mapping> for Config {
    type Error = ConfigError;

    fn try_from(mapping: Mapping) -> ConfigResult<Self> {
        Self::from_mapping(mapping)
    }
}
