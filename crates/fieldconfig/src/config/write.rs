//! Write, delete and update operations.

use indexmap::map::Entry;
use tracing::{debug, trace};

use super::policy::{check_reserved, closest_key};
use super::{Config, Slot, not_a_subtree, path};
use crate::error::{ConfigError, ConfigResult};
use crate::field::Field;
use crate::value::{Mapping, Value, ValueType};

/// How a write treats an existing untyped leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overwrite {
    /// Replace it.
    Replace,
    /// Pin its current type in a Field, then cast the new value into it.
    Typed,
}

impl Config {
    /// Bind `value` at `path`.
    ///
    /// Missing parent nodes are created when intermediate attribute creation
    /// is enabled. A plain [`Value::Map`] becomes a child config. If the key
    /// already holds a [`Field`], the value is cast into the Field's type.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReservedName`] for reserved keys.
    /// - [`ConfigError::Frozen`] if the target node is frozen.
    /// - [`ConfigError::LockedKey`] if the key is new and the node is locked.
    /// - [`ConfigError::SubtreeOverride`] if the key holds a subtree and the
    ///   value is not a mapping.
    /// - [`ConfigError::Cast`] if the key holds a Field of an incompatible
    ///   type.
    /// - Any error of [`Config::child_mut`] for the parent path.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> ConfigResult<()> {
        let (parents, key) = path::split_last(path)?;
        self.descend_mut(&parents)?
            .bind(key, Slot::Value(value.into()), Overwrite::Replace)
    }

    /// Bind a typed [`Field`] at `path`, replacing whatever the key held.
    ///
    /// # Errors
    ///
    /// Same as [`Config::set`], plus [`ConfigError::MappingField`] when the
    /// Field is declared as a mapping.
    pub fn set_field(&mut self, path: &str, field: Field) -> ConfigResult<()> {
        let (parents, key) = path::split_last(path)?;
        if field.ftype() == ValueType::Mapping {
            return Err(ConfigError::MappingField {
                key: key.to_owned(),
            });
        }
        self.descend_mut(&parents)?
            .bind(key, Slot::Field(field), Overwrite::Replace)
    }

    /// Remove the key at `path` and return its value.
    ///
    /// Only the final segment is removed; its parent stays in place, even if
    /// it becomes empty.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::KeyNotFound`] if any segment is missing or a parent
    ///   segment holds a leaf.
    /// - [`ConfigError::Frozen`] if the parent node or the removed subtree
    ///   is frozen.
    /// - [`ConfigError::LockedRemoval`] if the parent node is locked.
    pub fn delete(&mut self, path: &str) -> ConfigResult<Value> {
        let (parents, key) = path::split_last(path)?;
        self.descend_existing_mut(&parents, path)?
            .remove(key, path)
    }

    /// Merge `mapping` into this config.
    ///
    /// Keys may be dotted paths, nested mappings, or both. Nested mappings
    /// that land on existing subtrees are merged recursively; everything
    /// else is written like [`Config::set`], except that an existing
    /// untyped leaf first has its type pinned in a [`Field`], so the new
    /// value is cast to the old type (`2.0` updated with `4` stays a float).
    ///
    /// Entries are applied in order and the first failure stops the update;
    /// entries applied before it are kept.
    ///
    /// # Errors
    ///
    /// Any error [`Config::set`] can return, plus [`ConfigError::Cast`] when
    /// a value does not fit a leaf's pinned type.
    pub fn update(&mut self, mapping: impl Into<Mapping>) -> ConfigResult<()> {
        let mapping = mapping.into();
        debug!(entries = mapping.len(), "updating config");
        for (path, value) in mapping {
            self.update_entry(&path, value)?;
        }
        Ok(())
    }

    fn update_entry(&mut self, path: &str, value: Value) -> ConfigResult<()> {
        let merges_into_subtree =
            value.is_mapping() && self.lookup(path).is_ok_and(|slot| slot.as_subtree().is_some());
        if merges_into_subtree {
            let nested = match value {
                Value::Config(config) => config.to_dict(),
                Value::Map(map) => map,
                _ => Mapping::new(),
            };
            return self.child_mut(path)?.update(nested);
        }

        let (parents, key) = path::split_last(path)?;
        self.descend_mut(&parents)?
            .bind(key, Slot::Value(value), Overwrite::Typed)
    }

    /// Walk down `segments`, creating missing nodes under policy.
    pub(super) fn descend_mut(&mut self, segments: &[&str]) -> ConfigResult<&mut Config> {
        let Some((segment, rest)) = segments.split_first() else {
            return Ok(self);
        };
        if !self.entries.contains_key(*segment) {
            self.create_child(segment)?;
        }
        match self.entries.get_mut(*segment) {
            Some(Slot::Value(Value::Config(child))) => child.descend_mut(rest),
            Some(slot) => Err(not_a_subtree(segment, slot)),
            None => Err(ConfigError::KeyNotFound {
                key: (*segment).to_owned(),
            }),
        }
    }

    /// Walk down `segments` without creating anything.
    fn descend_existing_mut(&mut self, segments: &[&str], path: &str) -> ConfigResult<&mut Config> {
        let Some((segment, rest)) = segments.split_first() else {
            return Ok(self);
        };
        match self.entries.get_mut(*segment) {
            Some(Slot::Value(Value::Config(child))) => child.descend_existing_mut(rest, path),
            Some(_) | None => Err(ConfigError::KeyNotFound {
                key: path.to_owned(),
            }),
        }
    }

    fn create_child(&mut self, key: &str) -> ConfigResult<()> {
        check_reserved(key)?;
        if self.frozen {
            return Err(ConfigError::FrozenKey {
                key: key.to_owned(),
            });
        }
        if self.locked {
            return Err(self.locked_key_error(key));
        }
        if !self.create_intermediate_attributes {
            return Err(ConfigError::IntermediateCreationDisabled {
                key: key.to_owned(),
            });
        }
        trace!(key, "creating intermediate config node");
        let child = Config::new().with_intermediate_attribute_creation(true);
        self.entries
            .insert(key.to_owned(), Slot::Value(Value::Config(child)));
        Ok(())
    }

    /// Turn an incoming slot into what gets stored: plain mappings become
    /// child configs.
    fn prepare(&self, incoming: Slot) -> ConfigResult<Slot> {
        match incoming {
            Slot::Value(Value::Map(map)) => Ok(Slot::Value(Value::Config(
                self.child_from_mapping(map)?,
            ))),
            other => Ok(other),
        }
    }

    /// Build a child config that inherits this node's creation policy
    /// before any of its entries are written.
    fn child_from_mapping(&self, mapping: Mapping) -> ConfigResult<Config> {
        let mut child =
            Config::new().with_intermediate_attribute_creation(self.create_intermediate_attributes);
        for (key, value) in mapping {
            child.set(&key, value)?;
        }
        Ok(child)
    }

    fn bind(&mut self, key: &str, incoming: Slot, overwrite: Overwrite) -> ConfigResult<()> {
        check_reserved(key)?;
        if self.frozen {
            return Err(ConfigError::Frozen);
        }
        if self.locked && !self.entries.contains_key(key) {
            return Err(self.locked_key_error(key));
        }
        let incoming = self.prepare(incoming)?;
        match self.entries.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(incoming);
                Ok(())
            },
            Entry::Occupied(mut occupied) => {
                overwrite_slot(key, occupied.get_mut(), incoming, overwrite)
            },
        }
    }

    fn remove(&mut self, key: &str, path: &str) -> ConfigResult<Value> {
        if self.frozen {
            return Err(ConfigError::Frozen);
        }
        let Some(slot) = self.entries.get(key) else {
            return Err(ConfigError::KeyNotFound {
                key: path.to_owned(),
            });
        };
        if self.locked {
            return Err(ConfigError::LockedRemoval {
                key: key.to_owned(),
            });
        }
        if slot.as_subtree().is_some_and(Config::is_frozen) {
            return Err(ConfigError::Frozen);
        }
        let value = self
            .entries
            .shift_remove(key)
            .map(Slot::into_value)
            .unwrap_or_default();
        trace!(path, "removed key");
        Ok(value)
    }

    fn locked_key_error(&self, key: &str) -> ConfigError {
        let suggestion = closest_key(key, self.entries.keys());
        debug!(key, suggestion = ?suggestion, "rejected new key on locked config");
        ConfigError::LockedKey {
            key: key.to_owned(),
            suggestion,
        }
    }
}

fn overwrite_slot(
    key: &str,
    existing: &mut Slot,
    incoming: Slot,
    overwrite: Overwrite,
) -> ConfigResult<()> {
    if let Some(subtree) = existing.as_subtree() {
        if matches!(incoming, Slot::Field(_)) || !incoming.raw().is_mapping() {
            let value = incoming.raw();
            return Err(ConfigError::SubtreeOverride {
                key: key.to_owned(),
                value: value.to_string(),
                value_type: value.value_type().to_string(),
            });
        }
        if subtree.is_frozen() {
            return Err(ConfigError::Frozen);
        }
        *existing = incoming;
        return Ok(());
    }

    match incoming {
        Slot::Field(_) => {
            *existing = incoming;
            Ok(())
        },
        Slot::Value(value) => match existing {
            Slot::Field(field) => field.set(value),
            Slot::Value(old) => {
                if overwrite == Overwrite::Typed && !old.is_null() {
                    let ftype = old.value_type();
                    let mut field = Field::typed(ftype);
                    field.set(value)?;
                    trace!(key, %ftype, "pinned leaf type");
                    *existing = Slot::Field(field);
                } else {
                    *old = value;
                }
                Ok(())
            },
        },
    }
}
