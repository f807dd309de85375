//! Conversion of a Config back into plain mappings.

use indexmap::IndexMap;

use super::{Config, path};
use crate::value::{Mapping, Value};

impl Config {
    /// Convert the tree into nested plain mappings.
    ///
    /// Subtrees become [`Value::Map`], Fields are unwrapped to their stored
    /// values (without running their checks), and insertion order is kept.
    #[must_use]
    pub fn to_dict(&self) -> Mapping {
        self.entries
            .iter()
            .map(|(key, slot)| (key.clone(), slot.raw().clone().into_plain()))
            .collect()
    }

    /// Convert the tree into a single-level mapping keyed by dotted paths.
    ///
    /// Empty subtrees are kept as empty mappings so that every key of the
    /// tree is represented.
    #[must_use]
    pub fn to_flat_dict(&self) -> IndexMap<String, Value> {
        let mut flat = IndexMap::new();
        self.flatten_into("", &mut flat);
        flat
    }

    fn flatten_into(&self, prefix: &str, flat: &mut IndexMap<String, Value>) {
        for (key, slot) in &self.entries {
            let full = path::join(prefix, key);
            match slot.as_subtree() {
                Some(child) if !child.is_empty() => child.flatten_into(&full, flat),
                _ => {
                    flat.insert(full, slot.raw().clone().into_plain());
                },
            }
        }
    }
}

impl From<&Config> for Mapping {
    fn from(config: &Config) -> Self {
        config.to_dict()
    }
}

impl From<Config> for Mapping {
    fn from(config: Config) -> Self {
        config.to_dict()
    }
}
