//! Conversion to and from serde data formats.
//!
//! A [`Config`] serializes as the same shape [`Config::to_dict`] returns.
//! JSON and TOML values convert into [`Value`] losslessly except for TOML
//! datetimes, which become strings. There are no tuples in either format, so
//! tuples serialize as sequences and come back as lists.

use serde::ser::Error as _;
use serde::{Serialize, Serializer};

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::value::{Mapping, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) | Self::Tuple(items) => serializer.collect_seq(items),
            Self::Map(map) => serializer.collect_map(map),
            Self::Config(config) => config.serialize(serializer),
            Self::Opaque(o) => Err(S::Error::custom(format!(
                "cannot serialize opaque value of type {}",
                o.opaque_type().name()
            ))),
        }
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl Config {
    /// Export the tree as a JSON value.
    ///
    /// Non-finite floats have no JSON representation and export as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] if the tree holds an opaque
    /// value.
    pub fn to_json(&self) -> ConfigResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::Serialization {
            message: e.to_string(),
        })
    }

    /// Export the tree as a pretty-printed TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] if the tree holds a value TOML
    /// cannot represent, such as an opaque object.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            message: e.to_string(),
        })
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| n.as_f64().map_or(Self::Null, Self::Float), Self::Int),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            },
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::Text(s),
            toml::Value::Integer(i) => Self::Int(i),
            toml::Value::Float(x) => Self::Float(x),
            toml::Value::Boolean(b) => Self::Bool(b),
            toml::Value::Datetime(dt) => Self::Text(dt.to_string()),
            toml::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            toml::Value::Table(table) => Self::Map(table_to_mapping(table)),
        }
    }
}

fn table_to_mapping(table: toml::Table) -> Mapping {
    table
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect()
}

fn config_from_value(value: Value) -> ConfigResult<Config> {
    match value {
        Value::Map(map) => Config::from_mapping(map),
        Value::Config(config) => Ok(config),
        other => Err(ConfigError::NotAMapping {
            value_type: other.value_type().to_string(),
        }),
    }
}

impl TryFrom<serde_json::Value> for Config {
    type Error = ConfigError;

    fn try_from(json: serde_json::Value) -> ConfigResult<Self> {
        config_from_value(Value::from(json))
    }
}

impl TryFrom<toml::Value> for Config {
    type Error = ConfigError;

    fn try_from(value: toml::Value) -> ConfigResult<Self> {
        config_from_value(Value::from(value))
    }
}

impl TryFrom<toml::Table> for Config {
    type Error = ConfigError;

    fn try_from(table: toml::Table) -> ConfigResult<Self> {
        Self::from_mapping(table_to_mapping(table))
    }
}
