//! Typed leaf values.
//!
//! A [`Field`] owns one [`Value`] together with its declared [`ValueType`].
//! Every value stored in the field is cast into the declared type, so the
//! type survives later overwrites. An optional [`Validator`] and a
//! `required` flag are checked when the value is read.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult};
use crate::value::{Value, ValueType};

type Predicate = dyn Fn(&Value) -> bool + Send + Sync;

/// A predicate over field values, paired with a readable description.
///
/// The description is reported verbatim when validation fails. Use the
/// [`validator!`](crate::validator) macro to capture a closure's source text
/// automatically.
#[derive(Clone)]
pub struct Validator {
    predicate: Arc<Predicate>,
    source: String,
}

impl Validator {
    /// Pair `predicate` with its human-readable `source`.
    #[must_use]
    pub fn new<F>(source: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            source: source.into(),
        }
    }

    /// Text describing the predicate.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the predicate.
    #[must_use]
    pub fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.source).finish()
    }
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

/// Build a [`Validator`] from a closure, using the closure's source text as
/// its description.
///
/// ```
/// use fieldconfig::{validator, Value};
///
/// let positive = validator!(|x: &Value| x.as_int().is_some_and(|i| i > 0));
/// assert!(positive.check(&Value::Int(3)));
/// assert!(positive.source().contains("i > 0"));
/// ```
#[macro_export]
macro_rules! validator {
    ($($predicate:tt)+) => {
        $crate::Validator::new(stringify!($($predicate)+), $($predicate)+)
    };
}

/// A typed, optionally validated, optionally required value holder.
///
/// Cloning a field copies its value; the validator is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    value: Value,
    ftype: ValueType,
    validator: Option<Validator>,
    required: bool,
}

impl Field {
    /// Create a field from a default value and an optional declared type.
    ///
    /// Without `ftype` the type is inferred from `default`. A non-null
    /// default is cast into the declared type.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingFieldType`] if `default` is null and no type
    ///   is given.
    /// - [`ConfigError::Cast`] if `default` cannot be cast into `ftype`.
    pub fn new(default: impl Into<Value>, ftype: Option<ValueType>) -> ConfigResult<Self> {
        let default = default.into();
        let ftype = match ftype {
            Some(ftype) => ftype,
            None if default.is_null() => return Err(ConfigError::MissingFieldType),
            None => default.value_type(),
        };
        let value = ftype.cast(default)?;
        Ok(Self {
            value,
            ftype,
            validator: None,
            required: false,
        })
    }

    /// Create an empty field of the given type.
    #[must_use]
    pub fn typed(ftype: ValueType) -> Self {
        Self {
            value: Value::Null,
            ftype,
            validator: None,
            required: false,
        }
    }

    /// Create a field whose default is another field's value.
    ///
    /// The inner field's type must equal, or be a subtype of, the declared
    /// type. Without `ftype` the inner field's type is used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompatibleFieldType`] if the inner type does
    /// not fit the declared type.
    pub fn wrap(inner: Field, ftype: Option<ValueType>) -> ConfigResult<Self> {
        let ftype = ftype.unwrap_or(inner.ftype);
        if !inner.ftype.is_subtype_of(&ftype) {
            return Err(ConfigError::IncompatibleFieldType {
                actual: inner.ftype.to_string(),
                expected: ftype.to_string(),
            });
        }
        Ok(Self {
            value: inner.value,
            ftype,
            validator: None,
            required: false,
        })
    }

    /// Attach a validator, evaluated on every non-null read.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Mark the field as required: reading a null value becomes an error.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Read the value, applying the required and validator checks.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::RequiredValue`] if the value is null and the field
    ///   is required.
    /// - [`ConfigError::Validation`] if the validator rejects a non-null
    ///   value.
    pub fn get(&self) -> ConfigResult<&Value> {
        if self.value.is_null() {
            if self.required {
                return Err(ConfigError::RequiredValue);
            }
            return Ok(&self.value);
        }
        if let Some(validator) = &self.validator
            && !validator.check(&self.value)
        {
            return Err(ConfigError::Validation {
                value: self.value.to_string(),
                value_type: self.value.value_type().to_string(),
                criteria: validator.source().to_owned(),
            });
        }
        Ok(&self.value)
    }

    /// Replace the value, casting it into the declared type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cast`] if the value cannot be cast; the field
    /// is left unchanged.
    pub fn set(&mut self, value: impl Into<Value>) -> ConfigResult<()> {
        self.value = self.ftype.cast(value.into())?;
        Ok(())
    }

    /// The stored value, without any checks.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the field, returning the stored value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Declared type.
    #[must_use]
    pub fn ftype(&self) -> ValueType {
        self.ftype
    }

    /// Attached validator, if any.
    #[must_use]
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Whether reading a null value is an error.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field(default={}, ftype={}, validator=", self.value, self.ftype)?;
        match &self.validator {
            Some(validator) => f.write_str(validator.source())?,
            None => f.write_str("None")?,
        }
        write!(f, ", required={})", self.required)
    }
}
