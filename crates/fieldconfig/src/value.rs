//! Tagged leaf values and their runtime types.
//!
//! Every payload a [`Config`] can hold is a [`Value`]. Plain nested mappings
//! travel as [`Value::Map`]; once written into a Config they become live
//! subtrees ([`Value::Config`]). [`ValueType`] is the runtime type used by
//! [`Field`](crate::Field) to cast and check values.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};

/// Insertion-ordered plain mapping, the input and output shape of a Config.
pub type Mapping = IndexMap<String, Value>;

/// Exclusive upper bound of `i64` as an `f64` (2^63).
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A configuration value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Unset.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// UTF-8 string.
    Text(String),
    /// Ordered, growable sequence.
    List(Vec<Value>),
    /// Ordered, fixed-arity sequence.
    Tuple(Vec<Value>),
    /// Plain nested mapping (not yet bound into a Config).
    Map(Mapping),
    /// Live subtree.
    Config(Config),
    /// Arbitrary caller-supplied object.
    Opaque(Opaque),
}

impl Value {
    /// Build a [`Value::Tuple`] from any iterator of convertible items.
    #[must_use]
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Wrap an arbitrary object as a [`Value::Opaque`].
    #[must_use]
    pub fn opaque<T>(object: T) -> Self
    where
        T: Any + fmt::Debug + Send + Sync,
    {
        Self::Opaque(Opaque::new(object))
    }

    /// Runtime type of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Text(_) => ValueType::Text,
            Self::List(_) => ValueType::List,
            Self::Tuple(_) => ValueType::Tuple,
            Self::Map(_) | Self::Config(_) => ValueType::Mapping,
            Self::Opaque(o) => ValueType::Opaque(o.opaque_type()),
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for plain mappings and subtrees.
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Map(_) | Self::Config(_))
    }

    /// The boolean payload, if any.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float payload, if any.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Items of a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Items of a [`Value::Tuple`].
    #[must_use]
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// The plain mapping payload, if any.
    #[must_use]
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The subtree payload, if any.
    #[must_use]
    pub fn as_config(&self) -> Option<&Config> {
        match self {
            Self::Config(config) => Some(config),
            _ => None,
        }
    }

    /// The opaque payload, if any.
    #[must_use]
    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Self::Opaque(o) => Some(o),
            _ => None,
        }
    }

    /// Convert subtrees into plain mappings, recursively.
    #[must_use]
    pub fn into_plain(self) -> Self {
        match self {
            Self::Config(config) => Self::Map(config.to_dict()),
            Self::Map(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, value.into_plain()))
                    .collect(),
            ),
            Self::List(items) => Self::List(items.into_iter().map(Self::into_plain).collect()),
            Self::Tuple(items) => Self::Tuple(items.into_iter().map(Self::into_plain).collect()),
            other => other,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s:?}"),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => a == b,
            (Self::Map(map), Self::Config(config)) | (Self::Config(config), Self::Map(map)) => {
                config.to_dict() == *map
            },
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => {
                let rendered = x.to_string();
                if x.is_finite() && !rendered.contains('.') {
                    write!(f, "{rendered}.0")
                } else {
                    f.write_str(&rendered)
                }
            },
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                fmt_items(items, f)?;
                f.write_str("]")
            },
            Self::Tuple(items) => {
                f.write_str("(")?;
                fmt_items(items, f)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            },
            Self::Map(map) => fmt_mapping(map.iter(), f),
            Self::Config(config) => fmt::Display::fmt(config, f),
            Self::Opaque(o) => write!(f, "{o:?}"),
        }
    }
}

fn fmt_items(items: &[Value], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.fmt_nested(f)?;
    }
    Ok(())
}

/// Render `{"key": value, ...}` with nested strings quoted.
pub(crate) fn fmt_mapping<'a, I>(entries: I, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    I: Iterator<Item = (&'a String, &'a Value)>,
{
    f.write_str("{")?;
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key:?}: ")?;
        value.fmt_nested(f)?;
    }
    f.write_str("}")
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Self::Int(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Self::Map(map)
    }
}

impl From<Config> for Value {
    fn from(config: Config) -> Self {
        Self::Config(config)
    }
}

impl From<Opaque> for Value {
    fn from(o: Opaque) -> Self {
        Self::Opaque(o)
    }
}

trait OpaqueObject: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> OpaqueObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A caller-supplied object carried through a Config untouched.
///
/// Clones share the underlying object; two opaque values are equal only when
/// they point at the same object.
#[derive(Clone)]
pub struct Opaque {
    object: Arc<dyn OpaqueObject>,
    ty: OpaqueType,
}

impl Opaque {
    /// Wrap `object`.
    #[must_use]
    pub fn new<T>(object: T) -> Self
    where
        T: Any + fmt::Debug + Send + Sync,
    {
        Self {
            object: Arc::new(object),
            ty: OpaqueType::of::<T>(),
        }
    }

    /// Runtime type of the wrapped object.
    #[must_use]
    pub fn opaque_type(&self) -> OpaqueType {
        self.ty
    }

    /// Borrow the wrapped object as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let object: &dyn OpaqueObject = &*self.object;
        object.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.object, f)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

/// Identity of an opaque object's Rust type.
#[derive(Debug, Clone, Copy)]
pub struct OpaqueType {
    id: TypeId,
    name: &'static str,
}

impl OpaqueType {
    /// Type identity of `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Rust type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for OpaqueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpaqueType {}

impl std::hash::Hash for OpaqueType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Runtime type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Type of [`Value::Null`].
    Null,
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Float.
    Float,
    /// String.
    Text,
    /// List.
    List,
    /// Tuple.
    Tuple,
    /// Plain mapping or subtree.
    Mapping,
    /// Opaque object of a specific Rust type.
    Opaque(OpaqueType),
}

impl ValueType {
    /// Whether a value of type `self` may stand in for `other` unchanged.
    ///
    /// Identity, plus `bool` under `int`.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        self == other || matches!((self, other), (Self::Bool, Self::Int))
    }

    /// Cast `value` into this type.
    ///
    /// `Null` always passes. Otherwise the value must already be a subtype,
    /// or belong to one of the convertible pairs `int <-> float` and
    /// `list <-> tuple`. Float to int truncates toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cast`] for any other combination, and for
    /// floats that are not finite or do not fit in an `i64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn cast(&self, value: Value) -> ConfigResult<Value> {
        if value.is_null() || value.value_type().is_subtype_of(self) {
            return Ok(value);
        }
        match (self, value) {
            (Self::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (Self::Int, Value::Float(x)) => {
                float_to_int(x).map(Value::Int).ok_or_else(|| self.cast_error(&Value::Float(x)))
            },
            (Self::Tuple, Value::List(items)) => Ok(Value::Tuple(items)),
            (Self::List, Value::Tuple(items)) => Ok(Value::List(items)),
            (_, value) => Err(self.cast_error(&value)),
        }
    }

    fn cast_error(&self, value: &Value) -> ConfigError {
        ConfigError::Cast {
            value: value.to_string(),
            value_type: value.value_type().to_string(),
            ftype: self.to_string(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_int(x: f64) -> Option<i64> {
    let truncated = x.trunc();
    if truncated.is_finite() && truncated >= -I64_BOUND && truncated < I64_BOUND {
        Some(truncated as i64)
    } else {
        None
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NoneType"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("str"),
            Self::List => f.write_str("list"),
            Self::Tuple => f.write_str("tuple"),
            Self::Mapping => f.write_str("Mapping"),
            Self::Opaque(ty) => f.write_str(ty.name()),
        }
    }
}
