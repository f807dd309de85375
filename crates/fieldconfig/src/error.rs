//! Configuration error types.

use thiserror::Error;

/// Abstract classification of a [`ConfigError`].
///
/// Several variants share a kind; callers that only care about the class of
/// failure (e.g. "was this a structural violation?") should match on this
/// instead of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Adding or removing a key on a frozen or locked node.
    Structural,
    /// Binding a key that collides with a reserved name.
    ReservedName,
    /// A value of the wrong shape or an impossible cast.
    TypeMismatch,
    /// A missing path segment with intermediate creation disabled.
    PathResolution,
    /// Reading a required Field that holds no value.
    RequiredValue,
    /// A Field validator rejected the current value.
    Validation,
    /// Deleting or reading a key that does not exist.
    Lookup,
    /// A Field was built with neither a default value nor a type.
    Construction,
    /// A path that is empty or contains an empty segment.
    InvalidPath,
    /// Conversion into an external format failed.
    Serialization,
}

/// Configuration error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Direct write or deletion on a frozen node.
    #[error("Config is frozen")]
    Frozen,

    /// Implicit creation of an intermediate node on a frozen node.
    #[error("Cannot add key {key} because the config is frozen.")]
    FrozenKey {
        /// Key that could not be added.
        key: String,
    },

    /// New key rejected because the node is locked.
    #[error(
        "Cannot add key {key} because the config is locked.{}",
        suggestion_suffix(.key, .suggestion.as_deref())
    )]
    LockedKey {
        /// Key that could not be added.
        key: String,
        /// Closest existing key, when one is near enough to be a typo.
        suggestion: Option<String>,
    },

    /// Key removal rejected because the node is locked.
    #[error("Cannot remove key {key} because the config is locked.")]
    LockedRemoval {
        /// Key that could not be removed.
        key: String,
    },

    /// Key collides with a reserved name.
    #[error("{key} cannot be overridden.")]
    ReservedName {
        /// The reserved key.
        key: String,
    },

    /// A subtree was about to be replaced by a non-mapping value.
    #[error(
        "Failed to override field '{key}' with value '{value}' of type '{value_type}'. \
         The field '{key}' must be assigned a value of type 'Mapping'."
    )]
    SubtreeOverride {
        /// Key holding the subtree.
        key: String,
        /// Rendered incoming value.
        value: String,
        /// Type name of the incoming value.
        value_type: String,
    },

    /// A Field default whose type is not compatible with the declared type.
    #[error("Invalid Field type: {actual}. It should be a subclass of {expected}.")]
    IncompatibleFieldType {
        /// Resolved type of the inner Field.
        actual: String,
        /// Declared type of the outer Field.
        expected: String,
    },

    /// Value cannot be cast to a Field's declared type.
    #[error("Cannot cast value '{value}' of type '{value_type}' to type '{ftype}'.")]
    Cast {
        /// Rendered value.
        value: String,
        /// Type name of the value.
        value_type: String,
        /// Declared type of the Field.
        ftype: String,
    },

    /// A path segment that must be a subtree holds a leaf.
    #[error("Cannot traverse '{key}': it holds a value of type '{value_type}', not a Config.")]
    NotASubtree {
        /// Segment that holds a leaf.
        key: String,
        /// Type name of the leaf.
        value_type: String,
    },

    /// A Field holding a mapping was bound into a Config.
    #[error("Field '{key}' cannot hold a mapping; assign a Config instead.")]
    MappingField {
        /// Key the Field was bound to.
        key: String,
    },

    /// Missing segment while intermediate creation is disabled.
    #[error(
        "Cannot add key {key} because the config has intermediate attribute creation disabled."
    )]
    IntermediateCreationDisabled {
        /// Missing segment.
        key: String,
    },

    /// Field constructed with neither a default value nor a type.
    #[error("Either provide a valid default value or specify a field type.")]
    MissingFieldType,

    /// Required Field read while it holds no value.
    #[error("Value is None. Please set a valid value before retrieving.")]
    RequiredValue,

    /// Field validator rejected the value.
    #[error("The provided value {value} ({value_type}) does not meet the criteria: \n      {criteria}")]
    Validation {
        /// Rendered value.
        value: String,
        /// Type name of the value.
        value_type: String,
        /// Source text of the validator.
        criteria: String,
    },

    /// A Config was built from a value that is not a mapping.
    #[error("Expected a mapping, found a value of type '{value_type}'.")]
    NotAMapping {
        /// Type name of the value.
        value_type: String,
    },

    /// Conversion into an external format failed.
    #[error("Failed to serialize config: {message}")]
    Serialization {
        /// Serializer error description.
        message: String,
    },

    /// Key does not exist.
    #[error("Key '{key}' not found")]
    KeyNotFound {
        /// The full path that was looked up.
        key: String,
    },

    /// Empty path, or a path with an empty segment.
    #[error("Invalid path '{path}': segments must be non-empty")]
    InvalidPath {
        /// The offending path.
        path: String,
    },
}

impl ConfigError {
    /// Classify this error into its abstract [`ErrorKind`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Frozen
            | Self::FrozenKey { .. }
            | Self::LockedKey { .. }
            | Self::LockedRemoval { .. } => ErrorKind::Structural,
            Self::ReservedName { .. } => ErrorKind::ReservedName,
            Self::SubtreeOverride { .. }
            | Self::IncompatibleFieldType { .. }
            | Self::Cast { .. }
            | Self::NotASubtree { .. }
            | Self::MappingField { .. }
            | Self::NotAMapping { .. } => ErrorKind::TypeMismatch,
            Self::IntermediateCreationDisabled { .. } => ErrorKind::PathResolution,
            Self::MissingFieldType => ErrorKind::Construction,
            Self::RequiredValue => ErrorKind::RequiredValue,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::KeyNotFound { .. } => ErrorKind::Lookup,
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::Serialization { .. } => ErrorKind::Serialization,
        }
    }
}

fn suggestion_suffix(key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(closest) => format!("\nDid you mean \"{closest}\" instead of \"{key}\"?"),
        None => String::new(),
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
