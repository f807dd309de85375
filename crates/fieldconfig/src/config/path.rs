use crate::error::{ConfigError, ConfigResult};

/// Split a dotted path into its segments.
pub(super) fn segments(path: &str) -> ConfigResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ConfigError::InvalidPath {
            path: path.to_owned(),
        });
    }
    Ok(segments)
}

/// Split a dotted path into its parent segments and the final key.
pub(super) fn split_last(path: &str) -> ConfigResult<(Vec<&str>, &str)> {
    let mut segments = segments(path)?;
    let Some(key) = segments.pop() else {
        return Err(ConfigError::InvalidPath {
            path: path.to_owned(),
        });
    };
    Ok((segments, key))
}

/// Join a prefix and a key into a dotted path.
pub(super) fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}
