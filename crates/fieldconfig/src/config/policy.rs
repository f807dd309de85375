//! Write-time key checks: reserved names and typo suggestions.

use crate::error::{ConfigError, ConfigResult};

/// Keys that can never be bound in a Config.
pub const RESERVED_KEYS: &[&str] = &[
    "__class__",
    "__contains__",
    "__delattr__",
    "__delitem__",
    "__dict__",
    "__eq__",
    "__getattr__",
    "__getattribute__",
    "__getitem__",
    "__hash__",
    "__init__",
    "__iter__",
    "__len__",
    "__repr__",
    "__setattr__",
    "__setitem__",
    "__str__",
];

/// Largest edit distance at which an existing key is offered as a
/// suggestion for a rejected one.
const MAX_SUGGESTION_DISTANCE: usize = 2;

pub(super) fn check_reserved(key: &str) -> ConfigResult<()> {
    if RESERVED_KEYS.contains(&key) {
        return Err(ConfigError::ReservedName {
            key: key.to_owned(),
        });
    }
    Ok(())
}

/// The existing key closest to `key`, if it is near enough to be a typo.
///
/// Ties go to the key inserted first. A candidate must differ from `key` in
/// fewer positions than `key` has characters.
pub(super) fn closest_key<'a, I>(key: &str, existing: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let key_len = key.chars().count();
    let mut best: Option<(usize, &String)> = None;
    for candidate in existing {
        let distance = edit_distance(key, candidate);
        if distance > MAX_SUGGESTION_DISTANCE || distance >= key_len {
            continue;
        }
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, candidate)| candidate.clone())
}

/// Levenshtein distance over Unicode scalar values.
pub(super) fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; prev.len()];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i.saturating_add(1);
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j].saturating_add(usize::from(ca != *cb));
            let deletion = prev[j.saturating_add(1)].saturating_add(1);
            let insertion = curr[j].saturating_add(1);
            curr[j.saturating_add(1)] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
