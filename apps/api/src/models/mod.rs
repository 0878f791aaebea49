pub mod profile;
pub mod project;
pub mod skill;

use serde::{Deserialize, Deserializer};

/// Deserializes a nullable patch field into three states:
/// omitted → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
///
/// Pair with `#[serde(default, deserialize_with = "nullable")]`; `default`
/// covers the omitted case because this function only runs for present keys.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Applies a tri-state patch field to a nullable column value.
pub fn apply_nullable<T>(target: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(value) = patch {
        *target = value;
    }
}
