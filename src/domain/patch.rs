//! Tri-state field for merge-patch payloads.

use serde::{Deserialize, Deserializer};

/// A field in a partial update.
///
/// Use with `#[serde(default)]`: a key that is absent from the payload stays
/// [`Patch::Missing`], an explicit `null` becomes [`Patch::Null`] and any other
/// value becomes [`Patch::Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> Patch<T> {
    #[must_use]
    pub const fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `None` when the column should be left alone, `Some(new)` otherwise.
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Self::Missing => None,
            Self::Null => Some(None),
            Self::Value(v) => Some(Some(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|v| v.map_or(Self::Null, Self::Value))
    }
}
