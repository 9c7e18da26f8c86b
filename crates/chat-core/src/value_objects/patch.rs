//! Tri-state field for partial update payloads
//!
//! Partial events distinguish "field not sent" from "field explicitly
//! cleared". Declare the field with `#[serde(default)]` so a missing key
//! decodes to [`Patch::Absent`] and a JSON `null` decodes to [`Patch::Null`].

use serde::{Deserialize, Deserializer};

/// A field of a partial update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Key missing from the payload; the cached value is left alone
    #[default]
    Absent,
    /// Key present with `null`; the cached value is cleared
    Null,
    /// Key present with a value
    Value(T),
}

impl<T> Patch<T> {
    /// Check if the payload carried this field at all
    #[inline]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Borrow the value, if one was sent
    pub const fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Apply to a nullable cached field
    ///
    /// Returns `true` when the target was written.
    pub fn apply_to(self, target: &mut Option<T>) -> bool {
        match self {
            Self::Absent => false,
            Self::Null => {
                *target = None;
                true
            }
            Self::Value(value) => {
                *target = Some(value);
                true
            }
        }
    }

    /// Apply to a non-nullable cached field; `null` leaves it untouched
    pub fn apply_required(self, target: &mut T) -> bool {
        match self {
            Self::Value(value) => {
                *target = value;
                true
            }
            Self::Absent | Self::Null => false,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
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
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}
