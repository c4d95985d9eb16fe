//! Handles serialize as an optional implementation object.
//!
//! Sharing between handles is not preserved: every deserialized non-null
//! handle owns a fresh implementation object.

use crate::{arc_handle::ArcHandle, marker::EqKind, rc_handle::RcHandle};
use serde::{ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};

impl<T, E> Serialize for RcHandle<T, E>
where
    T: Serialize,
    E: EqKind,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.inner {
            None => serializer.serialize_none(),
            Some(cell) => {
                let value = cell.try_borrow().map_err(S::Error::custom)?;
                serializer.serialize_some(&*value)
            }
        }
    }
}

impl<'de, T, E> Deserialize<'de> for RcHandle<T, E>
where
    T: Deserialize<'de>,
    E: EqKind,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

impl<T, E> Serialize for ArcHandle<T, E>
where
    T: Serialize,
    E: EqKind,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.inner {
            None => serializer.serialize_none(),
            Some(lock) => serializer.serialize_some(&*lock.read()),
        }
    }
}

impl<'de, T, E> Deserialize<'de> for ArcHandle<T, E>
where
    T: Deserialize<'de>,
    E: EqKind,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
