//! Markers choosing how handles are compared, ordered and hashed.
//!
//! Under either policy all null handles are equal to each other, and a null
//! handle orders before every handle that refers to an object.

/// Comparison policy of a handle.
pub trait EqKind {}

impl EqKind for ByAddress {}
impl EqKind for ByContent {}

/// Handles are equal when they share the same implementation object.
///
/// Ordering and hashing follow the address of the shared allocation, so
/// neither ever touches the object itself and mutating it is harmless.
pub enum ByAddress {}

/// Handles are equal when their implementation objects have equal values.
///
/// Comparing and hashing read the objects. Handles sharing one object are
/// equal without reading it.
pub enum ByContent {}
