use thiserror::Error;

/// Errors returned by fallible handle operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    /// The handle does not refer to any implementation object.
    #[error("handle is null")]
    Null,

    /// The implementation object is borrowed in a conflicting mode.
    #[error("implementation object is already borrowed")]
    BorrowConflict,

    /// The implementation object behind a weak handle was released.
    #[error("implementation object was released")]
    Expired,
}

pub(crate) type Result<T, E = HandleError> = std::result::Result<T, E>;
