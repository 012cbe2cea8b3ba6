use thiserror::Error;

/// Errors reported by tree construction and by [`CursorMut`](crate::cursor::CursorMut).
///
/// Inserting a duplicate key, removing an absent key and looking up an absent key are not errors;
/// those are reported through `bool` or `Option` results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The balance ratio `top / bottom` is not strictly between 1/2 and 1.
    #[error("alpha = {top}/{bottom} must satisfy 1/2 < alpha < 1")]
    InvalidArgument { top: usize, bottom: usize },

    /// The cursor was advanced past its last element.
    #[error("no more elements")]
    NoSuchElement,

    /// Removal was requested without a pending element returned by `next`.
    #[error("no pending element to remove")]
    IllegalState,
}

pub type Result<T> = core::result::Result<T, Error>;
