use thiserror::Error;

use crate::engine::TypeId;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Handle queries deliberately do not return errors: an invalid handle degrades every query
/// to a documented sentinel value (zero, `false`, an empty string, an invalid handle). The
/// variants below cover the few places where failure is surfaced explicitly instead of being
/// swallowed, such as indexed access into handle lists and type construction through
/// [`crate::engine::TypeBuilder`].
///
/// # Examples
///
/// ```rust
/// use typescope::{Error, handles::TypeListHandle};
///
/// let list = TypeListHandle::new();
/// match list.get(3) {
///     Ok(handle) => println!("got {}", handle.name()),
///     Err(Error::OutOfRange { index, len }) => {
///         eprintln!("index {} out of range for list of {}", index, len);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An indexed accessor was called with an index past the end of the sequence.
    ///
    /// Handle lists validate indices explicitly rather than inheriting whatever the
    /// underlying storage would do. Callers that check `len()` first never see this.
    #[error("Index {index} is out of range for a sequence of length {len}")]
    OutOfRange {
        /// The index that was requested
        index: usize,
        /// The length of the sequence at the time of the access
        len: usize,
    },

    /// The handle does not reference a resolved type.
    ///
    /// Returned by the few operations that surface failure instead of degrading to a
    /// sentinel, such as member-function description rendering.
    #[error("The handle does not reference a resolved type")]
    Unresolved,

    /// Failed to find a type record in the engine.
    ///
    /// The associated [`TypeId`] identifies which record was requested.
    #[error("Failed to find type record in engine - {0}")]
    TypeNotFound(TypeId),

    /// General error during type construction or engine usage.
    ///
    /// Covers builder misuse, such as attaching a member function whose declared type
    /// is not a function type.
    #[error("{0}")]
    TypeError(String),
}
