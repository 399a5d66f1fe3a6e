//! Unified error type.

use thiserror::Error;

/// The error type returned by the crate's fallible operations.
///
/// Request-time failures (405, 401) are expressed as HTTP
/// [`Response`](crate::Response) values, never as `Error`s. This type surfaces
/// setup-time faults: an unusable gate configuration, an unparsable listen
/// address, or an I/O failure while binding.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A method set with no entries.
    #[error("requires at least one handler")]
    NoHandlers,

    /// A method set mixing the "any method" key with explicit methods.
    #[error("mixing predetermined HTTP method with empty is not allowed")]
    MixedAnyMethod,

    #[error("invalid credentials: expected `user:password`")]
    InvalidCredentials,

    #[error("invalid socket address `{0}`")]
    InvalidAddr(String),
}
