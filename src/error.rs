//! Error types.
//!
//! Nothing in the multiplexing core is fatal: the only failure a caller can
//! observe there is [`StreamError::AlreadyExists`]. [`Error`] covers the
//! actor and engine layers, where terminal setup and thread spawning can fail.

use crate::key::KeyId;
use std::io;
use thiserror::Error;

/// Failure to register a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The key already has a stream. Reuse the existing one.
    #[error("a stream for key `{0}` already exists")]
    AlreadyExists(KeyId),
}

/// Errors raised while setting up or running the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Terminal or thread I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// Stream registration was rejected.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Convenience result alias for engine-level operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_message() {
        let err = StreamError::AlreadyExists(KeyId::new("A"));
        assert_eq!(err.to_string(), "a stream for key `A` already exists");
    }

    #[test]
    fn test_error_from_stream_error() {
        let err: Error = StreamError::AlreadyExists(KeyId::new("<space>")).into();
        assert!(matches!(err, Error::Stream(StreamError::AlreadyExists(_))));
    }
}
