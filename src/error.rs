use thiserror::Error;

/// Result type used by all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation failures reported by key construction and the
/// encrypt/decrypt entry points.
///
/// Every variant is a synchronous, fail-fast rejection of the current
/// call; no partial output is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The raw key was not 8, 16, or 24 bytes long.
    #[error("the key should be of length 8, 16, or 24, got {length}")]
    InvalidKey { length: usize },

    /// The message length was not a multiple of 8 in a call where padding
    /// does not apply.
    #[error(
        "the length of the message should be divisible by 8, got {length} \
         (or set `padding` to `true` in encryption mode)"
    )]
    InvalidLength { length: usize },

    /// The initial value was given as bytes but not exactly 8 of them.
    #[error("the initial value should be of length 8, got {length}")]
    InvalidIv { length: usize },
}
