//! Common errors

use thiserror::Error;

/// A convenience alias for results produced by this crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The reasons a token, key, or claim operation can be rejected
///
/// The verify path intentionally collapses low-level causes into these
/// kinds: callers may learn _which_ check failed, but never the contents
/// of an unverified token.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A builder or accessor was given an unusable input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Key material was rejected at construction
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The token cannot be decomposed into valid header, payload, and
    /// signature sections
    #[error("malformed token")]
    MalformedToken,

    /// The header parsed as JSON but violated the header contract
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),

    /// The header's `alg` differs from the algorithm bound to the key
    #[error("header algorithm does not match the key's algorithm")]
    AlgorithmMismatch,

    /// The MAC tag did not verify
    #[error("MAC verification failed")]
    InvalidMac,

    /// The signature did not verify
    #[error("signature verification failed")]
    InvalidSignature,

    /// The token has expired according to the `exp` claim
    #[error("token has expired")]
    TokenExpired,

    /// The token carries no `exp` claim, but the validator requires one
    #[error("token has no expiration")]
    MissingExpiration,

    /// The token is not yet valid according to the `nbf` claim
    #[error("token cannot yet be used")]
    NotYetValid,

    /// The `iss` claim is absent or differs from the expected issuer
    #[error("wrong issuer")]
    IssuerMismatch,

    /// The `sub` claim is absent or differs from the expected subject
    #[error("wrong subject")]
    SubjectMismatch,

    /// The expected audience is not among the token's audiences
    #[error("audience not found")]
    AudienceMismatch,

    /// The requested claim is not present
    #[error("claim '{0}' not found")]
    NotFound(String),
}

#[inline]
pub(crate) fn invalid_argument(msg: impl Into<String>) -> Error {
    Error::InvalidArgument(msg.into())
}

#[inline]
pub(crate) fn invalid_key(msg: impl Into<String>) -> Error {
    Error::InvalidKey(msg.into())
}

#[inline]
pub(crate) fn not_found(name: impl Into<String>) -> Error {
    Error::NotFound(name.into())
}
