//! Signing and verification seams
//!
//! Each key type binds its algorithm at construction, so these traits
//! carry no algorithm parameter: a signer can only ever produce the tag
//! its key was built for, and a verifier only checks against that same
//! algorithm.

use crate::{error::Result, jwa};

/// A producer of tags or signatures over a signing input
pub trait Signer {
    /// The algorithm this signer was constructed for
    fn algorithm(&self) -> jwa::Algorithm;

    /// Signs the data, returning the raw tag or signature bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying primitive fails.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// A verifier of tags or signatures over a signing input
pub trait Verifier {
    /// The algorithm this verifier was constructed for
    fn algorithm(&self) -> jwa::Algorithm;

    /// Verifies the signature over the data
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMac`][crate::Error::InvalidMac] or
    /// [`Error::InvalidSignature`][crate::Error::InvalidSignature] if the
    /// signature does not check out, including when it has the wrong
    /// length for the algorithm.
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()>;
}
