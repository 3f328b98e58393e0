//! Signing algorithm implementations
//!
//! The set of supported algorithms is a closed registry: the symmetric
//! HMAC family (`HS256`, `HS384`, `HS512`) and the ECDSA family
//! (`ES256`, `ES384`, `ES512`). There is no `"none"`, and behavior is
//! never driven by a token's header; the header's `alg` is only checked
//! for equality against the algorithm a key was constructed with.

use std::fmt;

use serde::Serialize;

pub mod ec;
pub mod hmac;

#[doc(inline)]
pub use ec::{Curve, EcdsaAlgorithm, EcdsaPrivateKey, EcdsaPublicKey};
#[doc(inline)]
pub use hmac::{HmacAlgorithm, HmacKey};

/// The closed registry of supported signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Algorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// ECDSA using the P-256 curve and SHA-256
    ES256,
    /// ECDSA using the P-384 curve and SHA-384
    ES384,
    /// ECDSA using the P-521 curve and SHA-512
    ES512,
}

impl Algorithm {
    /// The algorithm's name as it appears in a token header
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
        }
    }

    /// The exact size in bytes of this algorithm's tag or signature
    #[must_use]
    pub fn signature_size(self) -> usize {
        match self {
            Self::HS256 => HmacAlgorithm::HS256.tag_size(),
            Self::HS384 => HmacAlgorithm::HS384.tag_size(),
            Self::HS512 => HmacAlgorithm::HS512.tag_size(),
            Self::ES256 => EcdsaAlgorithm::ES256.signature_size(),
            Self::ES384 => EcdsaAlgorithm::ES384.signature_size(),
            Self::ES512 => EcdsaAlgorithm::ES512.signature_size(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
