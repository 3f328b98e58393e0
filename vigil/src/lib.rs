//! A JSON Web Token producer and verifier
//!
//! This crate implements JWTs ([RFC 7519][rfc7519]) in JWS compact
//! serialization ([RFC 7515 §7.1][rfc7515]) over a closed set of
//! algorithms: HMAC (`HS256`, `HS384`, `HS512`) and ECDSA (`ES256`,
//! `ES384`, `ES512`). A claim set plus a key becomes a signed compact
//! token; a compact token plus a key and a validation policy becomes a
//! verified claim set, or a precise error.
//!
//! Every handle is bound to exactly one algorithm at key construction.
//! The token header is never used to select behavior; its `alg` is only
//! compared against the handle's algorithm, and `"none"` does not exist
//! here.
//!
//! # Example
//!
//! ```
//! use vigil::{HmacAlgorithm, HmacKey, JwtMac, JwtValidator, RawJwt};
//! use vigil_clock::UnixTime;
//!
//! # fn main() -> vigil::Result<()> {
//! let mac = JwtMac::new(HmacKey::generate(HmacAlgorithm::HS256)?);
//!
//! let token = RawJwt::builder()
//!     .with_issuer("issuer")
//!     .add_audience("my_api")
//!     .with_expiration(UnixTime(2_000_000_000))
//!     .build();
//!
//! let compact = mac.compute_and_encode(&token)?;
//!
//! let validator = JwtValidator::builder()
//!     .expect_issuer("issuer")
//!     .expect_audience("my_api")
//!     .build();
//!
//! let verified = mac.verify_and_decode(&compact, &validator)?;
//! assert_eq!(verified.claims().issuer()?, "issuer");
//! # Ok(())
//! # }
//! ```
//!
//! [rfc7515]: https://tools.ietf.org/html/rfc7515
//! [rfc7519]: https://tools.ietf.org/html/rfc7519

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod error;
mod format;
mod json;
pub mod jwa;
pub mod jws;
mod jwt;
mod mac;
mod sign;
mod validator;
mod verified;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use jwa::{Algorithm, EcdsaAlgorithm, EcdsaPrivateKey, EcdsaPublicKey, HmacAlgorithm, HmacKey};
pub use jwt::{RawJwt, RawJwtBuilder};
pub use mac::JwtMac;
pub use sign::{JwtSigner, JwtVerifier};
pub use validator::{JwtValidator, JwtValidatorBuilder};
pub use verified::VerifiedJwt;
