//! HMAC algorithm implementations

use std::{fmt, io};

use ring::rand::SecureRandom;
use zeroize::Zeroizing;

use crate::{
    error::{invalid_key, Error, Result},
    jwa, jws,
};

/// HMAC signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum HmacAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

impl HmacAlgorithm {
    /// The size in bytes of this algorithm's tag
    ///
    /// This is also the minimum acceptable key size.
    #[must_use]
    pub fn tag_size(self) -> usize {
        match self {
            Self::HS256 => 256 / 8,
            Self::HS384 => 384 / 8,
            Self::HS512 => 512 / 8,
        }
    }

    fn into_ring_algorithm(self) -> ring::hmac::Algorithm {
        match self {
            Self::HS256 => ring::hmac::HMAC_SHA256,
            Self::HS384 => ring::hmac::HMAC_SHA384,
            Self::HS512 => ring::hmac::HMAC_SHA512,
        }
    }
}

impl From<HmacAlgorithm> for jwa::Algorithm {
    fn from(alg: HmacAlgorithm) -> Self {
        match alg {
            HmacAlgorithm::HS256 => Self::HS256,
            HmacAlgorithm::HS384 => Self::HS384,
            HmacAlgorithm::HS512 => Self::HS512,
        }
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&jwa::Algorithm::from(*self), f)
    }
}

/// An HMAC key bound to one algorithm
///
/// The secret lives in a container that zeroes its backing memory when
/// the key is released.
pub struct HmacKey {
    algorithm: HmacAlgorithm,
    secret: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HmacKey")
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl HmacKey {
    /// Constructs an HMAC key from raw secret bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the secret is shorter than the
    /// algorithm's digest output.
    pub fn new(algorithm: HmacAlgorithm, secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = Zeroizing::new(secret.into());
        if secret.len() < algorithm.tag_size() {
            return Err(invalid_key(format!(
                "{algorithm} requires a key of at least {} bytes",
                algorithm.tag_size()
            )));
        }
        Ok(Self { algorithm, secret })
    }

    /// Generates a fresh random HMAC key of the algorithm's digest size
    ///
    /// # Errors
    ///
    /// Returns an error if the system random number generator fails.
    pub fn generate(algorithm: HmacAlgorithm) -> Result<Self> {
        let mut secret = Zeroizing::new(vec![0; algorithm.tag_size()]);
        ring::rand::SystemRandom::new()
            .fill(&mut secret)
            .map_err(|_| invalid_key("random number generator failure"))?;
        Ok(Self { algorithm, secret })
    }

    /// Derives an HMAC key by reading the algorithm's digest size in
    /// bytes from the provided stream
    ///
    /// The stream is the caller's key-derivation source; this method
    /// only consumes exactly the bytes it needs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the stream ends before enough
    /// bytes have been read.
    pub fn derive_from(algorithm: HmacAlgorithm, stream: &mut impl io::Read) -> Result<Self> {
        let mut secret = Zeroizing::new(vec![0; algorithm.tag_size()]);
        stream
            .read_exact(&mut secret)
            .map_err(|err| invalid_key(format!("key derivation stream failed: {err}")))?;
        Ok(Self { algorithm, secret })
    }

    /// The algorithm this key is bound to
    #[must_use]
    pub fn algorithm(&self) -> HmacAlgorithm {
        self.algorithm
    }
}

impl jws::Signer for HmacKey {
    fn algorithm(&self) -> jwa::Algorithm {
        self.algorithm.into()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = ring::hmac::Key::new(self.algorithm.into_ring_algorithm(), &self.secret);
        let tag = ring::hmac::sign(&key, data);
        Ok(tag.as_ref().to_owned())
    }
}

impl jws::Verifier for HmacKey {
    fn algorithm(&self) -> jwa::Algorithm {
        self.algorithm.into()
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let key = ring::hmac::Key::new(self.algorithm.into_ring_algorithm(), &self.secret);
        ring::hmac::verify(&key, data, signature).map_err(|_| Error::InvalidMac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jws::{Signer, Verifier};

    #[test]
    fn tag_sizes() {
        assert_eq!(HmacAlgorithm::HS256.tag_size(), 32);
        assert_eq!(HmacAlgorithm::HS384.tag_size(), 48);
        assert_eq!(HmacAlgorithm::HS512.tag_size(), 64);
    }

    #[test]
    fn rejects_short_keys() {
        for (alg, min) in [
            (HmacAlgorithm::HS256, 32),
            (HmacAlgorithm::HS384, 48),
            (HmacAlgorithm::HS512, 64),
        ] {
            assert!(matches!(
                HmacKey::new(alg, vec![0; min - 1]),
                Err(Error::InvalidKey(_))
            ));
            assert!(HmacKey::new(alg, vec![0; min]).is_ok());
        }
    }

    #[test]
    fn compute_then_verify() {
        let key = HmacKey::new(HmacAlgorithm::HS256, vec![7; 32]).unwrap();
        let tag = key.sign(b"payload").unwrap();
        assert_eq!(tag.len(), 32);
        key.verify(b"payload", &tag).unwrap();
    }

    #[test]
    fn verify_rejects_tampered_tag() {
        let key = HmacKey::new(HmacAlgorithm::HS512, vec![7; 64]).unwrap();
        let mut tag = key.sign(b"payload").unwrap();
        tag[0] ^= 1;
        assert_eq!(key.verify(b"payload", &tag), Err(Error::InvalidMac));
    }

    #[test]
    fn verify_rejects_wrong_length_tag() {
        let key = HmacKey::new(HmacAlgorithm::HS256, vec![7; 32]).unwrap();
        let tag = key.sign(b"payload").unwrap();
        assert_eq!(key.verify(b"payload", &tag[..31]), Err(Error::InvalidMac));
        assert_eq!(key.verify(b"payload", &[]), Err(Error::InvalidMac));
    }

    #[test]
    fn verify_rejects_other_key() {
        let key = HmacKey::new(HmacAlgorithm::HS256, vec![7; 32]).unwrap();
        let other = HmacKey::new(HmacAlgorithm::HS256, vec![8; 32]).unwrap();
        let tag = key.sign(b"payload").unwrap();
        assert_eq!(other.verify(b"payload", &tag), Err(Error::InvalidMac));
    }

    #[test]
    fn generated_keys_differ() {
        let a = HmacKey::generate(HmacAlgorithm::HS256).unwrap();
        let b = HmacKey::generate(HmacAlgorithm::HS256).unwrap();
        let tag_a = a.sign(b"data").unwrap();
        assert_eq!(b.verify(b"data", &tag_a), Err(Error::InvalidMac));
    }

    #[test]
    fn derives_exactly_the_digest_size() {
        let mut stream: &[u8] = &[0xab; 40];
        let key = HmacKey::derive_from(HmacAlgorithm::HS256, &mut stream).unwrap();
        assert_eq!(stream.len(), 8);

        let expected = HmacKey::new(HmacAlgorithm::HS256, vec![0xab; 32]).unwrap();
        let tag = key.sign(b"data").unwrap();
        expected.verify(b"data", &tag).unwrap();
    }

    #[test]
    fn derive_fails_on_short_stream() {
        let mut stream: &[u8] = &[0xab; 16];
        assert!(matches!(
            HmacKey::derive_from(HmacAlgorithm::HS256, &mut stream),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_redacts_the_secret() {
        let key = HmacKey::new(HmacAlgorithm::HS256, vec![7; 32]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains('7'));
    }
}
