//! ECDSA algorithm implementations
//!
//! Signatures use the IEEE P1363 fixed-width encoding: the `r` and `s`
//! components are each left-padded to the byte width of the curve's
//! field and concatenated. Verifiers accept exactly that length and
//! nothing else.

use std::fmt;

use lazy_static::lazy_static;
use openssl::{
    bn::BigNum,
    ec::{EcGroup, EcGroupRef, EcKey},
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    nid::Nid,
    pkey::{Private, Public},
};

use crate::{
    error::{invalid_key, Error, Result},
    jwa, jws,
};

lazy_static! {
    static ref P256: EcGroup = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    static ref P384: EcGroup = EcGroup::from_curve_name(Nid::SECP384R1).unwrap();
    static ref P521: EcGroup = EcGroup::from_curve_name(Nid::SECP521R1).unwrap();
}

/// A named ECC curve
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Curve {
    /// The P-256 curve (prime256v1/secp256r1)
    P256,
    /// The P-384 curve (secp384r1)
    P384,
    /// The P-521 curve (secp521r1)
    P521,
}

impl Curve {
    fn to_group(self) -> &'static EcGroupRef {
        match self {
            Curve::P256 => &P256,
            Curve::P384 => &P384,
            Curve::P521 => &P521,
        }
    }

    fn from_group(group: &EcGroupRef) -> Option<Self> {
        let nid = group.curve_name()?;
        if nid == P256.curve_name().unwrap() {
            Some(Curve::P256)
        } else if nid == P384.curve_name().unwrap() {
            Some(Curve::P384)
        } else if nid == P521.curve_name().unwrap() {
            Some(Curve::P521)
        } else {
            None
        }
    }

    /// The width in bytes of a coordinate or signature component on
    /// this curve
    #[must_use]
    pub fn field_size(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

/// ECDSA signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum EcdsaAlgorithm {
    /// ECDSA using the P-256 curve and SHA-256
    ES256,
    /// ECDSA using the P-384 curve and SHA-384
    ES384,
    /// ECDSA using the P-521 curve and SHA-512
    ES512,
}

impl EcdsaAlgorithm {
    /// The curve this algorithm signs on
    #[must_use]
    pub fn curve(self) -> Curve {
        match self {
            Self::ES256 => Curve::P256,
            Self::ES384 => Curve::P384,
            Self::ES512 => Curve::P521,
        }
    }

    /// The exact size in bytes of a signature: both fixed-width
    /// components back to back
    #[must_use]
    pub fn signature_size(self) -> usize {
        self.curve().field_size() * 2
    }

    fn message_digest(self) -> MessageDigest {
        match self {
            Self::ES256 => MessageDigest::sha256(),
            Self::ES384 => MessageDigest::sha384(),
            Self::ES512 => MessageDigest::sha512(),
        }
    }
}

impl From<EcdsaAlgorithm> for jwa::Algorithm {
    fn from(alg: EcdsaAlgorithm) -> Self {
        match alg {
            EcdsaAlgorithm::ES256 => Self::ES256,
            EcdsaAlgorithm::ES384 => Self::ES384,
            EcdsaAlgorithm::ES512 => Self::ES512,
        }
    }
}

impl fmt::Display for EcdsaAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&jwa::Algorithm::from(*self), f)
    }
}

/// An ECDSA public key bound to one algorithm
#[derive(Clone)]
pub struct EcdsaPublicKey {
    algorithm: EcdsaAlgorithm,
    key: EcKey<Public>,
}

impl fmt::Debug for EcdsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EcdsaPublicKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl EcdsaPublicKey {
    /// Constructs a public key from big-endian affine coordinates
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `(x, y)` is not a point on the
    /// algorithm's curve.
    pub fn from_affine_coordinates(
        algorithm: EcdsaAlgorithm,
        x: &[u8],
        y: &[u8],
    ) -> Result<Self> {
        let group = algorithm.curve().to_group();
        let x = BigNum::from_slice(x).map_err(|err| invalid_key(err.to_string()))?;
        let y = BigNum::from_slice(y).map_err(|err| invalid_key(err.to_string()))?;
        let key = EcKey::from_public_key_affine_coordinates(group, &x, &y)
            .map_err(|_| invalid_key("point is not on the curve"))?;
        Ok(Self { algorithm, key })
    }

    /// Constructs a public key from a PEM document
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the PEM is not an EC public key
    /// on the algorithm's curve.
    pub fn from_pem(algorithm: EcdsaAlgorithm, pem: &str) -> Result<Self> {
        let key = EcKey::public_key_from_pem(pem.as_bytes())
            .map_err(|err| invalid_key(err.to_string()))?;
        check_curve(algorithm, key.group())?;
        Ok(Self { algorithm, key })
    }

    /// Serializes the public key as a PEM document
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be serialized.
    pub fn to_pem(&self) -> Result<String> {
        let pem = self
            .key
            .public_key_to_pem()
            .map_err(|err| invalid_key(err.to_string()))?;
        String::from_utf8(pem).map_err(|err| invalid_key(err.to_string()))
    }

    /// The algorithm this key is bound to
    #[must_use]
    pub fn algorithm(&self) -> EcdsaAlgorithm {
        self.algorithm
    }
}

impl jws::Verifier for EcdsaPublicKey {
    fn algorithm(&self) -> jwa::Algorithm {
        self.algorithm.into()
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let width = self.algorithm.curve().field_size();
        if signature.len() != width * 2 {
            return Err(Error::InvalidSignature);
        }
        let r = BigNum::from_slice(&signature[..width]).map_err(|_| Error::InvalidSignature)?;
        let s = BigNum::from_slice(&signature[width..]).map_err(|_| Error::InvalidSignature)?;
        let signature =
            EcdsaSig::from_private_components(r, s).map_err(|_| Error::InvalidSignature)?;
        let digest =
            hash(self.algorithm.message_digest(), data).map_err(|_| Error::InvalidSignature)?;
        match signature.verify(&digest, &self.key) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(Error::InvalidSignature),
        }
    }
}

/// An ECDSA private key bound to one algorithm
///
/// Carries its public half, so a signer can hand out the matching
/// verifier.
pub struct EcdsaPrivateKey {
    algorithm: EcdsaAlgorithm,
    key: EcKey<Private>,
    public_key: EcdsaPublicKey,
}

impl fmt::Debug for EcdsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EcdsaPrivateKey")
            .field("algorithm", &self.algorithm)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl EcdsaPrivateKey {
    /// Generates a newly minted key pair on the algorithm's curve
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate(algorithm: EcdsaAlgorithm) -> Result<Self> {
        let key = EcKey::generate(algorithm.curve().to_group())
            .map_err(|err| invalid_key(err.to_string()))?;
        Self::from_openssl_eckey(algorithm, key)
    }

    /// Constructs a key pair from a PEM document
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the PEM is not an EC private key
    /// on the algorithm's curve.
    pub fn from_pem(algorithm: EcdsaAlgorithm, pem: &str) -> Result<Self> {
        let key = EcKey::private_key_from_pem(pem.as_bytes())
            .map_err(|err| invalid_key(err.to_string()))?;
        Self::from_openssl_eckey(algorithm, key)
    }

    fn from_openssl_eckey(algorithm: EcdsaAlgorithm, key: EcKey<Private>) -> Result<Self> {
        check_curve(algorithm, key.group())?;
        key.check_key().map_err(|_| invalid_key("key failed validation"))?;
        let public = EcKey::from_public_key(key.group(), key.public_key())
            .map_err(|err| invalid_key(err.to_string()))?;
        Ok(Self {
            algorithm,
            key,
            public_key: EcdsaPublicKey {
                algorithm,
                key: public,
            },
        })
    }

    /// Serializes the private key as a PEM document
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be serialized.
    pub fn to_pem(&self) -> Result<String> {
        let pem = self
            .key
            .private_key_to_pem()
            .map_err(|err| invalid_key(err.to_string()))?;
        String::from_utf8(pem).map_err(|err| invalid_key(err.to_string()))
    }

    /// The algorithm this key is bound to
    #[must_use]
    pub fn algorithm(&self) -> EcdsaAlgorithm {
        self.algorithm
    }

    /// Provides access to the public half of the key pair
    #[must_use]
    pub fn public_key(&self) -> &EcdsaPublicKey {
        &self.public_key
    }
}

fn check_curve(algorithm: EcdsaAlgorithm, group: &EcGroupRef) -> Result<()> {
    if Curve::from_group(group) == Some(algorithm.curve()) {
        Ok(())
    } else {
        Err(invalid_key(format!(
            "key is not on the {algorithm} curve"
        )))
    }
}

impl jws::Signer for EcdsaPrivateKey {
    fn algorithm(&self) -> jwa::Algorithm {
        self.algorithm.into()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let digest =
            hash(self.algorithm.message_digest(), data).map_err(|_| Error::InvalidSignature)?;
        let signature = EcdsaSig::sign(&digest, &self.key).map_err(|_| Error::InvalidSignature)?;
        let width = self.algorithm.curve().field_size() as i32;
        let mut out = signature
            .r()
            .to_vec_padded(width)
            .map_err(|_| Error::InvalidSignature)?;
        out.extend(
            signature
                .s()
                .to_vec_padded(width)
                .map_err(|_| Error::InvalidSignature)?,
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jws::{Signer, Verifier};

    fn algorithms() -> [EcdsaAlgorithm; 3] {
        [
            EcdsaAlgorithm::ES256,
            EcdsaAlgorithm::ES384,
            EcdsaAlgorithm::ES512,
        ]
    }

    #[test]
    fn signatures_have_fixed_width() {
        for alg in algorithms() {
            let key = EcdsaPrivateKey::generate(alg).unwrap();
            let signature = key.sign(b"data").unwrap();
            assert_eq!(signature.len(), alg.signature_size());
        }
    }

    #[test]
    fn sign_then_verify() {
        for alg in algorithms() {
            let key = EcdsaPrivateKey::generate(alg).unwrap();
            let signature = key.sign(b"data").unwrap();
            key.public_key().verify(b"data", &signature).unwrap();
        }
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256).unwrap();
        let mut signature = key.sign(b"data").unwrap();
        signature[10] ^= 1;
        assert_eq!(
            key.public_key().verify(b"data", &signature),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_wrong_length_signature() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256).unwrap();
        let signature = key.sign(b"data").unwrap();
        assert_eq!(
            key.public_key().verify(b"data", &signature[..63]),
            Err(Error::InvalidSignature)
        );

        let mut padded = signature;
        padded.push(0);
        assert_eq!(
            key.public_key().verify(b"data", &padded),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_other_message() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES384).unwrap();
        let signature = key.sign(b"data").unwrap();
        assert_eq!(
            key.public_key().verify(b"other", &signature),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn public_key_round_trips_through_pem() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256).unwrap();
        let pem = key.public_key().to_pem().unwrap();
        let restored = EcdsaPublicKey::from_pem(EcdsaAlgorithm::ES256, &pem).unwrap();
        let signature = key.sign(b"data").unwrap();
        restored.verify(b"data", &signature).unwrap();
    }

    #[test]
    fn private_key_round_trips_through_pem() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES512).unwrap();
        let pem = key.to_pem().unwrap();
        let restored = EcdsaPrivateKey::from_pem(EcdsaAlgorithm::ES512, &pem).unwrap();
        let signature = restored.sign(b"data").unwrap();
        key.public_key().verify(b"data", &signature).unwrap();
    }

    #[test]
    fn pem_with_wrong_curve_is_rejected() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256).unwrap();
        let pem = key.public_key().to_pem().unwrap();
        assert!(matches!(
            EcdsaPublicKey::from_pem(EcdsaAlgorithm::ES384, &pem),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn off_curve_point_is_rejected() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256).unwrap();

        let group = Curve::P256.to_group();
        let mut ctx = openssl::bn::BigNumContext::new().unwrap();
        let mut x = BigNum::new().unwrap();
        let mut y = BigNum::new().unwrap();
        key.public_key
            .key
            .public_key()
            .affine_coordinates_gfp(group, &mut x, &mut y, &mut ctx)
            .unwrap();

        let x = x.to_vec();
        let mut y = y.to_vec();
        *y.last_mut().unwrap() ^= 1;

        assert!(EcdsaPublicKey::from_affine_coordinates(EcdsaAlgorithm::ES256, &x, &y).is_err());
        assert!(EcdsaPublicKey::from_affine_coordinates(EcdsaAlgorithm::ES256, &x, &x).is_err());
    }

    #[test]
    fn on_curve_point_is_accepted() {
        let key = EcdsaPrivateKey::generate(EcdsaAlgorithm::ES384).unwrap();

        let group = Curve::P384.to_group();
        let mut ctx = openssl::bn::BigNumContext::new().unwrap();
        let mut x = BigNum::new().unwrap();
        let mut y = BigNum::new().unwrap();
        key.public_key
            .key
            .public_key()
            .affine_coordinates_gfp(group, &mut x, &mut y, &mut ctx)
            .unwrap();

        let restored = EcdsaPublicKey::from_affine_coordinates(
            EcdsaAlgorithm::ES384,
            &x.to_vec(),
            &y.to_vec(),
        )
        .unwrap();

        let signature = key.sign(b"data").unwrap();
        restored.verify(b"data", &signature).unwrap();
    }
}
