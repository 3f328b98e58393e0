//! The asymmetric token handles
//!
//! Signing and verification are split across two handles, matching the
//! split of the key material: a [`JwtSigner`] owns a private key, while
//! a [`JwtVerifier`] needs only the public half.

use crate::{
    error::Result,
    format,
    jwa::{EcdsaAlgorithm, EcdsaPrivateKey, EcdsaPublicKey},
    jwt::RawJwt,
    validator::JwtValidator,
    verified::VerifiedJwt,
};

/// Produces ECDSA-signed tokens with one private key
#[derive(Debug)]
pub struct JwtSigner {
    encoded_header: String,
    key: EcdsaPrivateKey,
}

impl JwtSigner {
    /// Constructs a handle around an ECDSA private key
    #[must_use]
    pub fn new(key: EcdsaPrivateKey) -> Self {
        Self {
            encoded_header: format::create_header(key.algorithm().into()),
            key,
        }
    }

    /// The algorithm bound to the handle's key
    #[must_use]
    pub fn algorithm(&self) -> EcdsaAlgorithm {
        self.key.algorithm()
    }

    /// A verifier for tokens produced by this signer
    #[must_use]
    pub fn verifier(&self) -> JwtVerifier {
        JwtVerifier::new(self.key.public_key().clone())
    }

    /// Serializes and signs a claim set into a compact token
    ///
    /// # Errors
    ///
    /// Returns an error if the signature primitive fails.
    pub fn sign_and_encode(&self, token: &RawJwt) -> Result<String> {
        format::encode_compact(&self.encoded_header, token, &self.key)
    }
}

/// Verifies ECDSA-signed tokens with one public key
#[derive(Debug)]
pub struct JwtVerifier {
    key: EcdsaPublicKey,
}

impl JwtVerifier {
    /// Constructs a handle around an ECDSA public key
    #[must_use]
    pub fn new(key: EcdsaPublicKey) -> Self {
        Self { key }
    }

    /// The algorithm bound to the handle's key
    #[must_use]
    pub fn algorithm(&self) -> EcdsaAlgorithm {
        self.key.algorithm()
    }

    /// Verifies a compact token's signature, then validates its claims
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedToken`][crate::Error::MalformedToken]
    /// for structural problems,
    /// [`Error::InvalidSignature`][crate::Error::InvalidSignature] if
    /// the signature does not verify, header errors per the header
    /// contract, and the validator's error for a policy violation.
    pub fn verify_and_decode(&self, compact: &str, validator: &JwtValidator) -> Result<VerifiedJwt> {
        format::decode_compact(compact, &self.key, validator)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use vigil_clock::UnixTime;

    use super::*;
    use crate::error::Error;

    fn validator_at(now: u64) -> JwtValidator {
        JwtValidator::builder().fixed_now(UnixTime(now)).build()
    }

    #[test]
    fn round_trip_es256() -> Result<()> {
        round_trip(EcdsaAlgorithm::ES256)
    }

    #[test]
    fn round_trip_es384() -> Result<()> {
        round_trip(EcdsaAlgorithm::ES384)
    }

    #[test]
    fn round_trip_es512() -> Result<()> {
        round_trip(EcdsaAlgorithm::ES512)
    }

    fn round_trip(algorithm: EcdsaAlgorithm) -> Result<()> {
        let signer = JwtSigner::new(EcdsaPrivateKey::generate(algorithm)?);

        let token = RawJwt::builder()
            .with_issuer("issuer")
            .add_audience("audience")
            .with_expiration(UnixTime(2000))
            .add_number_claim("version", 2.0)?
            .build();

        let compact = signer.sign_and_encode(&token)?;
        let verified = signer.verifier().verify_and_decode(&compact, &validator_at(1000))?;
        assert_eq!(verified.claims(), &token);
        Ok(())
    }

    #[test]
    fn header_carries_the_algorithm_name() -> Result<()> {
        let signer = JwtSigner::new(EcdsaPrivateKey::generate(EcdsaAlgorithm::ES384)?);
        let token = RawJwt::builder().with_expiration(UnixTime(100)).build();
        let compact = signer.sign_and_encode(&token)?;

        let header = compact.split('.').next().unwrap();
        let header = vigil_base64::decode(header)?;
        assert_eq!(header, br#"{"alg":"ES384","typ":"JWT"}"#);
        Ok(())
    }

    #[test]
    fn verification_fails_under_a_different_key() -> Result<()> {
        let signer = JwtSigner::new(EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256)?);
        let other = JwtSigner::new(EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256)?);

        let token = RawJwt::builder().with_expiration(UnixTime(100)).build();
        let compact = signer.sign_and_encode(&token)?;

        assert_eq!(
            other
                .verifier()
                .verify_and_decode(&compact, &validator_at(50))
                .unwrap_err(),
            Error::InvalidSignature
        );
        Ok(())
    }

    #[test]
    fn tampered_payload_is_an_invalid_signature() -> Result<()> {
        let signer = JwtSigner::new(EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256)?);
        let token = RawJwt::builder()
            .with_issuer("issuer")
            .with_expiration(UnixTime(100))
            .build();
        let compact = signer.sign_and_encode(&token)?;

        let mut parts: Vec<&str> = compact.split('.').collect();
        let forged_payload = vigil_base64::encode(br#"{"exp":100,"iss":"forged"}"#);
        parts[1] = &forged_payload;
        let forged = parts.join(".");

        assert_eq!(
            signer
                .verifier()
                .verify_and_decode(&forged, &validator_at(50))
                .unwrap_err(),
            Error::InvalidSignature
        );
        Ok(())
    }

    #[test]
    fn truncated_signature_is_rejected() -> Result<()> {
        let signer = JwtSigner::new(EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256)?);
        let token = RawJwt::builder().with_expiration(UnixTime(100)).build();
        let compact = signer.sign_and_encode(&token)?;

        let truncated = &compact[..compact.len() - 4];
        let err = signer
            .verifier()
            .verify_and_decode(truncated, &validator_at(50))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSignature | Error::MalformedToken
        ));
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected_after_signature_checks() -> Result<()> {
        let signer = JwtSigner::new(EcdsaPrivateKey::generate(EcdsaAlgorithm::ES512)?);
        let token = RawJwt::builder().with_expiration(UnixTime(100)).build();
        let compact = signer.sign_and_encode(&token)?;

        assert_eq!(
            signer
                .verifier()
                .verify_and_decode(&compact, &validator_at(100))
                .unwrap_err(),
            Error::TokenExpired
        );
        Ok(())
    }

    #[test]
    fn audience_policy_applies_to_signed_tokens() -> Result<()> {
        let signer = JwtSigner::new(EcdsaPrivateKey::generate(EcdsaAlgorithm::ES256)?);
        let token = RawJwt::builder()
            .add_audience("a")
            .with_expiration(UnixTime(100))
            .build();
        let compact = signer.sign_and_encode(&token)?;

        let validator = JwtValidator::builder()
            .fixed_now(UnixTime(50))
            .expect_audience("b")
            .build();
        assert_eq!(
            signer
                .verifier()
                .verify_and_decode(&compact, &validator)
                .unwrap_err(),
            Error::AudienceMismatch
        );
        Ok(())
    }
}
