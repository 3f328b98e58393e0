//! JWS compact serialization
//!
//! A compact token is `base64url(header) "." base64url(payload) "."
//! base64url(tag)`. The signature boundary is the **last** dot: the
//! base64url alphabet cannot contain `.`, so a well-formed token has
//! exactly two, and splitting on the last one first keeps the parse
//! unambiguous even for garbage inputs with extra dots.

use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    json,
    jwa::Algorithm,
    jws,
    jwt::RawJwt,
    validator::JwtValidator,
    verified::VerifiedJwt,
};

#[derive(Serialize)]
struct Header {
    alg: Algorithm,
    typ: &'static str,
}

/// Builds the encoded header for the given algorithm
///
/// The canonical header is `{"alg":"<ALG>","typ":"JWT"}`; it depends
/// only on the algorithm, so handles compute it once at construction.
pub(crate) fn create_header(alg: Algorithm) -> String {
    let header = Header { alg, typ: "JWT" };
    vigil_base64::encode(json::to_string(&header))
}

/// Checks a decoded token's header against the handle's algorithm
pub(crate) fn validate_header(encoded_header: &str, algorithm: Algorithm) -> Result<()> {
    let raw = vigil_base64::decode(encoded_header).map_err(|_| Error::MalformedToken)?;
    let json = std::str::from_utf8(&raw).map_err(|_| Error::MalformedToken)?;
    let header = json::parse_object(json).map_err(|_| Error::MalformedToken)?;

    if let Some(typ) = header.get("typ") {
        if typ.as_str() != Some("JWT") {
            return Err(Error::InvalidHeader("typ must be \"JWT\""));
        }
    }
    match header.get("alg").and_then(Value::as_str) {
        Some(alg) if alg == algorithm.name() => {}
        Some(_) => return Err(Error::AlgorithmMismatch),
        None => return Err(Error::InvalidHeader("alg must be a string")),
    }
    if header.contains_key("crit") {
        return Err(Error::InvalidHeader(
            "crit header parameters are not supported",
        ));
    }
    Ok(())
}

/// A compact token decomposed into its three segments
#[derive(Debug)]
pub(crate) struct Split<'a> {
    pub(crate) signing_input: &'a str,
    pub(crate) encoded_header: &'a str,
    pub(crate) encoded_payload: &'a str,
    pub(crate) encoded_tag: &'a str,
}

/// Splits a compact token on the last dot, then requires the signing
/// input to hold exactly one more
pub(crate) fn split(compact: &str) -> Result<Split<'_>> {
    let (signing_input, encoded_tag) = compact.rsplit_once('.').ok_or(Error::MalformedToken)?;
    let (encoded_header, encoded_payload) =
        signing_input.split_once('.').ok_or(Error::MalformedToken)?;
    if encoded_payload.contains('.') {
        return Err(Error::MalformedToken);
    }
    if encoded_header.is_empty() || encoded_payload.is_empty() || encoded_tag.is_empty() {
        return Err(Error::MalformedToken);
    }
    Ok(Split {
        signing_input,
        encoded_header,
        encoded_payload,
        encoded_tag,
    })
}

/// Serializes and signs a claim set into a compact token
pub(crate) fn encode_compact(
    encoded_header: &str,
    token: &RawJwt,
    signer: &impl jws::Signer,
) -> Result<String> {
    let encoded_payload = vigil_base64::encode(token.to_json());
    let expected_len = encoded_header.len()
        + encoded_payload.len()
        + vigil_base64::encoded_len(signer.algorithm().signature_size())
        + 2;

    let mut compact = String::with_capacity(expected_len);
    write!(compact, "{encoded_header}.{encoded_payload}").expect("writes to strings never fail");

    let tag = signer.sign(compact.as_bytes())?;

    write!(compact, ".{}", vigil_base64::encode(tag)).expect("writes to strings never fail");
    debug_assert_eq!(compact.len(), expected_len);

    Ok(compact)
}

/// Verifies a compact token and decodes its claims
///
/// The tag is verified over the signing input before the header or
/// payload are parsed any further than the structural split, so a
/// forger learns nothing about the parser from this path.
pub(crate) fn decode_compact(
    compact: &str,
    verifier: &impl jws::Verifier,
    validator: &JwtValidator,
) -> Result<VerifiedJwt> {
    let parts = split(compact)?;
    let tag = vigil_base64::decode(parts.encoded_tag).map_err(|_| Error::MalformedToken)?;

    verifier.verify(parts.signing_input.as_bytes(), &tag)?;

    // The decoder tolerates non-zero trailing bits, so two encodings can
    // map to one tag. Only the canonical encoding may pass.
    if vigil_base64::encode(&tag) != parts.encoded_tag.trim_end_matches('=') {
        return Err(Error::MalformedToken);
    }

    validate_header(parts.encoded_header, verifier.algorithm())?;

    let payload = vigil_base64::decode(parts.encoded_payload).map_err(|_| Error::MalformedToken)?;
    let payload = String::from_utf8(payload).map_err(|_| Error::MalformedToken)?;
    let token = RawJwt::from_json(&payload)?;

    validator.validate(&token)?;

    Ok(VerifiedJwt::new(token))
}
