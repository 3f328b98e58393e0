//! Strict base64url codec for JOSE-style tokens
//!
//! Every segment of a compact token is encoded with the URL- and
//! filename-safe base64 alphabet from [RFC 4648 §5][rfc], with the
//! trailing padding removed. Decoding is strict: any byte outside the
//! URL-safe alphabet (including whitespace, `+`, and `/`) is rejected,
//! while a trailing run of canonical `=` padding is tolerated but never
//! required.
//!
//! [rfc]: https://tools.ietf.org/html/rfc4648#section-5

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_must_use
)]
#![forbid(unsafe_code)]

use std::{error::Error, fmt};

use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

// Decoding allows non-zero trailing bits in the final symbol, matching
// the web-safe decoders JWS tokens are produced and consumed with in the
// wild. Canonical-form enforcement is the caller's concern.
const URL_SAFE_TOLERANT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// An error while decoding a value which is not properly formatted
/// base64url data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidBase64Data {
    source: base64::DecodeError,
}

impl From<base64::DecodeError> for InvalidBase64Data {
    fn from(err: base64::DecodeError) -> Self {
        Self { source: err }
    }
}

impl fmt::Display for InvalidBase64Data {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid base64url data")
    }
}

impl Error for InvalidBase64Data {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Encodes raw bytes using the URL-safe base64 alphabet, without padding
pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_TOLERANT.encode(data)
}

/// Strictly decodes a base64url value into raw bytes
///
/// Only the URL-safe alphabet is accepted; a trailing run of canonical
/// `=` padding is tolerated. Anything else, including whitespace and
/// the standard-alphabet `+` and `/` characters, is an error.
///
/// # Errors
///
/// Returns an error if the input is not valid base64url data.
pub fn decode(encoded: impl AsRef<[u8]>) -> Result<Vec<u8>, InvalidBase64Data> {
    Ok(URL_SAFE_TOLERANT.decode(encoded)?)
}

/// The length of the unpadded encoding of `len` raw bytes
#[must_use]
pub const fn encoded_len(len: usize) -> usize {
    (len * 4 + 2) / 3
}

/// Owned bytes whose textual form is their unpadded base64url encoding
///
/// The raw bytes are the canonical representation; the encoding only
/// materializes when the value is displayed or serialized. Key material
/// and token segments carried inside JSON use this type so that the
/// string form on the wire is always the strict encoding accepted by
/// [`decode`].
#[derive(Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct Base64Url(Vec<u8>);

impl Base64Url {
    /// Wraps raw bytes without touching them
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    /// Strictly decodes an encoded value into owned bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid base64url data.
    pub fn from_encoded(encoded: impl AsRef<[u8]>) -> Result<Self, InvalidBase64Data> {
        Ok(Self(decode(encoded)?))
    }

    /// The raw bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Unwraps the raw bytes
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&encode(&self.0))
    }
}

/// The encoding is fenced in backticks to keep it distinguishable from
/// surrounding debug output.
impl fmt::Debug for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", encode(&self.0))
    }
}

impl From<Vec<u8>> for Base64Url {
    fn from(raw: Vec<u8>) -> Self {
        Self(raw)
    }
}

impl From<Base64Url> for Vec<u8> {
    fn from(value: Base64Url) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for Base64Url {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Base64Url {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Base64Url {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EncodedVisitor;

        impl<'de> de::Visitor<'de> for EncodedVisitor {
            type Value = Base64Url;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("unpadded base64url data")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Base64Url, E> {
                Base64Url::from_encoded(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(EncodedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_raw_bytes() {
        let data = b"\xfb\xff\x00 base64url round trip";
        let encoded = encode(data);
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn encodes_without_padding() {
        assert_eq!(encode(b"f"), "Zg");
        assert_eq!(encode(b"fo"), "Zm8");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(b"\xfb\xef\xbe"), "----");
    }

    #[test]
    fn tolerates_canonical_padding() {
        assert_eq!(decode("Zg==").unwrap(), b"f");
        assert_eq!(decode("Zm8=").unwrap(), b"fo");
        assert_eq!(decode("Zm9v").unwrap(), b"foo");
    }

    #[test]
    fn rejects_standard_alphabet() {
        assert!(decode("a+b0").is_err());
        assert!(decode("a/b0").is_err());
    }

    #[test]
    fn rejects_whitespace() {
        assert!(decode("Zm 9v").is_err());
        assert!(decode("Zm9v\n").is_err());
        assert!(decode("Zm9v\r").is_err());
        assert!(decode("\tZm9v").is_err());
    }

    #[test]
    fn rejects_impossible_length() {
        assert!(decode("Z").is_err());
        assert!(decode("Zm9vZ").is_err());
    }

    #[test]
    fn rejects_interior_padding() {
        assert!(decode("Zg==Zg").is_err());
    }

    #[test]
    fn tolerates_non_canonical_trailing_bits() {
        assert_eq!(decode("Zh").unwrap(), decode("Zg").unwrap());
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(encode(b""), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encoded_len_matches_encoder() {
        for len in 0..100 {
            let data = vec![0xa5u8; len];
            assert_eq!(encoded_len(len), encode(&data).len());
        }
    }

    #[test]
    fn owned_value_displays_its_encoding() {
        let value = Base64Url::from_raw(&b"foo"[..]);
        assert_eq!(value.to_string(), "Zm9v");
        assert_eq!(format!("{value:?}"), "`Zm9v`");
    }

    #[test]
    fn owned_value_round_trips() {
        let value = Base64Url::from_encoded("Zm9v").unwrap();
        assert_eq!(value.as_slice(), b"foo");
        assert_eq!(Base64Url::from_raw(value.into_inner()).to_string(), "Zm9v");
    }

    #[test]
    fn owned_value_rejects_bad_encodings() {
        assert!(Base64Url::from_encoded("a+b0").is_err());
        assert!(Base64Url::from_encoded("Z").is_err());
    }

    #[test]
    fn owned_value_serializes_as_a_string() {
        let value = Base64Url::from_raw(&b"foo"[..]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#""Zm9v""#);

        let restored: Base64Url = serde_json::from_str(r#""Zm9v""#).unwrap();
        assert_eq!(restored, value);
    }

    #[test]
    fn owned_value_deserialization_is_strict() {
        assert!(serde_json::from_str::<Base64Url>(r#""Zm 9v""#).is_err());
        assert!(serde_json::from_str::<Base64Url>("17").is_err());
    }
}
