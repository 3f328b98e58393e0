//! The claim model
//!
//! A [`RawJwt`] owns one JSON object whose keys are claim names. The
//! seven registered names from [RFC 7519 §4.1][rfc] carry prescribed
//! JSON kinds and are reached through dedicated typed accessors; every
//! other name is a custom claim and may hold any JSON kind, including
//! null.
//!
//! A raw claim set has not been verified. It is either an input to
//! [`JwtMac::compute_and_encode`][crate::JwtMac::compute_and_encode] /
//! [`JwtSigner::sign_and_encode`][crate::JwtSigner::sign_and_encode], or
//! an intermediate the verify path wraps into a
//! [`VerifiedJwt`][crate::VerifiedJwt] once its signature and claims
//! have checked out.
//!
//! [rfc]: https://tools.ietf.org/html/rfc7519#section-4.1

use serde_json::{Map, Number, Value};
use vigil_clock::UnixTime;

use crate::{
    error::{invalid_argument, not_found, Error, Result},
    json,
};

pub(crate) const CLAIM_ISSUER: &str = "iss";
pub(crate) const CLAIM_SUBJECT: &str = "sub";
pub(crate) const CLAIM_AUDIENCE: &str = "aud";
pub(crate) const CLAIM_EXPIRATION: &str = "exp";
pub(crate) const CLAIM_NOT_BEFORE: &str = "nbf";
pub(crate) const CLAIM_ISSUED_AT: &str = "iat";
pub(crate) const CLAIM_JWT_ID: &str = "jti";

fn is_registered_claim_name(name: &str) -> bool {
    matches!(
        name,
        CLAIM_ISSUER
            | CLAIM_SUBJECT
            | CLAIM_AUDIENCE
            | CLAIM_EXPIRATION
            | CLAIM_NOT_BEFORE
            | CLAIM_ISSUED_AT
            | CLAIM_JWT_ID
    )
}

fn number_to_unix_time(number: &Number, name: &str) -> Result<UnixTime> {
    if let Some(secs) = number.as_u64() {
        return Ok(UnixTime(secs));
    }
    let secs = number
        .as_f64()
        .filter(|secs| secs.is_finite() && *secs >= 0.0 && *secs < u64::MAX as f64)
        .ok_or_else(|| invalid_argument(format!("claim '{name}' is not a valid timestamp")))?;
    Ok(UnixTime(secs as u64))
}

/// An unverified set of claims
///
/// Construct one with [`RawJwt::builder`]; the verify path produces them
/// from a token's payload. A constructed claim set is immutable.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RawJwt {
    claims: Map<String, Value>,
}

impl RawJwt {
    /// Starts building a new claim set
    #[must_use]
    pub fn builder() -> RawJwtBuilder {
        RawJwtBuilder::default()
    }

    /// Parses a claim set from its JSON payload
    pub(crate) fn from_json(json: &str) -> Result<Self> {
        let claims = json::parse_object(json).map_err(|_| Error::MalformedToken)?;
        Ok(Self { claims })
    }

    /// Serializes the claim set as its JSON payload
    ///
    /// The output is compact and deterministic: the same claim set
    /// always serializes to the same bytes.
    #[must_use]
    pub fn to_json(&self) -> String {
        json::to_string(&self.claims)
    }

    fn registered_string(&self, name: &'static str) -> Result<&str> {
        match self.claims.get(name) {
            None => Err(not_found(name)),
            Some(Value::String(value)) => Ok(value),
            Some(_) => Err(invalid_argument(format!("claim '{name}' is not a string"))),
        }
    }

    fn registered_time(&self, name: &'static str) -> Result<UnixTime> {
        match self.claims.get(name) {
            None => Err(not_found(name)),
            Some(Value::Number(value)) => number_to_unix_time(value, name),
            Some(_) => Err(invalid_argument(format!("claim '{name}' is not a number"))),
        }
    }

    /// Whether an `iss` claim is present
    #[must_use]
    pub fn has_issuer(&self) -> bool {
        self.claims.contains_key(CLAIM_ISSUER)
    }

    /// The `iss` claim
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if not
    /// a string.
    pub fn issuer(&self) -> Result<&str> {
        self.registered_string(CLAIM_ISSUER)
    }

    /// Whether a `sub` claim is present
    #[must_use]
    pub fn has_subject(&self) -> bool {
        self.claims.contains_key(CLAIM_SUBJECT)
    }

    /// The `sub` claim
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if not
    /// a string.
    pub fn subject(&self) -> Result<&str> {
        self.registered_string(CLAIM_SUBJECT)
    }

    /// Whether a `jti` claim is present
    #[must_use]
    pub fn has_jwt_id(&self) -> bool {
        self.claims.contains_key(CLAIM_JWT_ID)
    }

    /// The `jti` claim
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if not
    /// a string.
    pub fn jwt_id(&self) -> Result<&str> {
        self.registered_string(CLAIM_JWT_ID)
    }

    /// Whether an `aud` claim is present
    #[must_use]
    pub fn has_audiences(&self) -> bool {
        self.claims.contains_key(CLAIM_AUDIENCE)
    }

    /// The audience list
    ///
    /// A single-string `aud` claim is returned as a one-element list, so
    /// callers never see the two wire representations.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if not
    /// a string or a non-empty array of strings.
    pub fn audiences(&self) -> Result<Vec<&str>> {
        match self.claims.get(CLAIM_AUDIENCE) {
            None => Err(not_found(CLAIM_AUDIENCE)),
            Some(Value::String(value)) => Ok(vec![value]),
            Some(Value::Array(values)) => {
                let mut audiences = Vec::with_capacity(values.len());
                for value in values {
                    match value {
                        Value::String(value) => audiences.push(value.as_str()),
                        _ => {
                            return Err(invalid_argument(
                                "claim 'aud' is not a list of strings",
                            ))
                        }
                    }
                }
                if audiences.is_empty() {
                    return Err(invalid_argument("claim 'aud' is an empty list"));
                }
                Ok(audiences)
            }
            Some(_) => Err(invalid_argument(
                "claim 'aud' is not a string or list of strings",
            )),
        }
    }

    /// Whether an `exp` claim is present
    #[must_use]
    pub fn has_expiration(&self) -> bool {
        self.claims.contains_key(CLAIM_EXPIRATION)
    }

    /// The `exp` claim, truncated to whole seconds
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if not
    /// a non-negative, finite number.
    pub fn expiration(&self) -> Result<UnixTime> {
        self.registered_time(CLAIM_EXPIRATION)
    }

    /// Whether an `nbf` claim is present
    #[must_use]
    pub fn has_not_before(&self) -> bool {
        self.claims.contains_key(CLAIM_NOT_BEFORE)
    }

    /// The `nbf` claim, truncated to whole seconds
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if not
    /// a non-negative, finite number.
    pub fn not_before(&self) -> Result<UnixTime> {
        self.registered_time(CLAIM_NOT_BEFORE)
    }

    /// Whether an `iat` claim is present
    #[must_use]
    pub fn has_issued_at(&self) -> bool {
        self.claims.contains_key(CLAIM_ISSUED_AT)
    }

    /// The `iat` claim, truncated to whole seconds
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if not
    /// a non-negative, finite number.
    pub fn issued_at(&self) -> Result<UnixTime> {
        self.registered_time(CLAIM_ISSUED_AT)
    }

    fn custom_claim(&self, name: &str) -> Result<&Value> {
        if is_registered_claim_name(name) {
            return Err(invalid_argument(format!(
                "claim '{name}' is a registered name; use the corresponding accessor"
            )));
        }
        self.claims.get(name).ok_or_else(|| not_found(name))
    }

    fn has_custom_claim_matching(&self, name: &str, matches: fn(&Value) -> bool) -> bool {
        if is_registered_claim_name(name) {
            return false;
        }
        self.claims.get(name).map_or(false, matches)
    }

    /// Whether `name` is a custom claim holding JSON null
    #[must_use]
    pub fn is_null_claim(&self, name: &str) -> bool {
        self.has_custom_claim_matching(name, Value::is_null)
    }

    /// Whether `name` is a custom claim holding a boolean
    #[must_use]
    pub fn has_bool_claim(&self, name: &str) -> bool {
        self.has_custom_claim_matching(name, Value::is_boolean)
    }

    /// The boolean custom claim `name`
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if
    /// `name` is registered or the claim is not a boolean.
    pub fn bool_claim(&self, name: &str) -> Result<bool> {
        match self.custom_claim(name)? {
            Value::Bool(value) => Ok(*value),
            _ => Err(invalid_argument(format!("claim '{name}' is not a bool"))),
        }
    }

    /// Whether `name` is a custom claim holding a string
    #[must_use]
    pub fn has_string_claim(&self, name: &str) -> bool {
        self.has_custom_claim_matching(name, Value::is_string)
    }

    /// The string custom claim `name`
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if
    /// `name` is registered or the claim is not a string.
    pub fn string_claim(&self, name: &str) -> Result<&str> {
        match self.custom_claim(name)? {
            Value::String(value) => Ok(value),
            _ => Err(invalid_argument(format!("claim '{name}' is not a string"))),
        }
    }

    /// Whether `name` is a custom claim holding a number
    #[must_use]
    pub fn has_number_claim(&self, name: &str) -> bool {
        self.has_custom_claim_matching(name, Value::is_number)
    }

    /// The numeric custom claim `name`
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if
    /// `name` is registered or the claim is not a number.
    pub fn number_claim(&self, name: &str) -> Result<f64> {
        match self.custom_claim(name)? {
            Value::Number(value) => value
                .as_f64()
                .ok_or_else(|| invalid_argument(format!("claim '{name}' is not representable"))),
            _ => Err(invalid_argument(format!("claim '{name}' is not a number"))),
        }
    }

    /// Whether `name` is a custom claim holding a JSON object
    #[must_use]
    pub fn has_json_object_claim(&self, name: &str) -> bool {
        self.has_custom_claim_matching(name, Value::is_object)
    }

    /// The JSON object custom claim `name`, re-serialized in compact
    /// form
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if
    /// `name` is registered or the claim is not an object.
    pub fn json_object_claim(&self, name: &str) -> Result<String> {
        match self.custom_claim(name)? {
            Value::Object(value) => Ok(json::to_string(value)),
            _ => Err(invalid_argument(format!(
                "claim '{name}' is not a JSON object"
            ))),
        }
    }

    /// Whether `name` is a custom claim holding a JSON array
    #[must_use]
    pub fn has_json_array_claim(&self, name: &str) -> bool {
        self.has_custom_claim_matching(name, Value::is_array)
    }

    /// The JSON array custom claim `name`, re-serialized in compact form
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent, [`Error::InvalidArgument`] if
    /// `name` is registered or the claim is not an array.
    pub fn json_array_claim(&self, name: &str) -> Result<String> {
        match self.custom_claim(name)? {
            Value::Array(value) => Ok(json::to_string(value)),
            _ => Err(invalid_argument(format!(
                "claim '{name}' is not a JSON array"
            ))),
        }
    }

    /// The names of every claim that is not one of the seven registered
    /// names
    #[must_use]
    pub fn custom_claim_names(&self) -> Vec<&str> {
        self.claims
            .keys()
            .filter(|name| !is_registered_claim_name(name))
            .map(String::as_str)
            .collect()
    }
}

/// Builds a [`RawJwt`]
///
/// Registered claims have dedicated setters; custom claims go through
/// the fallible `add_*_claim` methods, which refuse registered names.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct RawJwtBuilder {
    claims: Map<String, Value>,
}

impl RawJwtBuilder {
    /// Starts an empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `iss` claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.claims
            .insert(CLAIM_ISSUER.to_owned(), Value::String(issuer.into()));
        self
    }

    /// Sets the `sub` claim
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.claims
            .insert(CLAIM_SUBJECT.to_owned(), Value::String(subject.into()));
        self
    }

    /// Sets the `jti` claim
    pub fn with_jwt_id(mut self, jwt_id: impl Into<String>) -> Self {
        self.claims
            .insert(CLAIM_JWT_ID.to_owned(), Value::String(jwt_id.into()));
        self
    }

    /// Appends an audience to the `aud` claim
    ///
    /// The wire representation is always a JSON array, even for a
    /// single audience.
    pub fn add_audience(mut self, audience: impl Into<String>) -> Self {
        match self
            .claims
            .entry(CLAIM_AUDIENCE)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(audiences) => audiences.push(Value::String(audience.into())),
            _ => unreachable!("the builder only ever stores an array under 'aud'"),
        }
        self
    }

    /// Sets the `exp` claim, in whole seconds since the Unix epoch
    pub fn with_expiration(mut self, expiration: UnixTime) -> Self {
        self.claims.insert(
            CLAIM_EXPIRATION.to_owned(),
            Value::Number(expiration.0.into()),
        );
        self
    }

    /// Sets the `nbf` claim, in whole seconds since the Unix epoch
    pub fn with_not_before(mut self, not_before: UnixTime) -> Self {
        self.claims.insert(
            CLAIM_NOT_BEFORE.to_owned(),
            Value::Number(not_before.0.into()),
        );
        self
    }

    /// Sets the `iat` claim, in whole seconds since the Unix epoch
    pub fn with_issued_at(mut self, issued_at: UnixTime) -> Self {
        self.claims.insert(
            CLAIM_ISSUED_AT.to_owned(),
            Value::Number(issued_at.0.into()),
        );
        self
    }

    fn add_custom(mut self, name: String, value: Value) -> Result<Self> {
        if name.is_empty() {
            return Err(invalid_argument("claim name must not be empty"));
        }
        if is_registered_claim_name(&name) {
            return Err(invalid_argument(format!(
                "claim '{name}' is a registered name; use the corresponding builder method"
            )));
        }
        self.claims.insert(name, value);
        Ok(self)
    }

    /// Adds a custom claim holding JSON null
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or registered.
    pub fn add_null_claim(self, name: impl Into<String>) -> Result<Self> {
        self.add_custom(name.into(), Value::Null)
    }

    /// Adds a boolean custom claim
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or registered.
    pub fn add_bool_claim(self, name: impl Into<String>, value: bool) -> Result<Self> {
        self.add_custom(name.into(), Value::Bool(value))
    }

    /// Adds a string custom claim
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or registered.
    pub fn add_string_claim(
        self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        self.add_custom(name.into(), Value::String(value.into()))
    }

    /// Adds a numeric custom claim
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or registered, or
    /// if the value is not finite.
    pub fn add_number_claim(self, name: impl Into<String>, value: f64) -> Result<Self> {
        let number =
            Number::from_f64(value).ok_or_else(|| invalid_argument("number is not finite"))?;
        self.add_custom(name.into(), Value::Number(number))
    }

    /// Adds a custom claim parsed from JSON object text
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or registered, or
    /// if `value` is not a strict JSON object.
    pub fn add_json_object_claim(self, name: impl Into<String>, value: &str) -> Result<Self> {
        let object = json::parse_object(value)
            .map_err(|err| invalid_argument(format!("not a JSON object: {err}")))?;
        self.add_custom(name.into(), Value::Object(object))
    }

    /// Adds a custom claim parsed from JSON array text
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `name` is empty or registered, or
    /// if `value` is not a strict JSON array.
    pub fn add_json_array_claim(self, name: impl Into<String>, value: &str) -> Result<Self> {
        let array = json::parse_array(value)
            .map_err(|err| invalid_argument(format!("not a JSON array: {err}")))?;
        self.add_custom(name.into(), Value::Array(array))
    }

    /// Finishes the claim set
    #[must_use]
    pub fn build(self) -> RawJwt {
        RawJwt {
            claims: self.claims,
        }
    }
}
