//! The result of a successful verification

use crate::jwt::RawJwt;

/// A claim set whose token passed signature verification and claim
/// validation
///
/// Instances can only be produced by this crate's verify paths. The
/// wrapped claims are reached through [`claims`][Self::claims] and offer
/// the full set of read accessors; there is no way to mutate them or
/// sign them again.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifiedJwt {
    claims: RawJwt,
}

impl VerifiedJwt {
    pub(crate) fn new(claims: RawJwt) -> Self {
        Self { claims }
    }

    /// The validated claims
    #[must_use]
    pub fn claims(&self) -> &RawJwt {
        &self.claims
    }

    /// Extracts the validated claims
    #[must_use]
    pub fn into_claims(self) -> RawJwt {
        self.claims
    }

    /// Serializes the validated claims as JSON
    #[must_use]
    pub fn to_json(&self) -> String {
        self.claims.to_json()
    }
}
