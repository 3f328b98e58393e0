//! Policy-driven claim validation

use vigil_clock::{Clock, DurationSecs, System, UnixTime};

use crate::{
    error::{invalid_argument, Error, Result},
    jwt::RawJwt,
};

const MAX_CLOCK_SKEW: DurationSecs = DurationSecs::from_mins(10);

/// A validation policy applied to a token's claims after its signature
/// has been verified
///
/// The default policy checks nothing but expiration: `exp` must be
/// present and in the future. Build one with [`JwtValidator::builder`].
#[derive(Clone, Debug)]
#[must_use]
pub struct JwtValidator {
    expected_issuer: Option<String>,
    expected_subject: Option<String>,
    expected_audience: Option<String>,
    clock_skew: DurationSecs,
    fixed_now: Option<UnixTime>,
    allow_missing_expiration: bool,
}

impl Default for JwtValidator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl JwtValidator {
    /// Starts building a validation policy
    pub fn builder() -> JwtValidatorBuilder {
        JwtValidatorBuilder::default()
    }

    /// Validates the claim set against this policy, using the policy's
    /// fixed time if one was set, else the system clock
    ///
    /// # Errors
    ///
    /// Returns the first policy violation encountered, in the order:
    /// expiration, not-before, issuer, subject, audience.
    pub fn validate(&self, token: &RawJwt) -> Result<()> {
        self.validate_with_clock(token, &System)
    }

    /// Validates the claim set, reading the current time from the given
    /// clock when no fixed time was set
    ///
    /// # Errors
    ///
    /// As for [`validate`][Self::validate].
    pub fn validate_with_clock(&self, token: &RawJwt, clock: &impl Clock) -> Result<()> {
        let now = self.fixed_now.unwrap_or_else(|| clock.now());

        if token.has_expiration() {
            let expiration = token.expiration()?;
            if now >= expiration.saturating_add(self.clock_skew) {
                return Err(Error::TokenExpired);
            }
        } else if !self.allow_missing_expiration {
            return Err(Error::MissingExpiration);
        }

        if token.has_not_before() {
            let not_before = token.not_before()?;
            if now < not_before.saturating_sub(self.clock_skew) {
                return Err(Error::NotYetValid);
            }
        }

        if let Some(expected) = &self.expected_issuer {
            match token.issuer() {
                Ok(issuer) if issuer == expected => {}
                Ok(_) | Err(Error::NotFound(_)) => return Err(Error::IssuerMismatch),
                Err(err) => return Err(err),
            }
        }

        if let Some(expected) = &self.expected_subject {
            match token.subject() {
                Ok(subject) if subject == expected => {}
                Ok(_) | Err(Error::NotFound(_)) => return Err(Error::SubjectMismatch),
                Err(err) => return Err(err),
            }
        }

        if let Some(expected) = &self.expected_audience {
            match token.audiences() {
                Ok(audiences) if audiences.iter().any(|audience| audience == expected) => {}
                Ok(_) | Err(Error::NotFound(_)) => return Err(Error::AudienceMismatch),
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

/// Builds a [`JwtValidator`]
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct JwtValidatorBuilder {
    expected_issuer: Option<String>,
    expected_subject: Option<String>,
    expected_audience: Option<String>,
    clock_skew: DurationSecs,
    fixed_now: Option<UnixTime>,
    allow_missing_expiration: bool,
}

impl JwtValidatorBuilder {
    /// Requires the `iss` claim to be present and equal to `issuer`
    pub fn expect_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    /// Requires the `sub` claim to be present and equal to `subject`
    pub fn expect_subject(mut self, subject: impl Into<String>) -> Self {
        self.expected_subject = Some(subject.into());
        self
    }

    /// Requires the audience list to contain `audience`
    pub fn expect_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    /// Allows a grace period on either side of the `exp` and `nbf`
    /// checks
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the skew exceeds ten
    /// minutes.
    pub fn clock_skew(mut self, skew: DurationSecs) -> Result<Self> {
        if skew > MAX_CLOCK_SKEW {
            return Err(invalid_argument("clock skew too large, max is 10 minutes"));
        }
        self.clock_skew = skew;
        Ok(self)
    }

    /// Pins the validator's notion of "now" instead of reading a clock
    pub fn fixed_now(mut self, now: UnixTime) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// Accepts tokens that carry no `exp` claim
    pub fn allow_missing_expiration(mut self) -> Self {
        self.allow_missing_expiration = true;
        self
    }

    /// Finishes the policy
    pub fn build(self) -> JwtValidator {
        JwtValidator {
            expected_issuer: self.expected_issuer,
            expected_subject: self.expected_subject,
            expected_audience: self.expected_audience,
            clock_skew: self.clock_skew,
            fixed_now: self.fixed_now,
            allow_missing_expiration: self.allow_missing_expiration,
        }
    }
}
