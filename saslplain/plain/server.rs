use std::fmt::{self, Debug, Formatter};

use crate::error::ProtocolViolation;
use crate::mechanism::{Outcome, Rejection, ServerMechanism};
use crate::mechname::Mechname;
use crate::plain::PLAIN;
use crate::validate::{Validator, ValidatorError};

/// A parsed PLAIN message: `[authzid] NUL authcid NUL passwd`.
///
/// Borrows from the token it was parsed from.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    /// Empty means "the same as `authcid`".
    pub authzid: &'a str,
    pub authcid: &'a str,
    pub password: &'a [u8],
}

impl<'a> Credentials<'a> {
    /// Split `token` into its three fields.
    ///
    /// Fails unless the token contains exactly two NUL bytes, a non-empty `authcid`, and
    /// UTF-8 identities.
    pub fn parse(token: &'a [u8]) -> Option<Self> {
        let fields: Vec<&[u8]> = token.split(|b| *b == 0).collect();
        let &[authzid, authcid, password] = fields.as_slice() else {
            return None;
        };
        if authcid.is_empty() {
            return None;
        }
        let authzid = std::str::from_utf8(authzid).ok()?;
        let authcid = std::str::from_utf8(authcid).ok()?;
        Some(Self {
            authzid,
            authcid,
            password,
        })
    }

    /// The identity the peer will act as once authenticated.
    pub fn negotiated_identity(&self) -> &'a str {
        if self.authzid.is_empty() {
            self.authcid
        } else {
            self.authzid
        }
    }
}

impl Debug for Credentials<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("authzid", &self.authzid)
            .field("authcid", &self.authcid)
            .finish_non_exhaustive()
    }
}

static NAME: Mechname = PLAIN;

enum State {
    Initial,
    Completed(Outcome),
}

/// Single-step PLAIN negotiation.
///
/// Accepts exactly one token and then stays in its terminal state.
pub struct PlainServer {
    validator: Validator,
    state: State,
    validator_error: Option<ValidatorError>,
}

impl PlainServer {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            state: State::Initial,
            validator_error: None,
        }
    }

    /// The internal error of the validator if it failed during this negotiation.
    ///
    /// For the server's logs; the peer only sees [`Rejection::ValidatorError`].
    pub fn validator_error(&self) -> Option<&ValidatorError> {
        self.validator_error.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            State::Initial => None,
            State::Completed(outcome) => Some(outcome),
        }
    }

    fn negotiate(&mut self, token: &[u8]) -> Outcome {
        let creds = match Credentials::parse(token) {
            Some(creds) => creds,
            None => {
                tracing::debug!(len = token.len(), "malformed PLAIN message");
                return Outcome::Rejected(Rejection::MalformedToken);
            }
        };
        tracing::debug!(authcid = creds.authcid, authzid = creds.authzid, "PLAIN validation requested");

        match self
            .validator
            .validate(creds.authzid, creds.authcid, creds.password)
        {
            Ok(true) => {
                let identity = creds.negotiated_identity();
                tracing::info!(authcid = creds.authcid, identity, "PLAIN authentication successful");
                Outcome::Authenticated(identity.to_string())
            }
            Ok(false) => {
                tracing::warn!(authcid = creds.authcid, "AUTH FAILED: invalid credentials");
                Outcome::Rejected(Rejection::InvalidCredentials)
            }
            Err(error) => {
                tracing::error!(authcid = creds.authcid, %error, "AUTH FAILED: validator error");
                self.validator_error = Some(error);
                Outcome::Rejected(Rejection::ValidatorError)
            }
        }
    }
}

impl ServerMechanism for PlainServer {
    fn mechanism(&self) -> &Mechname {
        &NAME
    }

    fn evaluate(&mut self, token: &[u8]) -> Result<Outcome, ProtocolViolation> {
        if let State::Completed(_) = self.state {
            return Err(ProtocolViolation::AlreadyCompleted { mechanism: PLAIN });
        }
        let span = tracing::debug_span!("plain", mechanism = %PLAIN);
        let _guard = span.enter();

        let outcome = self.negotiate(token);
        self.state = State::Completed(outcome.clone());
        Ok(outcome)
    }

    fn is_complete(&self) -> bool {
        matches!(self.state, State::Completed(_))
    }

    fn authorization_id(&self) -> Option<&str> {
        self.outcome().and_then(Outcome::identity)
    }
}

impl Debug for PlainServer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainServer")
            .field("complete", &self.is_complete())
            .field("outcome", &self.outcome())
            .finish_non_exhaustive()
    }
}
