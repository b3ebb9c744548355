use std::fmt;

use crate::error::ProtocolViolation;
use crate::mechname::Mechname;

/// Why a negotiation was rejected.
///
/// This is all a remote peer may learn about a failed attempt. It deliberately carries no
/// detail beyond the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The token did not follow the mechanism's wire format.
    MalformedToken,
    /// The credential validator did not accept the credentials.
    InvalidCredentials,
    /// The credential validator failed internally.
    ValidatorError,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::MalformedToken => "malformed",
            Rejection::InvalidCredentials => "invalid-credentials",
            Rejection::ValidatorError => "validator-error",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a negotiation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The peer authenticated and acts as the contained identity.
    Authenticated(String),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Outcome::Authenticated(_))
    }

    /// The negotiated identity, if any.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Outcome::Authenticated(identity) => Some(identity.as_str()),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Authenticated(_) => None,
            Outcome::Rejected(reason) => Some(*reason),
        }
    }
}

/// Server side of a single authentication exchange.
///
/// Instances are single-use: each connection attempting to authenticate gets a fresh one from
/// [`MechanismFactory::create`](crate::registry::MechanismFactory::create). `evaluate` may
/// block while the credential validator runs; async hosts should move the call off their
/// I/O threads.
pub trait ServerMechanism: Send + fmt::Debug {
    /// Name of the mechanism this instance negotiates.
    fn mechanism(&self) -> &Mechname;

    /// Process one response token from the peer.
    ///
    /// Rejections are returned as `Ok(Outcome::Rejected(_))`. Only calling this again after a
    /// terminal outcome is an error.
    fn evaluate(&mut self, token: &[u8]) -> Result<Outcome, ProtocolViolation>;

    fn is_complete(&self) -> bool;

    /// The negotiated authorization identity once authentication succeeded.
    fn authorization_id(&self) -> Option<&str>;
}
