use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

/// An internal failure of a [`CredentialValidator`], e.g. an unreachable backing store.
///
/// The details are meant for the server's logs only. Mechanisms report a failed validation
/// to the remote peer as a generic rejection.
#[derive(Debug, Error, Diagnostic)]
#[error("credential validation failed: {source}")]
#[diagnostic(code(sasl::validator))]
pub struct ValidatorError {
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl ValidatorError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(message.to_string())
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.source
    }
}

/// Host-supplied check of a PLAIN credential triple.
///
/// Returns `Ok(true)` if `password` is correct for `authcid` *and* `authcid` may act as
/// `authzid`. An empty `authzid` means "the same as `authcid`". Implementations may block,
/// e.g. on a lookup in an external credential store.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, authzid: &str, authcid: &str, password: &[u8])
        -> Result<bool, ValidatorError>;
}

impl<F> CredentialValidator for F
where
    F: Fn(&str, &str, &[u8]) -> Result<bool, ValidatorError> + Send + Sync,
{
    fn validate(&self, authzid: &str, authcid: &str, password: &[u8])
        -> Result<bool, ValidatorError>
    {
        self(authzid, authcid, password)
    }
}

/// Shared validator handle as passed to mechanism factories.
pub type Validator = Arc<dyn CredentialValidator>;
