//! The PLAIN mechanism ([RFC 4616](https://tools.ietf.org/html/rfc4616)), server side.

mod server;
pub use server::{Credentials, PlainServer};

use crate::error::ConfigurationError;
use crate::mechanism::ServerMechanism;
use crate::mechname::Mechname;
use crate::registry::{MechanismFactory, Policy, SecurityProperties};
use crate::validate::Validator;

pub const PLAIN: Mechname = Mechname::const_new_unchecked("PLAIN");

const PROPERTIES: SecurityProperties = SecurityProperties {
    plaintext: true,
    anonymous: false,
    dictionary: true,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFactory;

impl PlainFactory {
    /// A fresh PLAIN state machine bound to `validator`.
    ///
    /// PLAIN can't do anything without a way to check passwords, so a missing validator is a
    /// configuration error.
    pub fn create_plain(validator: Option<Validator>) -> Result<PlainServer, ConfigurationError> {
        validator
            .map(PlainServer::new)
            .ok_or(ConfigurationError::MissingValidator { mechanism: PLAIN })
    }
}

impl MechanismFactory for PlainFactory {
    fn mechanism_names(&self, policy: &Policy) -> Vec<Mechname> {
        if policy.permits(&PROPERTIES) {
            vec![PLAIN]
        } else {
            Vec::new()
        }
    }

    fn properties(&self, _mechanism: &Mechname) -> SecurityProperties {
        PROPERTIES
    }

    fn create(
        &self,
        mechanism: &str,
        validator: Option<Validator>,
    ) -> Result<Option<Box<dyn ServerMechanism>>, ConfigurationError> {
        if PLAIN != mechanism {
            return Ok(None);
        }
        let server = Self::create_plain(validator)?;
        Ok(Some(Box::new(server)))
    }
}
