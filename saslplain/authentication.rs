use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use base64::prelude::*;

use crate::config::Config;
use crate::error::{ConfigurationError, Result};
use crate::mechanism::{Outcome, Rejection, ServerMechanism};
use crate::mechname::Mechname;
use crate::registry::{self, MechanismRegistry, Policy};
use crate::users::UserDB;
use crate::validate::Validator;

/// Starts negotiations against one registry, validator and policy.
///
/// Cheap to clone; a host typically keeps one and calls [`AuthenticationHandle::start`] for
/// every connection that wants to authenticate.
#[derive(Clone)]
pub struct AuthenticationHandle {
    registry: &'static MechanismRegistry,
    validator: Validator,
    policy: Policy,
}

impl AuthenticationHandle {
    pub fn new(registry: &'static MechanismRegistry, validator: Validator, policy: Policy) -> Self {
        let span = tracing::debug_span!("authentication");
        let _guard = span.enter();

        let this = Self {
            registry,
            validator,
            policy,
        };
        let mechs = this.list_available_mechs();
        tracing::info!(available_mechs = mechs.len(), "initialized sasl backend");
        tracing::debug!(?mechs, "available mechs");

        this
    }

    /// Load the configured user database and bind it to the process-wide registry.
    pub fn from_config(config: &Config) -> Result<Self> {
        let users = UserDB::load_file(&config.userdb)?;
        Ok(Self::new(registry::global()?, Arc::new(users), config.policy))
    }

    /// Start a negotiation with a fresh state machine.
    ///
    /// `Ok(None)` if the mechanism is unknown or the policy forbids offering it.
    pub fn start(
        &self,
        mechanism: &str,
    ) -> std::result::Result<Option<Box<dyn ServerMechanism>>, ConfigurationError> {
        if !self.list_available_mechs().contains(mechanism) {
            tracing::debug!(mechanism, "refusing to start unavailable mechanism");
            return Ok(None);
        }
        self.registry.create(mechanism, Some(self.validator.clone()))
    }

    pub fn list_available_mechs(&self) -> BTreeSet<Mechname> {
        self.registry.supported_names_with(&self.policy)
    }

    /// Run one negotiation for a base64 encoded token and render the reply line.
    ///
    /// `OK <identity>` on success and `NO <reason>` otherwise. A mechanism that can not be
    /// started answers `NO unsupported`, a token that is not valid base64 `NO malformed`.
    pub fn authenticate_line(&self, mechanism: &str, encoded: &str) -> Result<String> {
        let mut session = match self.start(mechanism)? {
            Some(session) => session,
            None => return Ok("NO unsupported".to_string()),
        };
        let token = match BASE64_STANDARD.decode(encoded) {
            Ok(token) => token,
            Err(error) => {
                tracing::debug!(%error, "token is not valid base64");
                return Ok(format!("NO {}", Rejection::MalformedToken));
            }
        };

        Ok(match session.evaluate(&token)? {
            Outcome::Authenticated(identity) => format!("OK {}", identity),
            Outcome::Rejected(reason) => format!("NO {}", reason),
        })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

impl fmt::Debug for AuthenticationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationHandle")
            .field("registry", self.registry)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plain::{PlainFactory, PLAIN};
    use crate::registry::{MechanismFactory, SecurityProperties};
    use crate::validate::ValidatorError;
    use once_cell::sync::Lazy;

    static REGISTRY: Lazy<MechanismRegistry> =
        Lazy::new(|| MechanismRegistry::with_defaults().unwrap());

    /// PLAIN that only lists itself when anonymous mechanisms are allowed, while its
    /// properties say it is not anonymous.
    struct Reluctant;

    impl MechanismFactory for Reluctant {
        fn mechanism_names(&self, policy: &Policy) -> Vec<Mechname> {
            if policy.no_anonymous {
                Vec::new()
            } else {
                vec![PLAIN]
            }
        }

        fn properties(&self, mechanism: &Mechname) -> SecurityProperties {
            PlainFactory.properties(mechanism)
        }

        fn create(
            &self,
            mechanism: &str,
            validator: Option<Validator>,
        ) -> std::result::Result<Option<Box<dyn ServerMechanism>>, ConfigurationError> {
            PlainFactory.create(mechanism, validator)
        }
    }

    static RELUCTANT: Lazy<MechanismRegistry> = Lazy::new(|| {
        let mut registry = MechanismRegistry::new();
        registry.register(PLAIN, Arc::new(Reluctant)).unwrap();
        registry
    });

    fn validator() -> Validator {
        Arc::new(|_: &str, authcid: &str, password: &[u8]| {
            Ok::<_, ValidatorError>(authcid == "bob" && password == b"secret")
        })
    }

    #[test]
    fn starts_fresh_machines() {
        let handle = AuthenticationHandle::new(&REGISTRY, validator(), Policy::default());
        assert_eq!(handle.list_available_mechs().len(), 1);

        let mut first = handle.start("PLAIN").unwrap().unwrap();
        assert_eq!(
            first.evaluate(b"\0bob\0wrong").unwrap(),
            Outcome::Rejected(Rejection::InvalidCredentials)
        );
        let mut second = handle.start("PLAIN").unwrap().unwrap();
        assert_eq!(
            second.evaluate(b"\0bob\0secret").unwrap(),
            Outcome::Authenticated("bob".to_string())
        );
        assert!(handle.start("SCRAM-SHA-1").unwrap().is_none());
    }

    #[test]
    fn policy_hides_plaintext_mechanisms() {
        let policy = Policy {
            no_plaintext: true,
            ..Default::default()
        };
        let handle = AuthenticationHandle::new(&REGISTRY, validator(), policy);
        assert!(handle.list_available_mechs().is_empty());
        assert!(handle.start("PLAIN").unwrap().is_none());
    }

    #[test]
    fn start_follows_the_advertised_list() {
        let policy = Policy {
            no_anonymous: true,
            ..Default::default()
        };
        assert!(policy.permits(&RELUCTANT.properties("PLAIN").unwrap()));

        let handle = AuthenticationHandle::new(&RELUCTANT, validator(), policy);
        assert!(handle.list_available_mechs().is_empty());
        assert!(handle.start("PLAIN").unwrap().is_none());

        let open = AuthenticationHandle::new(&RELUCTANT, validator(), Policy::default());
        assert!(open.start("PLAIN").unwrap().is_some());
    }

    #[test]
    fn authenticate_line_replies() {
        let handle = AuthenticationHandle::new(&REGISTRY, validator(), Policy::default());
        fn line(token: &[u8]) -> String {
            BASE64_STANDARD.encode(token)
        }

        assert_eq!(handle.authenticate_line("PLAIN", &line(b"\0bob\0secret")).unwrap(), "OK bob");
        assert_eq!(
            handle.authenticate_line("PLAIN", &line(b"alice\0bob\0secret")).unwrap(),
            "OK alice"
        );
        assert_eq!(
            handle.authenticate_line("PLAIN", &line(b"\0bob\0wrong")).unwrap(),
            "NO invalid-credentials"
        );
        assert_eq!(
            handle.authenticate_line("PLAIN", &line(b"bob/secret")).unwrap(),
            "NO malformed"
        );
        assert_eq!(handle.authenticate_line("PLAIN", "!!notbase64").unwrap(), "NO malformed");
        assert_eq!(
            handle.authenticate_line("GSSAPI", &line(b"\0bob\0secret")).unwrap(),
            "NO unsupported"
        );
    }

    #[test]
    fn authenticate_line_honours_policy() {
        let policy = Policy {
            no_plaintext: true,
            ..Default::default()
        };
        let handle = AuthenticationHandle::new(&REGISTRY, validator(), policy);
        let token = BASE64_STANDARD.encode(b"\0bob\0secret");
        assert_eq!(handle.authenticate_line("PLAIN", &token).unwrap(), "NO unsupported");
    }

    #[test]
    fn authenticate_line_reports_validator_errors() {
        let failing: Validator = Arc::new(|_: &str, _: &str, _: &[u8]| {
            Err::<bool, _>(ValidatorError::msg("backend down"))
        });
        let handle = AuthenticationHandle::new(&REGISTRY, failing, Policy::default());
        let token = BASE64_STANDARD.encode(b"\0bob\0secret");
        assert_eq!(handle.authenticate_line("PLAIN", &token).unwrap(), "NO validator-error");
    }
}
