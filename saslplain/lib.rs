#![deny(unused_imports)]
#![warn(missing_debug_implementations)]

//! saslplain
//!
//! A registry of server-side SASL mechanisms, looked up by name, together with a server
//! implementation of the PLAIN mechanism.
//!
//! Hosts populate a [`MechanismRegistry`] during startup (or use
//! [`registry::global`], which comes with PLAIN installed), then start one
//! [`ServerMechanism`] per connection and feed it the client's response token:
//!
//! ```
//! use std::sync::Arc;
//! use saslplain::{registry, Outcome, Validator, ValidatorError};
//!
//! let validator: Validator = Arc::new(|_: &str, authcid: &str, password: &[u8]| {
//!     Ok::<_, ValidatorError>(authcid == "bob" && password == b"secret")
//! });
//! let mut mechanism = registry::global()?
//!     .create("PLAIN", Some(validator))?
//!     .expect("PLAIN is built in");
//! let outcome = mechanism.evaluate(b"\0bob\0secret")?;
//! assert_eq!(outcome, Outcome::Authenticated("bob".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The daemon in [bin/saslplaind/main.rs](../bin/saslplaind/main.rs) wires this up with a
//! file-backed user database.

pub mod env;

/// Shared error type
pub mod error;

pub mod mechname;
pub mod validate;
pub mod mechanism;

/// Name to factory lookup
pub mod registry;
pub mod provider;

/// PLAIN, RFC 4616
pub mod plain;

pub mod users;

pub mod authentication;

pub mod config;
pub mod logging;

pub use authentication::AuthenticationHandle;
pub use config::Config;
pub use error::{ConfigurationError, Error, ProtocolViolation, Result};
pub use mechanism::{Outcome, Rejection, ServerMechanism};
pub use mechname::Mechname;
pub use registry::{MechanismFactory, MechanismRegistry, Policy};
pub use validate::{CredentialValidator, Validator, ValidatorError};

pub const VERSION_STRING: &str = env::VERSION;
