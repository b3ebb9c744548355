use std::io;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::mechname::{MechanismNameError, Mechname};
use crate::users::UserDBError;

/// Startup misconfiguration.
///
/// Raised while registering mechanisms or constructing a mechanism, never during a
/// negotiation.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigurationError {
    #[error("mechanism {mechanism} can not be created without a credential validator")]
    #[diagnostic(
        code(sasl::config::missing_validator),
        help("pass a CredentialValidator when starting the mechanism")
    )]
    MissingValidator { mechanism: Mechname },

    #[error("factory registered as {name} does not produce that mechanism")]
    #[diagnostic(code(sasl::config::undeclared_mechanism))]
    UndeclaredMechanism { name: Mechname },

    #[error("a factory for {name} is already registered")]
    #[diagnostic(
        code(sasl::config::duplicate_mechanism),
        help("every mechanism name can only be registered once")
    )]
    DuplicateMechanism { name: Mechname },

    #[error("the process-wide mechanism registry is already installed")]
    #[diagnostic(code(sasl::config::already_installed))]
    AlreadyInstalled,

    #[error(transparent)]
    #[diagnostic(code(sasl::config::invalid_name))]
    InvalidName(#[from] MechanismNameError),
}

/// Misuse of a mechanism state machine by its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ProtocolViolation {
    #[error("mechanism {mechanism} already completed")]
    #[diagnostic(
        code(sasl::protocol::already_completed),
        help("state machines are single-use, start a new negotiation instead")
    )]
    AlreadyCompleted { mechanism: Mechname },
}

#[derive(Debug, Error, Diagnostic)]
/// Shared error type
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(saslplaind::configuration))]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    #[diagnostic(code(saslplaind::protocol))]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    #[diagnostic(code(saslplaind::config))]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(saslplaind::userdb))]
    UserDB(#[from] UserDBError),

    #[error("IO Error: {0}")]
    #[diagnostic(code(saslplaind::io))]
    IO(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
