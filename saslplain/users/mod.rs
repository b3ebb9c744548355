//! File-backed user database used as the daemon's credential validator.
//!
//! The users file is TOML with one table per user id:
//!
//! ```toml
//! [alice]
//! passwd = "$argon2i$v=19$m=4096,t=3,p=1$..."
//!
//! [bob]
//! passwd = "$argon2i$v=19$m=4096,t=3,p=1$..."
//! act_as = ["alice"]
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::{CredentialValidator, ValidatorError};

pub mod pass;

#[derive(Debug, Error, Diagnostic)]
pub enum UserDBError {
    #[error("failed to read users file: {0}")]
    #[diagnostic(
        code(users::io),
        help("Make sure the users file is readable by the user running saslplaind")
    )]
    Io(#[from] io::Error),

    #[error("failed to parse users file: {0}")]
    #[diagnostic(code(users::parse))]
    Parse(#[from] toml::de::Error),

    #[error("failed to hash password: {0}")]
    #[diagnostic(code(users::hash))]
    Hash(#[from] argon2::Error),
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
/// Data on a user to base authentication decisions on
pub struct UserData {
    /// argon2 encoded password hash. Users without one can not log in with a password.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub passwd: Option<String>,

    /// Identities this user may request as authorization identity besides its own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub act_as: Vec<String>,
}

impl UserData {
    pub fn may_act_as(&self, uid: &str, authzid: &str) -> bool {
        authzid.is_empty() || authzid == uid || self.act_as.iter().any(|id| id == authzid)
    }
}

#[derive(Clone, Debug)]
pub struct UserDB {
    users: HashMap<String, UserData>,
    span: tracing::Span,
}

impl UserDB {
    pub fn new() -> Self {
        Self::from_users(HashMap::new())
    }

    fn from_users(users: HashMap<String, UserData>) -> Self {
        let span = tracing::info_span!("userdb");
        Self { users, span }
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, UserDBError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let db = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), users = db.len(), "loaded users");
        Ok(db)
    }

    pub fn from_toml(content: &str) -> Result<Self, UserDBError> {
        let users: HashMap<String, UserData> = toml::from_str(content)?;
        Ok(Self::from_users(users))
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&self.users)
    }

    pub fn get_user(&self, uid: &str) -> Option<&UserData> {
        self.users.get(uid)
    }

    pub fn put(&mut self, uid: impl Into<String>, user: UserData) -> Option<UserData> {
        self.users.insert(uid.into(), user)
    }

    /// Set or update the password of `uid`, creating the user if it doesn't exist.
    pub fn set_password(&mut self, uid: &str, password: &[u8]) -> Result<(), UserDBError> {
        debug_assert!(!uid.is_empty());
        let encoded = pass::hash_password(password)?;
        self.users.entry(uid.to_string()).or_default().passwd = Some(encoded);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserDB {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialValidator for UserDB {
    fn validate(&self, authzid: &str, authcid: &str, password: &[u8])
        -> Result<bool, ValidatorError>
    {
        let span = tracing::info_span!(parent: &self.span, "validate");
        let _guard = span.enter();

        let user = match self.get_user(authcid) {
            Some(user) => user,
            None => {
                tracing::warn!(authid = authcid, "AUTH FAILED: no such user '{}'", authcid);
                return Ok(false);
            }
        };
        let encoded = match user.passwd {
            Some(ref encoded) => encoded,
            None => {
                tracing::warn!(authid = authcid, "AUTH FAILED: user has no password set");
                return Ok(false);
            }
        };

        let matches = pass::check_password(encoded, password).map_err(|e| {
            ValidatorError::msg(format!("stored password of '{}' is invalid: {}", authcid, e))
        })?;
        if !matches {
            tracing::warn!(authid = authcid, "AUTH FAILED: bad password");
            return Ok(false);
        }
        if !user.may_act_as(authcid, authzid) {
            tracing::warn!(authid = authcid, authzid, "AUTH FAILED: not allowed to act as requested identity");
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> UserDB {
        let mut db = UserDB::new();
        db.set_password("alice", b"wonderland").unwrap();
        db.set_password("bob", b"secret").unwrap();
        db.users.get_mut("bob").unwrap().act_as = vec!["alice".to_string()];
        db.put("carol", UserData::default());
        db.put(
            "mallory",
            UserData {
                passwd: Some("plaintext-oops".to_string()),
                act_as: Vec::new(),
            },
        );
        db
    }

    #[test]
    fn validates_passwords() {
        let db = db();
        assert!(db.validate("", "alice", b"wonderland").unwrap());
        assert!(db.validate("alice", "alice", b"wonderland").unwrap());
        assert!(!db.validate("", "alice", b"looking glass").unwrap());
        assert!(!db.validate("", "nobody", b"wonderland").unwrap());
        assert!(!db.validate("", "carol", b"").unwrap());
    }

    #[test]
    fn act_as_controls_authorization_identity() {
        let db = db();
        assert!(db.validate("alice", "bob", b"secret").unwrap());
        assert!(!db.validate("carol", "bob", b"secret").unwrap());
        assert!(!db.validate("bob", "alice", b"wonderland").unwrap());
    }

    #[test]
    fn broken_hash_is_a_validator_error() {
        let db = db();
        let err = db.validate("", "mallory", b"plaintext-oops").unwrap_err();
        assert!(err.to_string().contains("mallory"));
    }

    #[test]
    fn toml_roundtrip_keeps_users() {
        let db = db();
        let encoded = db.to_toml().unwrap();
        let loaded = UserDB::from_toml(&encoded).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.get_user("bob"), db.get_user("bob"));
        assert!(loaded.validate("alice", "bob", b"secret").unwrap());
    }

    #[test]
    fn parse_errors_are_reported() {
        assert!(matches!(
            UserDB::from_toml("[alice\npasswd = 1"),
            Err(UserDBError::Parse(_))
        ));
    }
}
