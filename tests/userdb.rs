use std::sync::Arc;

use saslplain::users::{pass, UserDB, UserDBError};
use saslplain::{registry, AuthenticationHandle, Config, Error, Outcome, Policy, Rejection};

fn users_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let alice = pass::hash_password(b"wonderland").unwrap();
    let bob = pass::hash_password(b"secret").unwrap();
    let content = format!(
        r#"
[alice]
passwd = "{}"

[bob]
passwd = "{}"
act_as = ["alice"]

[locked]
"#,
        alice, bob
    );
    let path = dir.path().join("users.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn negotiate(handle: &AuthenticationHandle, token: &[u8]) -> Outcome {
    let mut mechanism = handle.start("PLAIN").unwrap().unwrap();
    mechanism.evaluate(token).unwrap()
}

#[test]
fn authenticates_against_users_file() {
    let dir = tempfile::tempdir().unwrap();
    let users = UserDB::load_file(users_file(&dir)).unwrap();
    assert_eq!(users.len(), 3);

    let registry = registry::global().unwrap();
    let handle = AuthenticationHandle::new(registry, Arc::new(users), Policy::default());

    assert_eq!(
        negotiate(&handle, b"\0alice\0wonderland"),
        Outcome::Authenticated("alice".to_string())
    );
    assert_eq!(
        negotiate(&handle, b"alice\0bob\0secret"),
        Outcome::Authenticated("alice".to_string())
    );
    assert_eq!(
        negotiate(&handle, b"bob\0alice\0wonderland"),
        Outcome::Rejected(Rejection::InvalidCredentials)
    );
    assert_eq!(
        negotiate(&handle, b"\0locked\0"),
        Outcome::Rejected(Rejection::InvalidCredentials)
    );
    assert_eq!(
        negotiate(&handle, b"\0nobody\0secret"),
        Outcome::Rejected(Rejection::InvalidCredentials)
    );
    assert_eq!(
        negotiate(&handle, b"alice/bob/secret"),
        Outcome::Rejected(Rejection::MalformedToken)
    );
}

#[test]
fn missing_users_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        UserDB::load_file(dir.path().join("missing.toml")),
        Err(UserDBError::Io(_))
    ));
}

#[test]
fn handle_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        userdb: users_file(&dir),
        policy: Policy::default(),
        ..Default::default()
    };
    let handle = AuthenticationHandle::from_config(&config).unwrap();
    assert_eq!(
        negotiate(&handle, b"\0bob\0secret"),
        Outcome::Authenticated("bob".to_string())
    );

    let broken = Config {
        userdb: dir.path().join("missing.toml"),
        ..Default::default()
    };
    assert!(matches!(
        AuthenticationHandle::from_config(&broken),
        Err(Error::UserDB(UserDBError::Io(_)))
    ));
}
