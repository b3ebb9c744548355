use rand::RngCore;

/// Hash `password` into an argon2 encoded string with a fresh random salt.
pub fn hash_password(password: &[u8]) -> argon2::Result<String> {
    let config = argon2::Config::default();
    let mut salt: [u8; 16] = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    argon2::hash_encoded(password, &salt, &config)
}

/// Verify `input` against an argon2 encoded hash.
///
/// Errors if `encoded` is not a valid argon2 hash string.
pub fn check_password(encoded: &str, input: &[u8]) -> argon2::Result<bool> {
    argon2::verify_encoded(encoded, input)
}
