//! Password hashing helpers.
//!
//! Plaintext passwords never reach storage; users carry argon2 PHC strings
//! (`$argon2id$v=19$…`) produced here.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Hash a plaintext password into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| Error::Invalid(format!("password hashing failed: {e}")))?;
  Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC string. A malformed hash
/// verifies as false rather than erroring; the caller treats it as a bad
/// credential either way.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(password_hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trip() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("wrong horse", &hash));
  }

  #[test]
  fn malformed_hash_fails_closed() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }
}
