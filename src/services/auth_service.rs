//! Password hashing and verification.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", e))
    })
}

/// Verifies a plain-text password against a stored Argon2 hash string.
/// Returns `Ok(false)` on a mismatch; errors are reserved for malformed
/// hashes or internal failures.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|e| {
    error!(error = %e, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", e))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(e) => {
      error!(error = %e, "Argon2 password verification encountered an error.");
      Err(AppError::Internal(format!("Password verification process failed: {}", e)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify_round_trip() {
    let hash = hash_password("user123").expect("hashing should succeed");
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "user123").unwrap());
    assert!(!verify_password(&hash, "user124").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn malformed_stored_hash_is_an_internal_error() {
    assert!(matches!(
      verify_password("not-a-phc-string", "whatever"),
      Err(AppError::Internal(_))
    ));
  }
}
