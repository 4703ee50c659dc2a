//! Bearer-token issuance and validation.

use crate::errors::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// Subject: the user id.
  pub sub: Uuid,
  /// Expiration, seconds since the epoch.
  pub exp: i64,
}

pub fn issue_token(user_id: Uuid, secret: &str, expiry_hours: i64) -> Result<String, AppError> {
  let claims = Claims {
    sub: user_id,
    exp: (Utc::now() + Duration::hours(expiry_hours)).timestamp(),
  };
  encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .map_err(|e| AppError::Internal(format!("Token issuance failed: {}", e)))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::default(),
  )
  .map(|data| data.claims)
  .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "test-secret";

  #[test]
  fn issue_then_decode_round_trip() {
    let user_id = Uuid::new_v4();
    let token = issue_token(user_id, SECRET, 24).unwrap();
    let claims = decode_token(&token, SECRET).unwrap();
    assert_eq!(claims.sub, user_id);
    assert!(claims.exp > Utc::now().timestamp());
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let token = issue_token(Uuid::new_v4(), SECRET, 24).unwrap();
    assert!(matches!(decode_token(&token, "other-secret"), Err(AppError::Auth(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let token = issue_token(Uuid::new_v4(), SECRET, -1).unwrap();
    assert!(matches!(decode_token(&token, SECRET), Err(AppError::Auth(_))));
  }

  #[test]
  fn garbage_token_is_rejected() {
    assert!(matches!(decode_token("not.a.jwt", SECRET), Err(AppError::Auth(_))));
  }
}
