pub mod auth_handlers;
pub mod cart_handlers;
pub mod order_handlers;
pub mod product_handlers;

use crate::errors::AppError;
use validator::Validate;

/// Runs declarative payload validation at the HTTP boundary, flattening
/// field errors into one client-facing message.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
  payload.validate().map_err(|errs| {
    let details: Vec<String> = errs
      .field_errors()
      .into_iter()
      .map(|(field, field_errs)| {
        let messages: Vec<String> = field_errs
          .iter()
          .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
          .collect();
        format!("{}: {}", field, messages.join(", "))
      })
      .collect();
    AppError::Validation(details.join("; "))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Validate)]
  struct Probe {
    #[validate(length(min = 1, message = "must not be empty"))]
    name: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    quantity: i32,
  }

  #[test]
  fn valid_payload_passes() {
    let probe = Probe {
      name: "x".into(),
      quantity: 1,
    };
    assert!(validate_payload(&probe).is_ok());
  }

  #[test]
  fn invalid_payload_reports_field_and_message() {
    let probe = Probe {
      name: "".into(),
      quantity: 0,
    };
    match validate_payload(&probe) {
      Err(AppError::Validation(msg)) => {
        assert!(msg.contains("name"));
        assert!(msg.contains("quantity"));
      }
      other => panic!("expected validation error, got {:?}", other),
    }
  }
}
