use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;
use log::error;
use serde::{Deserialize, Serialize};

// The response side of the error taxonomy. Internal
// detail stays in the logs, clients only ever see the
// generic messages below.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
  pub field: String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &str, message: &str) -> Self {
    Self {
      field: String::from(field),
      message: String::from(message),
    }
  }

  pub fn required(field: &str) -> Self {
    Self::new(field, "Required")
  }
}

#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Internal Server Error")]
  InternalServerError(String),
  #[display(fmt = "Database Error")]
  DatabaseError(String),
  #[display(fmt = "{}", _0)]
  Unauthorized(String),
  #[display(fmt = "{}", _0)]
  Forbidden(String),
  #[display(fmt = "{}", _0)]
  NotFound(String),
  #[display(fmt = "{}", _0)]
  BadRequest(String),
  #[display(fmt = "{}", message)]
  Validation {
    message: String,
    errors: Vec<FieldError>,
  },
}

// JSON error body, shaped like the old API: a message
// plus, for validation failures, the field-level detail.
#[derive(Serialize)]
struct ErrorBody {
  message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  errors: Option<Vec<FieldError>>,
}

impl ResponseError for Error {
  fn error_response(&self) -> HttpResponse {
    let body = ErrorBody {
      message: self.to_string(),
      errors: match self {
        Error::Validation { errors, .. } => Some(errors.clone()),
        _ => None,
      },
    };
    match self {
      Error::InternalServerError(_) | Error::DatabaseError(_) => {
        HttpResponse::InternalServerError().json(body)
      }
      Error::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
      Error::Forbidden(_) => HttpResponse::Forbidden().json(body),
      Error::NotFound(_) => HttpResponse::NotFound().json(body),
      Error::BadRequest(_) | Error::Validation { .. } => {
        HttpResponse::BadRequest().json(body)
      }
    }
  }
}

// The storage layer reports eyre errors, the full chain
// goes to the log and a generic 500 goes out.
pub fn map_db_error(e: color_eyre::Report) -> Error {
  error!("Storage backend error - {}", e);
  Error::DatabaseError(e.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::StatusCode;

  #[test]
  fn statuses_match_the_taxonomy() {
    let cases = vec![
      (Error::InternalServerError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
      (Error::DatabaseError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
      (Error::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
      (Error::Forbidden("x".into()), StatusCode::FORBIDDEN),
      (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
      (Error::BadRequest("x".into()), StatusCode::BAD_REQUEST),
    ];
    for (error, status) in cases {
      assert_eq!(status, error.error_response().status());
    }
  }

  #[test]
  fn internal_detail_is_not_leaked() {
    let error = Error::DatabaseError("connection refused at 10.0.0.5".into());
    assert_eq!("Database Error", error.to_string());
  }

  #[test]
  fn validation_errors_are_a_400_with_detail() {
    let error = Error::Validation {
      message: "Invalid motorcycle data".into(),
      errors: vec![FieldError::required("name")],
    };
    let response = error.error_response();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
  }
}
