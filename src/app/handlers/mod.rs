use actix_web::HttpResponse;

use super::error::Error;

pub mod admin;
pub mod articles;
pub mod auth;
pub mod favorites;
pub mod motorcycles;
pub mod reviews;

// Handlers grouped by resource, one file each. They all
// return Result<HttpResponse, Error>, see the error
// module for the Error to response conversions.

pub async fn index() -> HttpResponse {
  HttpResponse::Ok().body("Nothing here")
}

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint doesn't exist")))
}
