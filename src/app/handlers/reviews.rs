use actix_web::{web, HttpRequest, HttpResponse};

use super::super::dtos::*;
use super::super::error::{map_db_error, Error};
use super::super::session;
use super::super::AppState;
use crate::storage::Storage;

// Reading reviews is open, writing takes a session. The
// review's userId always comes from the session, clients
// can't review on someone else's behalf.

pub async fn list_for_motorcycle(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let motorcycle_id = path.into_inner().0;
  let reviews = app_state
    .storage
    .reviews_for_motorcycle(motorcycle_id)
    .map_err(map_db_error)?;
  let dtos: Vec<ReviewDto> = reviews.into_iter().map(ReviewDto::from).collect();
  Ok(HttpResponse::Ok().json(dtos))
}

pub async fn list_for_user(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let user_id = path.into_inner().0;
  let reviews = app_state
    .storage
    .reviews_for_user(user_id)
    .map_err(map_db_error)?;
  let dtos: Vec<ReviewDto> = reviews.into_iter().map(ReviewDto::from).collect();
  Ok(HttpResponse::Ok().json(dtos))
}

pub async fn create(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>,
  payload: web::Json<NewReviewDto>
) -> Result<HttpResponse, Error> {
  let user = session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let motorcycle_id = path.into_inner().0;
  if app_state
    .storage
    .motorcycle_by_id(motorcycle_id)
    .map_err(map_db_error)?
    .is_none()
  {
    return Err(Error::NotFound(String::from("Motorcycle not found")));
  }
  let new_review = payload
    .into_inner()
    .validate(user.id, motorcycle_id)
    .map_err(|errors| Error::Validation {
      message: String::from("Invalid review data"),
      errors,
    })?;
  let review = app_state
    .storage
    .create_review(new_review)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(ReviewDto::from(review)))
}

pub async fn delete(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let id = path.into_inner().0;
  if app_state.storage.delete_review(id).map_err(map_db_error)? {
    Ok(HttpResponse::NoContent().finish())
  } else {
    Err(Error::NotFound(String::from("Review not found")))
  }
}
