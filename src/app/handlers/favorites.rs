use actix_web::{web, HttpRequest, HttpResponse};

use super::super::dtos::*;
use super::super::error::{map_db_error, Error};
use super::super::session;
use super::super::AppState;
use crate::storage::Storage;

// Everything here takes a session, and a user only ever
// sees their own favorites.

pub async fn add(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>
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
  let favorite = app_state
    .storage
    .add_favorite(user.id, motorcycle_id)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(FavoriteCreatedDto::from(favorite)))
}

pub async fn remove(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let user = session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let motorcycle_id = path.into_inner().0;
  if app_state
    .storage
    .remove_favorite(user.id, motorcycle_id)
    .map_err(map_db_error)?
  {
    Ok(HttpResponse::NoContent().finish())
  } else {
    Err(Error::NotFound(String::from("Favorite not found")))
  }
}

pub async fn status(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let user = session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let motorcycle_id = path.into_inner().0;
  let is_favorite = app_state
    .storage
    .is_favorite(user.id, motorcycle_id)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(IsFavoriteDto { is_favorite }))
}

pub async fn list_for_user(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let user = session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let user_id = path.into_inner().0;
  if user.id != user_id {
    return Err(Error::Forbidden(String::from("Access denied")));
  }
  let favorites = app_state
    .storage
    .favorites_for_user(user_id)
    .map_err(map_db_error)?;
  let dtos: Vec<FavoriteDto> =
    favorites.into_iter().map(FavoriteDto::from).collect();
  Ok(HttpResponse::Ok().json(dtos))
}
