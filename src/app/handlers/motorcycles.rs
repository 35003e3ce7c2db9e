use actix_web::{web, HttpRequest, HttpResponse};

use super::super::dtos::*;
use super::super::error::{map_db_error, Error};
use super::super::session;
use super::super::AppState;
use crate::storage::Storage;

// Query params take precedence in this order: search,
// then brand, then type. The SPA sends empty strings for
// unused filters, those count as absent.
pub async fn list(
  app_state: web::Data<AppState>,
  query: web::Query<MotorcyclesQuery>
) -> Result<HttpResponse, Error> {
  let query = query.into_inner();
  let motorcycles = if let Some(search) =
    query.search.as_deref().filter(|s| !s.is_empty())
  {
    app_state.storage.search_motorcycles(search)
  } else if let Some(brand) =
    query.brand.as_deref().filter(|s| !s.is_empty())
  {
    app_state.storage.motorcycles_by_brand(brand)
  } else if let Some(moto_type) =
    query.moto_type.as_deref().filter(|s| !s.is_empty())
  {
    app_state.storage.motorcycles_by_type(moto_type)
  } else {
    app_state.storage.motorcycles()
  }
  .map_err(map_db_error)?;
  let dtos: Vec<MotorcycleDto> =
    motorcycles.into_iter().map(MotorcycleDto::from).collect();
  Ok(HttpResponse::Ok().json(dtos))
}

pub async fn get(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  match app_state.storage.motorcycle_by_id(id).map_err(map_db_error)? {
    Some(motorcycle) => {
      Ok(HttpResponse::Ok().json(MotorcycleDto::from(motorcycle)))
    }
    None => Err(Error::NotFound(String::from("Motorcycle not found"))),
  }
}

pub async fn create(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  payload: web::Json<NewMotorcycleDto>
) -> Result<HttpResponse, Error> {
  session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let new_motorcycle = payload.into_inner().validate().map_err(|errors| {
    Error::Validation {
      message: String::from("Invalid motorcycle data"),
      errors,
    }
  })?;
  let motorcycle = app_state
    .storage
    .create_motorcycle(new_motorcycle)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(MotorcycleDto::from(motorcycle)))
}

pub async fn update(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>,
  payload: web::Json<MotorcycleUpdateDto>
) -> Result<HttpResponse, Error> {
  session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let id = path.into_inner().0;
  let updates = payload.into_inner().into();
  match app_state
    .storage
    .update_motorcycle(id, updates)
    .map_err(map_db_error)?
  {
    Some(motorcycle) => {
      Ok(HttpResponse::Ok().json(MotorcycleDto::from(motorcycle)))
    }
    None => Err(Error::NotFound(String::from("Motorcycle not found"))),
  }
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
  if app_state.storage.delete_motorcycle(id).map_err(map_db_error)? {
    Ok(HttpResponse::NoContent().finish())
  } else {
    Err(Error::NotFound(String::from("Motorcycle not found")))
  }
}
