use actix_web::{web, HttpRequest, HttpResponse};

use super::super::dtos::*;
use super::super::error::{map_db_error, Error};
use super::super::session;
use super::super::AppState;
use crate::storage::Storage;

// Same filter precedence story as the motorcycle list:
// search wins over category, category over published.
pub async fn list(
  app_state: web::Data<AppState>,
  query: web::Query<ArticlesQuery>
) -> Result<HttpResponse, Error> {
  let query = query.into_inner();
  let articles = if let Some(search) =
    query.search.as_deref().filter(|s| !s.is_empty())
  {
    app_state.storage.search_articles(search)
  } else if let Some(category) =
    query.category.as_deref().filter(|s| !s.is_empty())
  {
    app_state.storage.articles_by_category(category)
  } else if query.published.as_deref() == Some("true") {
    app_state.storage.published_articles()
  } else {
    app_state.storage.articles()
  }
  .map_err(map_db_error)?;
  let dtos: Vec<ArticleDto> =
    articles.into_iter().map(ArticleDto::from).collect();
  Ok(HttpResponse::Ok().json(dtos))
}

pub async fn get(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  match app_state.storage.article_by_id(id).map_err(map_db_error)? {
    Some(article) => Ok(HttpResponse::Ok().json(ArticleDto::from(article))),
    None => Err(Error::NotFound(String::from("Article not found"))),
  }
}

pub async fn create(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  payload: web::Json<NewArticleDto>
) -> Result<HttpResponse, Error> {
  session::require_auth(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let new_article = payload.into_inner().validate().map_err(|errors| {
    Error::Validation {
      message: String::from("Invalid article data"),
      errors,
    }
  })?;
  let article = app_state
    .storage
    .create_article(new_article)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(ArticleDto::from(article)))
}

pub async fn update(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<(i64,)>,
  payload: web::Json<ArticleUpdateDto>
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
    .update_article(id, updates)
    .map_err(map_db_error)?
  {
    Some(article) => Ok(HttpResponse::Ok().json(ArticleDto::from(article))),
    None => Err(Error::NotFound(String::from("Article not found"))),
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
  if app_state.storage.delete_article(id).map_err(map_db_error)? {
    Ok(HttpResponse::NoContent().finish())
  } else {
    Err(Error::NotFound(String::from("Article not found")))
  }
}
