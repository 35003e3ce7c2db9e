use actix_web::{web, HttpResponse};

use super::super::dtos::StatsDto;
use super::super::error::{map_db_error, Error};
use super::super::AppState;
use crate::storage::Storage;

// Dashboard counters. The traffic figures are the mock
// strings the dashboard has always shown, there is no
// analytics backend behind them.
pub async fn stats(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let motorcycles = app_state.storage.motorcycles().map_err(map_db_error)?;
  let articles = app_state
    .storage
    .published_articles()
    .map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(StatsDto {
    motorcycles: motorcycles.len(),
    articles: articles.len(),
    visitors: String::from("8.2k"),
    pageviews: String::from("34.7k"),
  }))
}
