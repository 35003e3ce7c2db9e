use serde::{Deserialize, Serialize};

use super::error::FieldError;
use crate::storage::entities::*;
use crate::utils::time_utils;

// The SPA speaks camelCase JSON with RFC 3339 dates, the
// storage layer speaks snake_case with unix timestamps.
// Everything crossing that line goes through here.
//
// Create payloads are all-Option structs with a
// validate() that collects every missing or out-of-range
// field, so a 400 can list them all at once the way the
// old API did.

/* --- Responses --- */

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleDto {
  pub id: i64,
  pub name: String,
  pub brand: String,
  pub model: String,
  pub year: i64,
  pub engine_size: String,
  pub horsepower: String,
  #[serde(rename = "type")]
  pub moto_type: String,
  pub category: String,
  pub description: String,
  pub image_url: String,
  pub available: bool,
  pub created_at: String,
  pub updated_at: String,
}

impl From<Motorcycle> for MotorcycleDto {
  fn from(m: Motorcycle) -> Self {
    Self {
      id: m.id,
      name: m.name,
      brand: m.brand,
      model: m.model,
      year: m.year,
      engine_size: m.engine_size,
      horsepower: m.horsepower,
      moto_type: m.moto_type,
      category: m.category,
      description: m.description,
      image_url: m.image_url,
      available: m.available,
      created_at: time_utils::timestamp_to_rfc3339(m.created_at),
      updated_at: time_utils::timestamp_to_rfc3339(m.updated_at),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
  pub id: i64,
  pub title: String,
  pub content: String,
  pub excerpt: String,
  pub author: String,
  pub category: String,
  pub image_url: String,
  pub published: bool,
  pub created_at: String,
  pub updated_at: String,
}

impl From<Article> for ArticleDto {
  fn from(a: Article) -> Self {
    Self {
      id: a.id,
      title: a.title,
      content: a.content,
      excerpt: a.excerpt,
      author: a.author,
      category: a.category,
      image_url: a.image_url,
      published: a.published,
      created_at: time_utils::timestamp_to_rfc3339(a.created_at),
      updated_at: time_utils::timestamp_to_rfc3339(a.updated_at),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
  pub id: i64,
  pub email: String,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar: Option<String>,
  pub provider: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub provider_id: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl From<User> for UserDto {
  fn from(u: User) -> Self {
    Self {
      id: u.id,
      email: u.email,
      name: u.name,
      avatar: u.avatar,
      provider: u.provider,
      provider_id: u.provider_id,
      created_at: time_utils::timestamp_to_rfc3339(u.created_at),
      updated_at: time_utils::timestamp_to_rfc3339(u.updated_at),
    }
  }
}

// The slim user identity kept in the session blob and
// echoed by /auth/check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
  pub id: i64,
  pub email: String,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar: Option<String>,
}

impl From<&User> for SessionUser {
  fn from(u: &User) -> Self {
    Self {
      id: u.id,
      email: u.email.clone(),
      name: u.name.clone(),
      avatar: u.avatar.clone(),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
  pub id: i64,
  pub user_id: i64,
  pub motorcycle_id: i64,
  pub rating: i64,
  pub title: String,
  pub content: String,
  pub created_at: String,
  pub updated_at: String,
}

impl From<Review> for ReviewDto {
  fn from(r: Review) -> Self {
    Self {
      id: r.id,
      user_id: r.user_id,
      motorcycle_id: r.motorcycle_id,
      rating: r.rating,
      title: r.title,
      content: r.content,
      created_at: time_utils::timestamp_to_rfc3339(r.created_at),
      updated_at: time_utils::timestamp_to_rfc3339(r.updated_at),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCreatedDto {
  pub id: i64,
  pub user_id: i64,
  pub motorcycle_id: i64,
  pub created_at: String,
}

impl From<Favorite> for FavoriteCreatedDto {
  fn from(f: Favorite) -> Self {
    Self {
      id: f.id,
      user_id: f.user_id,
      motorcycle_id: f.motorcycle_id,
      created_at: time_utils::timestamp_to_rfc3339(f.created_at),
    }
  }
}

// The favorites listing carries the joined motorcycle
// and, like the old API, drops the redundant userId.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDto {
  pub id: i64,
  pub motorcycle_id: i64,
  pub created_at: String,
  pub motorcycle: Option<MotorcycleDto>,
}

impl From<FavoriteWithMotorcycle> for FavoriteDto {
  fn from(f: FavoriteWithMotorcycle) -> Self {
    Self {
      id: f.favorite.id,
      motorcycle_id: f.favorite.motorcycle_id,
      created_at: time_utils::timestamp_to_rfc3339(f.favorite.created_at),
      motorcycle: f.motorcycle.map(MotorcycleDto::from),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonStatus {
  pub success: bool,
  pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthOk<T> {
  pub success: bool,
  pub message: String,
  pub user: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
  pub authenticated: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user: Option<SessionUser>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsFavoriteDto {
  pub is_favorite: bool,
}

// The visitor/pageview figures are static demo strings,
// nothing measures them.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsDto {
  pub motorcycles: usize,
  pub articles: usize,
  pub visitors: String,
  pub pageviews: String,
}

/* --- Request bodies and query strings --- */

#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
  pub email: Option<String>,
  pub name: Option<String>,
  pub avatar: Option<String>,
  // Accepted for client compatibility, never stored:
  // the users table has no password column.
  #[allow(dead_code)]
  pub password: Option<String>,
}

impl RegisterForm {
  pub fn validate(self) -> Result<NewUser, Vec<FieldError>> {
    let mut errors = Vec::new();
    match &self.email {
      Some(email) if email.contains('@') => {}
      Some(_) => errors.push(FieldError::new("email", "Invalid email")),
      None => errors.push(FieldError::required("email")),
    }
    if self.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
      errors.push(FieldError::required("name"));
    }
    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(NewUser {
      email: self.email.unwrap_or_default(),
      name: self.name.unwrap_or_default(),
      avatar: self.avatar,
      provider: String::from("email"),
      provider_id: None,
    })
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthForm {
  pub email: Option<String>,
  pub name: Option<String>,
  pub avatar: Option<String>,
  // The old clients sent googleId/facebookId, newer ones
  // send providerId. All land here.
  #[serde(alias = "googleId", alias = "facebookId")]
  pub provider_id: Option<String>,
}

impl OAuthForm {
  pub fn validate(self, provider: &str) -> Result<NewUser, Vec<FieldError>> {
    let mut errors = Vec::new();
    match &self.email {
      Some(email) if email.contains('@') => {}
      Some(_) => errors.push(FieldError::new("email", "Invalid email")),
      None => errors.push(FieldError::required("email")),
    }
    if self.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
      errors.push(FieldError::required("name"));
    }
    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(NewUser {
      email: self.email.unwrap_or_default(),
      name: self.name.unwrap_or_default(),
      avatar: self.avatar,
      provider: String::from(provider),
      provider_id: self.provider_id,
    })
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMotorcycleDto {
  pub name: Option<String>,
  pub brand: Option<String>,
  pub model: Option<String>,
  pub year: Option<i64>,
  pub engine_size: Option<String>,
  pub horsepower: Option<String>,
  #[serde(rename = "type")]
  pub moto_type: Option<String>,
  pub category: Option<String>,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub available: Option<bool>,
}

impl NewMotorcycleDto {
  pub fn validate(self) -> Result<NewMotorcycle, Vec<FieldError>> {
    let mut errors = Vec::new();
    let required = [
      ("name", self.name.is_none()),
      ("brand", self.brand.is_none()),
      ("model", self.model.is_none()),
      ("year", self.year.is_none()),
      ("engineSize", self.engine_size.is_none()),
      ("horsepower", self.horsepower.is_none()),
      ("type", self.moto_type.is_none()),
      ("category", self.category.is_none()),
      ("description", self.description.is_none()),
      ("imageUrl", self.image_url.is_none()),
    ];
    for (field, missing) in &required {
      if *missing {
        errors.push(FieldError::required(field));
      }
    }
    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(NewMotorcycle {
      name: self.name.unwrap_or_default(),
      brand: self.brand.unwrap_or_default(),
      model: self.model.unwrap_or_default(),
      year: self.year.unwrap_or_default(),
      engine_size: self.engine_size.unwrap_or_default(),
      horsepower: self.horsepower.unwrap_or_default(),
      moto_type: self.moto_type.unwrap_or_default(),
      category: self.category.unwrap_or_default(),
      description: self.description.unwrap_or_default(),
      image_url: self.image_url.unwrap_or_default(),
      available: self.available,
    })
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleUpdateDto {
  pub name: Option<String>,
  pub brand: Option<String>,
  pub model: Option<String>,
  pub year: Option<i64>,
  pub engine_size: Option<String>,
  pub horsepower: Option<String>,
  #[serde(rename = "type")]
  pub moto_type: Option<String>,
  pub category: Option<String>,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub available: Option<bool>,
}

impl From<MotorcycleUpdateDto> for MotorcycleUpdate {
  fn from(dto: MotorcycleUpdateDto) -> Self {
    Self {
      name: dto.name,
      brand: dto.brand,
      model: dto.model,
      year: dto.year,
      engine_size: dto.engine_size,
      horsepower: dto.horsepower,
      moto_type: dto.moto_type,
      category: dto.category,
      description: dto.description,
      image_url: dto.image_url,
      available: dto.available,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticleDto {
  pub title: Option<String>,
  pub content: Option<String>,
  pub excerpt: Option<String>,
  pub author: Option<String>,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub published: Option<bool>,
}

impl NewArticleDto {
  pub fn validate(self) -> Result<NewArticle, Vec<FieldError>> {
    let mut errors = Vec::new();
    let required = [
      ("title", self.title.is_none()),
      ("content", self.content.is_none()),
      ("excerpt", self.excerpt.is_none()),
      ("author", self.author.is_none()),
      ("category", self.category.is_none()),
      ("imageUrl", self.image_url.is_none()),
    ];
    for (field, missing) in &required {
      if *missing {
        errors.push(FieldError::required(field));
      }
    }
    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(NewArticle {
      title: self.title.unwrap_or_default(),
      content: self.content.unwrap_or_default(),
      excerpt: self.excerpt.unwrap_or_default(),
      author: self.author.unwrap_or_default(),
      category: self.category.unwrap_or_default(),
      image_url: self.image_url.unwrap_or_default(),
      published: self.published,
    })
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdateDto {
  pub title: Option<String>,
  pub content: Option<String>,
  pub excerpt: Option<String>,
  pub author: Option<String>,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub published: Option<bool>,
}

impl From<ArticleUpdateDto> for ArticleUpdate {
  fn from(dto: ArticleUpdateDto) -> Self {
    Self {
      title: dto.title,
      content: dto.content,
      excerpt: dto.excerpt,
      author: dto.author,
      category: dto.category,
      image_url: dto.image_url,
      published: dto.published,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct NewReviewDto {
  pub rating: Option<i64>,
  pub title: Option<String>,
  pub content: Option<String>,
}

impl NewReviewDto {
  // userId and motorcycleId come from the session and the
  // path, never from the body.
  pub fn validate(
    self,
    user_id: i64,
    motorcycle_id: i64
  ) -> Result<NewReview, Vec<FieldError>> {
    let mut errors = Vec::new();
    match self.rating {
      Some(rating) if (1..=5).contains(&rating) => {}
      Some(_) => errors.push(
        FieldError::new("rating", "Must be between 1 and 5")
      ),
      None => errors.push(FieldError::required("rating")),
    }
    if self.title.is_none() {
      errors.push(FieldError::required("title"));
    }
    if self.content.is_none() {
      errors.push(FieldError::required("content"));
    }
    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(NewReview {
      user_id,
      motorcycle_id,
      rating: self.rating.unwrap_or_default(),
      title: self.title.unwrap_or_default(),
      content: self.content.unwrap_or_default(),
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct MotorcyclesQuery {
  pub brand: Option<String>,
  #[serde(rename = "type")]
  pub moto_type: Option<String>,
  pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
  pub category: Option<String>,
  pub published: Option<String>,
  pub search: Option<String>,
}
