use color_eyre::Result;
use r2d2_sqlite::SqliteConnectionManager;

pub mod entities;
mod helpers;
mod mappers;
pub mod memory;
pub mod seed;
pub mod sqlite;

use crate::config::Config;
use entities::*;
use memory::MemStorage;
use sqlite::SqliteStorage;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

/// The storage abstraction every handler goes through.
/// Two backends implement it in full: `SqliteStorage`
/// (persistent) and `MemStorage` (ephemeral). A lookup
/// miss is `Ok(None)` or `Ok(false)`, never an error —
/// errors mean the backend itself failed.
pub trait Storage: Send + Sync {
  // Motorcycle operations
  fn motorcycles(&self) -> Result<Vec<Motorcycle>>;
  fn motorcycle_by_id(&self, id: i64) -> Result<Option<Motorcycle>>;
  fn motorcycles_by_brand(&self, brand: &str) -> Result<Vec<Motorcycle>>;
  fn motorcycles_by_type(&self, moto_type: &str) -> Result<Vec<Motorcycle>>;
  fn search_motorcycles(&self, query: &str) -> Result<Vec<Motorcycle>>;
  fn create_motorcycle(&self, motorcycle: NewMotorcycle) -> Result<Motorcycle>;
  fn update_motorcycle(
    &self,
    id: i64,
    updates: MotorcycleUpdate
  ) -> Result<Option<Motorcycle>>;
  fn delete_motorcycle(&self, id: i64) -> Result<bool>;

  // Article operations
  fn articles(&self) -> Result<Vec<Article>>;
  fn published_articles(&self) -> Result<Vec<Article>>;
  fn article_by_id(&self, id: i64) -> Result<Option<Article>>;
  fn articles_by_category(&self, category: &str) -> Result<Vec<Article>>;
  fn search_articles(&self, query: &str) -> Result<Vec<Article>>;
  fn create_article(&self, article: NewArticle) -> Result<Article>;
  fn update_article(
    &self,
    id: i64,
    updates: ArticleUpdate
  ) -> Result<Option<Article>>;
  fn delete_article(&self, id: i64) -> Result<bool>;

  // User operations
  fn user_by_id(&self, id: i64) -> Result<Option<User>>;
  fn user_by_email(&self, email: &str) -> Result<Option<User>>;
  fn create_user(&self, user: NewUser) -> Result<User>;
  fn update_user(&self, id: i64, updates: UserUpdate) -> Result<Option<User>>;

  // Review operations
  fn reviews_for_motorcycle(&self, motorcycle_id: i64) -> Result<Vec<Review>>;
  fn reviews_for_user(&self, user_id: i64) -> Result<Vec<Review>>;
  fn create_review(&self, review: NewReview) -> Result<Review>;
  fn delete_review(&self, id: i64) -> Result<bool>;

  // Favorite operations
  fn add_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<Favorite>;
  fn remove_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<bool>;
  fn is_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<bool>;
  fn favorites_for_user(
    &self,
    user_id: i64
  ) -> Result<Vec<FavoriteWithMotorcycle>>;

  // Session operations
  fn put_session(&self, sid: &str, sess: &str, expire: i64) -> Result<()>;
  fn session(&self, sid: &str) -> Result<Option<SessionRecord>>;
  fn delete_session(&self, sid: &str) -> Result<bool>;
  fn purge_expired_sessions(&self) -> Result<usize>;
}

// Picks the backend from the config. Anything that isn't
// "memory" gets the persistent one.
pub fn open(config: &Config) -> Result<Box<dyn Storage>> {
  if config.storage_backend == "memory" {
    Ok(Box::new(MemStorage::new()))
  } else {
    let manager = SqliteConnectionManager::file(&config.db_path);
    let pool = Pool::new(manager)?;
    Ok(Box::new(SqliteStorage::open(pool)?))
  }
}
