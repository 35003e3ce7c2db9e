use color_eyre::Result;
use eyre::WrapErr;
use rusqlite::{params, OptionalExtension, Row, ToSql, NO_PARAMS};

use super::entities::*;
use super::helpers;
use super::mappers;
use super::{Pool, Storage};
use crate::utils::time_utils;

// The persistent backend. All the concurrency control
// is the database's problem, we just hand out prepared
// statements over pooled connections.

const MOTORCYCLE_FIELDS: &str =
  "id, name, brand, model, year, engine_size, horsepower, \
  type, category, description, image_url, available, \
  created_at, updated_at";

const ARTICLE_FIELDS: &str =
  "id, title, content, excerpt, author, category, \
  image_url, published, created_at, updated_at";

const USER_FIELDS: &str =
  "id, email, name, avatar, provider, provider_id, \
  created_at, updated_at";

const REVIEW_FIELDS: &str =
  "id, user_id, motorcycle_id, rating, title, content, \
  created_at, updated_at";

pub struct SqliteStorage {
  pool: Pool,
}

impl SqliteStorage {

  pub fn open(pool: Pool) -> Result<Self> {
    let storage = Self { pool };
    storage.init_schema()?;
    Ok(storage)
  }

  // Idempotent, runs at every process start.
  // AUTOINCREMENT is what guarantees ids are monotonic
  // and never reused after a delete.
  fn init_schema(&self) -> Result<()> {
    let conn = self.pool.get()?;
    conn
      .execute_batch(
        "CREATE TABLE IF NOT EXISTS motorcycles (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          brand TEXT NOT NULL,
          model TEXT NOT NULL,
          year INTEGER NOT NULL,
          engine_size TEXT NOT NULL,
          horsepower TEXT NOT NULL,
          type TEXT NOT NULL,
          category TEXT NOT NULL,
          description TEXT NOT NULL,
          image_url TEXT NOT NULL,
          available INTEGER NOT NULL DEFAULT 1,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS articles (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          title TEXT NOT NULL,
          content TEXT NOT NULL,
          excerpt TEXT NOT NULL,
          author TEXT NOT NULL,
          category TEXT NOT NULL,
          image_url TEXT NOT NULL,
          published INTEGER NOT NULL DEFAULT 0,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS users (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          email TEXT NOT NULL UNIQUE,
          name TEXT NOT NULL,
          avatar TEXT,
          provider TEXT NOT NULL,
          provider_id TEXT,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS reviews (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id INTEGER NOT NULL,
          motorcycle_id INTEGER NOT NULL,
          rating INTEGER NOT NULL,
          title TEXT NOT NULL,
          content TEXT NOT NULL,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS favorites (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id INTEGER NOT NULL,
          motorcycle_id INTEGER NOT NULL,
          created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS sessions (
          sid TEXT PRIMARY KEY,
          sess TEXT NOT NULL,
          expire INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_expire
          ON sessions (expire);"
      )
      .context("Creating database schema")?;
    Ok(())
  }

  // Stole most of the signature from the rusqlite doc.
  fn select_many<T, P, F>(
    &self,
    query: &str,
    params: P,
    mapper: F
  ) -> Result<Vec<T>>
  where
    P: IntoIterator,
    P::Item: ToSql,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
  {
    let conn = self.pool.get()?;
    let mut stmt = conn.prepare(query)?;
    stmt
      .query_map(params, mapper)
      .and_then(Iterator::collect)
      .context("Generic select_many query")
  }

  // Same idea for single-row lookups, a miss is None.
  fn select_one<T, P, F>(
    &self,
    query: &str,
    params: P,
    mapper: F
  ) -> Result<Option<T>>
  where
    P: IntoIterator,
    P::Item: ToSql,
    F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
  {
    let conn = self.pool.get()?;
    let mut stmt = conn.prepare(query)?;
    stmt
      .query_row(params, mapper)
      .optional()
      .context("Generic select_one query")
  }

  fn delete_by_id(&self, table: &str, id: i64) -> Result<bool> {
    let conn = self.pool.get()?;
    let removed = conn.execute(
      &format!("DELETE FROM {} WHERE id = ?", table),
      params![id]
    )?;
    Ok(removed > 0)
  }
}

impl Storage for SqliteStorage {

  fn motorcycles(&self) -> Result<Vec<Motorcycle>> {
    self.select_many(
      &format!("SELECT {} FROM motorcycles", MOTORCYCLE_FIELDS),
      NO_PARAMS,
      mappers::map_motorcycle
    )
  }

  fn motorcycle_by_id(&self, id: i64) -> Result<Option<Motorcycle>> {
    self.select_one(
      &format!(
        "SELECT {} FROM motorcycles WHERE id = ?",
        MOTORCYCLE_FIELDS
      ),
      params![id],
      mappers::map_motorcycle
    )
  }

  fn motorcycles_by_brand(&self, brand: &str) -> Result<Vec<Motorcycle>> {
    self.select_many(
      &format!(
        "SELECT {} FROM motorcycles WHERE {}",
        MOTORCYCLE_FIELDS,
        helpers::set_clause_ci("brand")
      ),
      params![brand],
      mappers::map_motorcycle
    )
  }

  fn motorcycles_by_type(&self, moto_type: &str) -> Result<Vec<Motorcycle>> {
    self.select_many(
      &format!(
        "SELECT {} FROM motorcycles WHERE {}",
        MOTORCYCLE_FIELDS,
        helpers::set_clause_ci("type")
      ),
      params![moto_type],
      mappers::map_motorcycle
    )
  }

  fn search_motorcycles(&self, query: &str) -> Result<Vec<Motorcycle>> {
    let pattern = helpers::like_pattern(query);
    self.select_many(
      &format!(
        "SELECT {} FROM motorcycles WHERE {}",
        MOTORCYCLE_FIELDS,
        helpers::like_any_clause(
          &["name", "brand", "model", "description"]
        )
      ),
      params![pattern, pattern, pattern, pattern],
      mappers::map_motorcycle
    )
  }

  fn create_motorcycle(&self, motorcycle: NewMotorcycle) -> Result<Motorcycle> {
    let now = time_utils::current_timestamp();
    let available = motorcycle.available.unwrap_or(true);
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT INTO motorcycles (name, brand, model, year, engine_size, \
      horsepower, type, category, description, image_url, available, \
      created_at, updated_at) \
      VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
      params![
        motorcycle.name,
        motorcycle.brand,
        motorcycle.model,
        motorcycle.year,
        motorcycle.engine_size,
        motorcycle.horsepower,
        motorcycle.moto_type,
        motorcycle.category,
        motorcycle.description,
        motorcycle.image_url,
        available,
        now,
        now
      ]
    )?;
    Ok(Motorcycle {
      id: conn.last_insert_rowid(),
      name: motorcycle.name,
      brand: motorcycle.brand,
      model: motorcycle.model,
      year: motorcycle.year,
      engine_size: motorcycle.engine_size,
      horsepower: motorcycle.horsepower,
      moto_type: motorcycle.moto_type,
      category: motorcycle.category,
      description: motorcycle.description,
      image_url: motorcycle.image_url,
      available,
      created_at: now,
      updated_at: now,
    })
  }

  fn update_motorcycle(
    &self,
    id: i64,
    updates: MotorcycleUpdate
  ) -> Result<Option<Motorcycle>> {
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(name) = updates.name {
      sets.push(helpers::set_clause("name"));
      values.push(Box::new(name));
    }
    if let Some(brand) = updates.brand {
      sets.push(helpers::set_clause("brand"));
      values.push(Box::new(brand));
    }
    if let Some(model) = updates.model {
      sets.push(helpers::set_clause("model"));
      values.push(Box::new(model));
    }
    if let Some(year) = updates.year {
      sets.push(helpers::set_clause("year"));
      values.push(Box::new(year));
    }
    if let Some(engine_size) = updates.engine_size {
      sets.push(helpers::set_clause("engine_size"));
      values.push(Box::new(engine_size));
    }
    if let Some(horsepower) = updates.horsepower {
      sets.push(helpers::set_clause("horsepower"));
      values.push(Box::new(horsepower));
    }
    if let Some(moto_type) = updates.moto_type {
      sets.push(helpers::set_clause("type"));
      values.push(Box::new(moto_type));
    }
    if let Some(category) = updates.category {
      sets.push(helpers::set_clause("category"));
      values.push(Box::new(category));
    }
    if let Some(description) = updates.description {
      sets.push(helpers::set_clause("description"));
      values.push(Box::new(description));
    }
    if let Some(image_url) = updates.image_url {
      sets.push(helpers::set_clause("image_url"));
      values.push(Box::new(image_url));
    }
    if let Some(available) = updates.available {
      sets.push(helpers::set_clause("available"));
      values.push(Box::new(available));
    }
    // Every mutation refreshes updated_at, even an
    // otherwise empty one.
    sets.push(helpers::set_clause("updated_at"));
    values.push(Box::new(time_utils::current_timestamp()));
    values.push(Box::new(id));

    let sql = format!(
      "UPDATE motorcycles SET {} WHERE id = ?",
      sets.join(", ")
    );
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let conn = self.pool.get()?;
    let changed = conn.execute(&sql, &refs[..])?;
    drop(conn);
    if changed == 0 {
      // No upsert, a missing id stays missing.
      Ok(None)
    } else {
      self.motorcycle_by_id(id)
    }
  }

  fn delete_motorcycle(&self, id: i64) -> Result<bool> {
    self.delete_by_id("motorcycles", id)
  }

  fn articles(&self) -> Result<Vec<Article>> {
    self.select_many(
      &format!("SELECT {} FROM articles", ARTICLE_FIELDS),
      NO_PARAMS,
      mappers::map_article
    )
  }

  fn published_articles(&self) -> Result<Vec<Article>> {
    self.select_many(
      &format!(
        "SELECT {} FROM articles WHERE published = 1",
        ARTICLE_FIELDS
      ),
      NO_PARAMS,
      mappers::map_article
    )
  }

  fn article_by_id(&self, id: i64) -> Result<Option<Article>> {
    self.select_one(
      &format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_FIELDS),
      params![id],
      mappers::map_article
    )
  }

  fn articles_by_category(&self, category: &str) -> Result<Vec<Article>> {
    self.select_many(
      &format!(
        "SELECT {} FROM articles WHERE {}",
        ARTICLE_FIELDS,
        helpers::set_clause_ci("category")
      ),
      params![category],
      mappers::map_article
    )
  }

  fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
    let pattern = helpers::like_pattern(query);
    self.select_many(
      &format!(
        "SELECT {} FROM articles WHERE {}",
        ARTICLE_FIELDS,
        helpers::like_any_clause(&["title", "content", "excerpt"])
      ),
      params![pattern, pattern, pattern],
      mappers::map_article
    )
  }

  fn create_article(&self, article: NewArticle) -> Result<Article> {
    let now = time_utils::current_timestamp();
    let published = article.published.unwrap_or(false);
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT INTO articles (title, content, excerpt, author, category, \
      image_url, published, created_at, updated_at) \
      VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
      params![
        article.title,
        article.content,
        article.excerpt,
        article.author,
        article.category,
        article.image_url,
        published,
        now,
        now
      ]
    )?;
    Ok(Article {
      id: conn.last_insert_rowid(),
      title: article.title,
      content: article.content,
      excerpt: article.excerpt,
      author: article.author,
      category: article.category,
      image_url: article.image_url,
      published,
      created_at: now,
      updated_at: now,
    })
  }

  fn update_article(
    &self,
    id: i64,
    updates: ArticleUpdate
  ) -> Result<Option<Article>> {
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(title) = updates.title {
      sets.push(helpers::set_clause("title"));
      values.push(Box::new(title));
    }
    if let Some(content) = updates.content {
      sets.push(helpers::set_clause("content"));
      values.push(Box::new(content));
    }
    if let Some(excerpt) = updates.excerpt {
      sets.push(helpers::set_clause("excerpt"));
      values.push(Box::new(excerpt));
    }
    if let Some(author) = updates.author {
      sets.push(helpers::set_clause("author"));
      values.push(Box::new(author));
    }
    if let Some(category) = updates.category {
      sets.push(helpers::set_clause("category"));
      values.push(Box::new(category));
    }
    if let Some(image_url) = updates.image_url {
      sets.push(helpers::set_clause("image_url"));
      values.push(Box::new(image_url));
    }
    if let Some(published) = updates.published {
      sets.push(helpers::set_clause("published"));
      values.push(Box::new(published));
    }
    sets.push(helpers::set_clause("updated_at"));
    values.push(Box::new(time_utils::current_timestamp()));
    values.push(Box::new(id));

    let sql = format!(
      "UPDATE articles SET {} WHERE id = ?",
      sets.join(", ")
    );
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let conn = self.pool.get()?;
    let changed = conn.execute(&sql, &refs[..])?;
    drop(conn);
    if changed == 0 {
      Ok(None)
    } else {
      self.article_by_id(id)
    }
  }

  fn delete_article(&self, id: i64) -> Result<bool> {
    self.delete_by_id("articles", id)
  }

  fn user_by_id(&self, id: i64) -> Result<Option<User>> {
    self.select_one(
      &format!("SELECT {} FROM users WHERE id = ?", USER_FIELDS),
      params![id],
      mappers::map_user
    )
  }

  fn user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.select_one(
      &format!("SELECT {} FROM users WHERE email = ?", USER_FIELDS),
      params![email],
      mappers::map_user
    )
  }

  fn create_user(&self, user: NewUser) -> Result<User> {
    let now = time_utils::current_timestamp();
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT INTO users (email, name, avatar, provider, provider_id, \
      created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
      params![
        user.email,
        user.name,
        user.avatar,
        user.provider,
        user.provider_id,
        now,
        now
      ]
    )?;
    Ok(User {
      id: conn.last_insert_rowid(),
      email: user.email,
      name: user.name,
      avatar: user.avatar,
      provider: user.provider,
      provider_id: user.provider_id,
      created_at: now,
      updated_at: now,
    })
  }

  fn update_user(&self, id: i64, updates: UserUpdate) -> Result<Option<User>> {
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(email) = updates.email {
      sets.push(helpers::set_clause("email"));
      values.push(Box::new(email));
    }
    if let Some(name) = updates.name {
      sets.push(helpers::set_clause("name"));
      values.push(Box::new(name));
    }
    if let Some(avatar) = updates.avatar {
      sets.push(helpers::set_clause("avatar"));
      values.push(Box::new(avatar));
    }
    if let Some(provider) = updates.provider {
      sets.push(helpers::set_clause("provider"));
      values.push(Box::new(provider));
    }
    if let Some(provider_id) = updates.provider_id {
      sets.push(helpers::set_clause("provider_id"));
      values.push(Box::new(provider_id));
    }
    sets.push(helpers::set_clause("updated_at"));
    values.push(Box::new(time_utils::current_timestamp()));
    values.push(Box::new(id));

    let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let conn = self.pool.get()?;
    let changed = conn.execute(&sql, &refs[..])?;
    drop(conn);
    if changed == 0 {
      Ok(None)
    } else {
      self.user_by_id(id)
    }
  }

  fn reviews_for_motorcycle(&self, motorcycle_id: i64) -> Result<Vec<Review>> {
    self.select_many(
      &format!(
        "SELECT {} FROM reviews WHERE motorcycle_id = ?",
        REVIEW_FIELDS
      ),
      params![motorcycle_id],
      mappers::map_review
    )
  }

  fn reviews_for_user(&self, user_id: i64) -> Result<Vec<Review>> {
    self.select_many(
      &format!("SELECT {} FROM reviews WHERE user_id = ?", REVIEW_FIELDS),
      params![user_id],
      mappers::map_review
    )
  }

  fn create_review(&self, review: NewReview) -> Result<Review> {
    let now = time_utils::current_timestamp();
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT INTO reviews (user_id, motorcycle_id, rating, title, \
      content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
      params![
        review.user_id,
        review.motorcycle_id,
        review.rating,
        review.title,
        review.content,
        now,
        now
      ]
    )?;
    Ok(Review {
      id: conn.last_insert_rowid(),
      user_id: review.user_id,
      motorcycle_id: review.motorcycle_id,
      rating: review.rating,
      title: review.title,
      content: review.content,
      created_at: now,
      updated_at: now,
    })
  }

  fn delete_review(&self, id: i64) -> Result<bool> {
    self.delete_by_id("reviews", id)
  }

  fn add_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<Favorite> {
    let now = time_utils::current_timestamp();
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT INTO favorites (user_id, motorcycle_id, created_at) \
      VALUES (?, ?, ?)",
      params![user_id, motorcycle_id, now]
    )?;
    Ok(Favorite {
      id: conn.last_insert_rowid(),
      user_id,
      motorcycle_id,
      created_at: now,
    })
  }

  fn remove_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<bool> {
    let conn = self.pool.get()?;
    let removed = conn.execute(
      "DELETE FROM favorites WHERE user_id = ? AND motorcycle_id = ?",
      params![user_id, motorcycle_id]
    )?;
    Ok(removed > 0)
  }

  fn is_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<bool> {
    let found: Option<i64> = self.select_one(
      "SELECT id FROM favorites \
      WHERE user_id = ? AND motorcycle_id = ? LIMIT 1",
      params![user_id, motorcycle_id],
      |row| row.get(0)
    )?;
    Ok(found.is_some())
  }

  fn favorites_for_user(
    &self,
    user_id: i64
  ) -> Result<Vec<FavoriteWithMotorcycle>> {
    self.select_many(
      "SELECT f.id, f.user_id, f.motorcycle_id, f.created_at, \
      m.id, m.name, m.brand, m.model, m.year, m.engine_size, \
      m.horsepower, m.type, m.category, m.description, m.image_url, \
      m.available, m.created_at, m.updated_at \
      FROM favorites f \
      LEFT JOIN motorcycles m ON m.id = f.motorcycle_id \
      WHERE f.user_id = ?",
      params![user_id],
      mappers::map_favorite_with_motorcycle
    )
  }

  fn put_session(&self, sid: &str, sess: &str, expire: i64) -> Result<()> {
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT OR REPLACE INTO sessions (sid, sess, expire) \
      VALUES (?, ?, ?)",
      params![sid, sess, expire]
    )?;
    Ok(())
  }

  fn session(&self, sid: &str) -> Result<Option<SessionRecord>> {
    let record = self.select_one(
      "SELECT sid, sess, expire FROM sessions WHERE sid = ?",
      params![sid],
      mappers::map_session
    )?;
    match record {
      Some(record) if record.expire <= time_utils::current_timestamp() => {
        // Expired rows read as absent, drop them on sight.
        self.delete_session(sid)?;
        Ok(None)
      }
      other => Ok(other),
    }
  }

  fn delete_session(&self, sid: &str) -> Result<bool> {
    let conn = self.pool.get()?;
    let removed = conn.execute(
      "DELETE FROM sessions WHERE sid = ?",
      params![sid]
    )?;
    Ok(removed > 0)
  }

  fn purge_expired_sessions(&self) -> Result<usize> {
    let conn = self.pool.get()?;
    let purged = conn.execute(
      "DELETE FROM sessions WHERE expire <= ?",
      params![time_utils::current_timestamp()]
    )?;
    Ok(purged)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use r2d2_sqlite::SqliteConnectionManager;

  // A pool of size 1 or every connection would get its
  // own private in-memory database.
  fn test_storage() -> SqliteStorage {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    SqliteStorage::open(pool).unwrap()
  }

  fn sample_motorcycle(name: &str, brand: &str) -> NewMotorcycle {
    NewMotorcycle {
      name: name.to_string(),
      brand: brand.to_string(),
      model: name.to_string(),
      year: 2024,
      engine_size: "649cc".to_string(),
      horsepower: "95 HP".to_string(),
      moto_type: "gasoline".to_string(),
      category: "naked".to_string(),
      description: "A neo-sports caf\u{e9} racer.".to_string(),
      image_url: "https://example.com/cb650r.jpg".to_string(),
      available: None,
    }
  }

  fn sample_article(title: &str) -> NewArticle {
    NewArticle {
      title: title.to_string(),
      content: "Long form content.".to_string(),
      excerpt: "Short form.".to_string(),
      author: "Ahmed Ben Ali".to_string(),
      category: "maintenance".to_string(),
      image_url: "https://example.com/a.jpg".to_string(),
      published: None,
    }
  }

  #[test]
  fn create_then_fetch_applies_defaults() {
    let storage = test_storage();
    let created = storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    assert_eq!(1, created.id);
    // "available" was omitted and must default to true:
    assert!(created.available);
    let fetched = storage.motorcycle_by_id(created.id).unwrap().unwrap();
    assert_eq!(created, fetched);
  }

  #[test]
  fn missing_id_is_none_not_an_error() {
    let storage = test_storage();
    assert!(storage.motorcycle_by_id(1234).unwrap().is_none());
    assert!(storage.article_by_id(1234).unwrap().is_none());
    assert!(storage.user_by_id(1234).unwrap().is_none());
  }

  #[test]
  fn update_merges_partial_fields_and_refreshes_updated_at() {
    let storage = test_storage();
    let created = storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    // Backdate the row so the refresh is observable:
    let conn = storage.pool.get().unwrap();
    conn
      .execute(
        "UPDATE motorcycles SET created_at = 0, updated_at = 0",
        NO_PARAMS
      )
      .unwrap();
    drop(conn);

    let updates = MotorcycleUpdate {
      horsepower: Some("100 HP".to_string()),
      available: Some(false),
      ..MotorcycleUpdate::default()
    };
    let updated = storage
      .update_motorcycle(created.id, updates)
      .unwrap()
      .unwrap();
    assert_eq!("100 HP", updated.horsepower);
    assert!(!updated.available);
    // Untouched fields survive the merge:
    assert_eq!("Honda", updated.brand);
    assert_eq!(0, updated.created_at);
    assert!(updated.updated_at > 0);
  }

  #[test]
  fn update_on_missing_id_never_creates() {
    let storage = test_storage();
    let updates = MotorcycleUpdate {
      name: Some("Ghost".to_string()),
      ..MotorcycleUpdate::default()
    };
    assert!(storage.update_motorcycle(42, updates).unwrap().is_none());
    assert!(storage.motorcycles().unwrap().is_empty());
  }

  #[test]
  fn delete_reports_whether_a_row_existed() {
    let storage = test_storage();
    let created = storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    assert!(storage.delete_motorcycle(created.id).unwrap());
    assert!(!storage.delete_motorcycle(created.id).unwrap());
    assert!(storage.motorcycle_by_id(created.id).unwrap().is_none());
  }

  #[test]
  fn ids_are_not_reused_after_delete() {
    let storage = test_storage();
    let first = storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    storage.delete_motorcycle(first.id).unwrap();
    let second = storage
      .create_motorcycle(sample_motorcycle("MT-07", "Yamaha"))
      .unwrap();
    assert!(second.id > first.id);
  }

  #[test]
  fn brand_filter_is_case_insensitive() {
    let storage = test_storage();
    storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    storage
      .create_motorcycle(sample_motorcycle("MT-07", "Yamaha"))
      .unwrap();
    let lower = storage.motorcycles_by_brand("honda").unwrap();
    let upper = storage.motorcycles_by_brand("HONDA").unwrap();
    assert_eq!(1, lower.len());
    assert_eq!(lower, upper);
  }

  #[test]
  fn search_matches_any_text_field() {
    let storage = test_storage();
    storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    storage
      .create_motorcycle(sample_motorcycle("MT-07", "Yamaha"))
      .unwrap();
    // Hits the description field of both records:
    assert_eq!(2, storage.search_motorcycles("racer").unwrap().len());
    // Hits a single name, case-insensitively:
    assert_eq!(1, storage.search_motorcycles("mt-07").unwrap().len());
    // No hit anywhere is an empty list, not an error:
    assert!(storage.search_motorcycles("sidecar").unwrap().is_empty());
  }

  #[test]
  fn published_filter_and_defaults_for_articles() {
    let storage = test_storage();
    let draft = storage.create_article(sample_article("Draft")).unwrap();
    assert!(!draft.published);
    let mut published = sample_article("Published");
    published.published = Some(true);
    storage.create_article(published).unwrap();
    assert_eq!(2, storage.articles().unwrap().len());
    let only_published = storage.published_articles().unwrap();
    assert_eq!(1, only_published.len());
    assert_eq!("Published", only_published[0].title);
  }

  #[test]
  fn user_lookup_by_email() {
    let storage = test_storage();
    let user = storage
      .create_user(NewUser {
        email: "rider@example.com".to_string(),
        name: "Rider".to_string(),
        avatar: None,
        provider: "google".to_string(),
        provider_id: Some("g-123".to_string()),
      })
      .unwrap();
    let found = storage.user_by_email("rider@example.com").unwrap();
    assert_eq!(Some(user), found);
    assert!(storage.user_by_email("nobody@example.com").unwrap().is_none());
  }

  #[test]
  fn reviews_attach_to_motorcycle_and_user() {
    let storage = test_storage();
    let review = storage
      .create_review(NewReview {
        user_id: 7,
        motorcycle_id: 3,
        rating: 5,
        title: "Great bike".to_string(),
        content: "Smooth engine.".to_string(),
      })
      .unwrap();
    assert_eq!(1, storage.reviews_for_motorcycle(3).unwrap().len());
    assert_eq!(1, storage.reviews_for_user(7).unwrap().len());
    assert!(storage.reviews_for_motorcycle(4).unwrap().is_empty());
    assert!(storage.delete_review(review.id).unwrap());
    assert!(!storage.delete_review(review.id).unwrap());
  }

  #[test]
  fn favorites_round_trip_with_join() {
    let storage = test_storage();
    let moto = storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    assert!(!storage.is_favorite(1, moto.id).unwrap());
    storage.add_favorite(1, moto.id).unwrap();
    assert!(storage.is_favorite(1, moto.id).unwrap());
    let listed = storage.favorites_for_user(1).unwrap();
    assert_eq!(1, listed.len());
    assert_eq!(
      Some("CB650R"),
      listed[0].motorcycle.as_ref().map(|m| m.name.as_str())
    );
    assert!(storage.remove_favorite(1, moto.id).unwrap());
    assert!(!storage.remove_favorite(1, moto.id).unwrap());
  }

  #[test]
  fn favorites_join_survives_a_deleted_motorcycle() {
    let storage = test_storage();
    let moto = storage
      .create_motorcycle(sample_motorcycle("CB650R", "Honda"))
      .unwrap();
    storage.add_favorite(1, moto.id).unwrap();
    storage.delete_motorcycle(moto.id).unwrap();
    let listed = storage.favorites_for_user(1).unwrap();
    assert_eq!(1, listed.len());
    assert!(listed[0].motorcycle.is_none());
  }

  #[test]
  fn sessions_expire_and_purge() {
    let storage = test_storage();
    let future = time_utils::current_timestamp() + 3600;
    storage.put_session("live", "{}", future).unwrap();
    storage.put_session("dead", "{}", 1).unwrap();
    assert!(storage.session("live").unwrap().is_some());
    assert!(storage.session("dead").unwrap().is_none());
    // "dead" was dropped by the expired read, "live" stays:
    assert_eq!(0, storage.purge_expired_sessions().unwrap());
    assert!(storage.delete_session("live").unwrap());
    assert!(!storage.delete_session("live").unwrap());
  }
}
