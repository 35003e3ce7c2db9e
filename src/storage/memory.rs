use color_eyre::Result;
use eyre::eyre;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::entities::*;
use super::Storage;
use crate::utils::time_utils;

// The ephemeral backend: plain maps keyed by id behind
// one RwLock. Ids are monotonic counters and are never
// handed out twice, matching the sqlite AUTOINCREMENT
// behavior.

#[derive(Default)]
struct Inner {
  motorcycles: HashMap<i64, Motorcycle>,
  articles: HashMap<i64, Article>,
  users: HashMap<i64, User>,
  reviews: HashMap<i64, Review>,
  favorites: HashMap<i64, Favorite>,
  sessions: HashMap<String, SessionRecord>,
  next_motorcycle_id: i64,
  next_article_id: i64,
  next_user_id: i64,
  next_review_id: i64,
  next_favorite_id: i64,
}

pub struct MemStorage {
  inner: RwLock<Inner>,
}

impl MemStorage {

  pub fn new() -> Self {
    Self {
      inner: RwLock::new(Inner::default()),
    }
  }

  // A poisoned lock means a panic happened while holding
  // it, surface that as a backend error like any other.
  fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
    self
      .inner
      .read()
      .map_err(|_| eyre!("In-memory storage lock poisoned"))
  }

  fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
    self
      .inner
      .write()
      .map_err(|_| eyre!("In-memory storage lock poisoned"))
  }
}

impl Storage for MemStorage {

  fn motorcycles(&self) -> Result<Vec<Motorcycle>> {
    Ok(self.read()?.motorcycles.values().cloned().collect())
  }

  fn motorcycle_by_id(&self, id: i64) -> Result<Option<Motorcycle>> {
    Ok(self.read()?.motorcycles.get(&id).cloned())
  }

  fn motorcycles_by_brand(&self, brand: &str) -> Result<Vec<Motorcycle>> {
    let wanted = brand.to_lowercase();
    Ok(
      self
        .read()?
        .motorcycles
        .values()
        .filter(|m| m.brand.to_lowercase() == wanted)
        .cloned()
        .collect()
    )
  }

  fn motorcycles_by_type(&self, moto_type: &str) -> Result<Vec<Motorcycle>> {
    let wanted = moto_type.to_lowercase();
    Ok(
      self
        .read()?
        .motorcycles
        .values()
        .filter(|m| m.moto_type.to_lowercase() == wanted)
        .cloned()
        .collect()
    )
  }

  fn search_motorcycles(&self, query: &str) -> Result<Vec<Motorcycle>> {
    let term = query.to_lowercase();
    Ok(
      self
        .read()?
        .motorcycles
        .values()
        .filter(|m| {
          m.name.to_lowercase().contains(&term)
            || m.brand.to_lowercase().contains(&term)
            || m.model.to_lowercase().contains(&term)
            || m.description.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
    )
  }

  fn create_motorcycle(&self, motorcycle: NewMotorcycle) -> Result<Motorcycle> {
    let mut inner = self.write()?;
    inner.next_motorcycle_id += 1;
    let now = time_utils::current_timestamp();
    let record = Motorcycle {
      id: inner.next_motorcycle_id,
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
      available: motorcycle.available.unwrap_or(true),
      created_at: now,
      updated_at: now,
    };
    inner.motorcycles.insert(record.id, record.clone());
    Ok(record)
  }

  fn update_motorcycle(
    &self,
    id: i64,
    updates: MotorcycleUpdate
  ) -> Result<Option<Motorcycle>> {
    let mut inner = self.write()?;
    let record = match inner.motorcycles.get_mut(&id) {
      Some(record) => record,
      None => return Ok(None),
    };
    if let Some(name) = updates.name {
      record.name = name;
    }
    if let Some(brand) = updates.brand {
      record.brand = brand;
    }
    if let Some(model) = updates.model {
      record.model = model;
    }
    if let Some(year) = updates.year {
      record.year = year;
    }
    if let Some(engine_size) = updates.engine_size {
      record.engine_size = engine_size;
    }
    if let Some(horsepower) = updates.horsepower {
      record.horsepower = horsepower;
    }
    if let Some(moto_type) = updates.moto_type {
      record.moto_type = moto_type;
    }
    if let Some(category) = updates.category {
      record.category = category;
    }
    if let Some(description) = updates.description {
      record.description = description;
    }
    if let Some(image_url) = updates.image_url {
      record.image_url = image_url;
    }
    if let Some(available) = updates.available {
      record.available = available;
    }
    record.updated_at = time_utils::current_timestamp();
    Ok(Some(record.clone()))
  }

  fn delete_motorcycle(&self, id: i64) -> Result<bool> {
    Ok(self.write()?.motorcycles.remove(&id).is_some())
  }

  fn articles(&self) -> Result<Vec<Article>> {
    Ok(self.read()?.articles.values().cloned().collect())
  }

  fn published_articles(&self) -> Result<Vec<Article>> {
    Ok(
      self
        .read()?
        .articles
        .values()
        .filter(|a| a.published)
        .cloned()
        .collect()
    )
  }

  fn article_by_id(&self, id: i64) -> Result<Option<Article>> {
    Ok(self.read()?.articles.get(&id).cloned())
  }

  fn articles_by_category(&self, category: &str) -> Result<Vec<Article>> {
    let wanted = category.to_lowercase();
    Ok(
      self
        .read()?
        .articles
        .values()
        .filter(|a| a.category.to_lowercase() == wanted)
        .cloned()
        .collect()
    )
  }

  fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
    let term = query.to_lowercase();
    Ok(
      self
        .read()?
        .articles
        .values()
        .filter(|a| {
          a.title.to_lowercase().contains(&term)
            || a.content.to_lowercase().contains(&term)
            || a.excerpt.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
    )
  }

  fn create_article(&self, article: NewArticle) -> Result<Article> {
    let mut inner = self.write()?;
    inner.next_article_id += 1;
    let now = time_utils::current_timestamp();
    let record = Article {
      id: inner.next_article_id,
      title: article.title,
      content: article.content,
      excerpt: article.excerpt,
      author: article.author,
      category: article.category,
      image_url: article.image_url,
      published: article.published.unwrap_or(false),
      created_at: now,
      updated_at: now,
    };
    inner.articles.insert(record.id, record.clone());
    Ok(record)
  }

  fn update_article(
    &self,
    id: i64,
    updates: ArticleUpdate
  ) -> Result<Option<Article>> {
    let mut inner = self.write()?;
    let record = match inner.articles.get_mut(&id) {
      Some(record) => record,
      None => return Ok(None),
    };
    if let Some(title) = updates.title {
      record.title = title;
    }
    if let Some(content) = updates.content {
      record.content = content;
    }
    if let Some(excerpt) = updates.excerpt {
      record.excerpt = excerpt;
    }
    if let Some(author) = updates.author {
      record.author = author;
    }
    if let Some(category) = updates.category {
      record.category = category;
    }
    if let Some(image_url) = updates.image_url {
      record.image_url = image_url;
    }
    if let Some(published) = updates.published {
      record.published = published;
    }
    record.updated_at = time_utils::current_timestamp();
    Ok(Some(record.clone()))
  }

  fn delete_article(&self, id: i64) -> Result<bool> {
    Ok(self.write()?.articles.remove(&id).is_some())
  }

  fn user_by_id(&self, id: i64) -> Result<Option<User>> {
    Ok(self.read()?.users.get(&id).cloned())
  }

  fn user_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(
      self
        .read()?
        .users
        .values()
        .find(|u| u.email == email)
        .cloned()
    )
  }

  fn create_user(&self, user: NewUser) -> Result<User> {
    let mut inner = self.write()?;
    inner.next_user_id += 1;
    let now = time_utils::current_timestamp();
    let record = User {
      id: inner.next_user_id,
      email: user.email,
      name: user.name,
      avatar: user.avatar,
      provider: user.provider,
      provider_id: user.provider_id,
      created_at: now,
      updated_at: now,
    };
    inner.users.insert(record.id, record.clone());
    Ok(record)
  }

  fn update_user(&self, id: i64, updates: UserUpdate) -> Result<Option<User>> {
    let mut inner = self.write()?;
    let record = match inner.users.get_mut(&id) {
      Some(record) => record,
      None => return Ok(None),
    };
    if let Some(email) = updates.email {
      record.email = email;
    }
    if let Some(name) = updates.name {
      record.name = name;
    }
    if let Some(avatar) = updates.avatar {
      record.avatar = Some(avatar);
    }
    if let Some(provider) = updates.provider {
      record.provider = provider;
    }
    if let Some(provider_id) = updates.provider_id {
      record.provider_id = Some(provider_id);
    }
    record.updated_at = time_utils::current_timestamp();
    Ok(Some(record.clone()))
  }

  fn reviews_for_motorcycle(&self, motorcycle_id: i64) -> Result<Vec<Review>> {
    Ok(
      self
        .read()?
        .reviews
        .values()
        .filter(|r| r.motorcycle_id == motorcycle_id)
        .cloned()
        .collect()
    )
  }

  fn reviews_for_user(&self, user_id: i64) -> Result<Vec<Review>> {
    Ok(
      self
        .read()?
        .reviews
        .values()
        .filter(|r| r.user_id == user_id)
        .cloned()
        .collect()
    )
  }

  fn create_review(&self, review: NewReview) -> Result<Review> {
    let mut inner = self.write()?;
    inner.next_review_id += 1;
    let now = time_utils::current_timestamp();
    let record = Review {
      id: inner.next_review_id,
      user_id: review.user_id,
      motorcycle_id: review.motorcycle_id,
      rating: review.rating,
      title: review.title,
      content: review.content,
      created_at: now,
      updated_at: now,
    };
    inner.reviews.insert(record.id, record.clone());
    Ok(record)
  }

  fn delete_review(&self, id: i64) -> Result<bool> {
    Ok(self.write()?.reviews.remove(&id).is_some())
  }

  fn add_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<Favorite> {
    let mut inner = self.write()?;
    inner.next_favorite_id += 1;
    let record = Favorite {
      id: inner.next_favorite_id,
      user_id,
      motorcycle_id,
      created_at: time_utils::current_timestamp(),
    };
    inner.favorites.insert(record.id, record.clone());
    Ok(record)
  }

  fn remove_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<bool> {
    let mut inner = self.write()?;
    let ids: Vec<i64> = inner
      .favorites
      .values()
      .filter(|f| f.user_id == user_id && f.motorcycle_id == motorcycle_id)
      .map(|f| f.id)
      .collect();
    for id in &ids {
      inner.favorites.remove(id);
    }
    Ok(!ids.is_empty())
  }

  fn is_favorite(&self, user_id: i64, motorcycle_id: i64) -> Result<bool> {
    Ok(
      self
        .read()?
        .favorites
        .values()
        .any(|f| f.user_id == user_id && f.motorcycle_id == motorcycle_id)
    )
  }

  fn favorites_for_user(
    &self,
    user_id: i64
  ) -> Result<Vec<FavoriteWithMotorcycle>> {
    let inner = self.read()?;
    Ok(
      inner
        .favorites
        .values()
        .filter(|f| f.user_id == user_id)
        .map(|f| FavoriteWithMotorcycle {
          favorite: f.clone(),
          motorcycle: inner.motorcycles.get(&f.motorcycle_id).cloned(),
        })
        .collect()
    )
  }

  fn put_session(&self, sid: &str, sess: &str, expire: i64) -> Result<()> {
    self.write()?.sessions.insert(
      sid.to_string(),
      SessionRecord {
        sid: sid.to_string(),
        sess: sess.to_string(),
        expire,
      },
    );
    Ok(())
  }

  fn session(&self, sid: &str) -> Result<Option<SessionRecord>> {
    let mut inner = self.write()?;
    let found = inner.sessions.get(sid).cloned();
    match found {
      Some(record) if record.expire <= time_utils::current_timestamp() => {
        inner.sessions.remove(sid);
        Ok(None)
      }
      other => Ok(other),
    }
  }

  fn delete_session(&self, sid: &str) -> Result<bool> {
    Ok(self.write()?.sessions.remove(sid).is_some())
  }

  fn purge_expired_sessions(&self) -> Result<usize> {
    let mut inner = self.write()?;
    let now = time_utils::current_timestamp();
    let before = inner.sessions.len();
    inner.sessions.retain(|_, record| record.expire > now);
    Ok(before - inner.sessions.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_motorcycle(name: &str, brand: &str) -> NewMotorcycle {
    NewMotorcycle {
      name: name.to_string(),
      brand: brand.to_string(),
      model: name.to_string(),
      year: 2024,
      engine_size: "689cc".to_string(),
      horsepower: "74 HP".to_string(),
      moto_type: "gasoline".to_string(),
      category: "naked".to_string(),
      description: "A versatile naked bike.".to_string(),
      image_url: "https://example.com/mt07.jpg".to_string(),
      available: None,
    }
  }

  #[test]
  fn ids_are_monotonic_and_never_reused() {
    let storage = MemStorage::new();
    let first = storage
      .create_motorcycle(sample_motorcycle("MT-07", "Yamaha"))
      .unwrap();
    assert_eq!(1, first.id);
    storage.delete_motorcycle(first.id).unwrap();
    let second = storage
      .create_motorcycle(sample_motorcycle("MT-09", "Yamaha"))
      .unwrap();
    assert_eq!(2, second.id);
  }

  #[test]
  fn available_defaults_to_true() {
    let storage = MemStorage::new();
    let created = storage
      .create_motorcycle(sample_motorcycle("MT-07", "Yamaha"))
      .unwrap();
    assert!(created.available);
  }

  #[test]
  fn type_filter_is_case_insensitive() {
    let storage = MemStorage::new();
    let mut electric = sample_motorcycle("Astor", "Orcal");
    electric.moto_type = "electric".to_string();
    storage.create_motorcycle(electric).unwrap();
    storage
      .create_motorcycle(sample_motorcycle("MT-07", "Yamaha"))
      .unwrap();
    let lower = storage.motorcycles_by_type("electric").unwrap();
    let upper = storage.motorcycles_by_type("ELECTRIC").unwrap();
    assert_eq!(1, lower.len());
    assert_eq!(lower, upper);
  }

  #[test]
  fn update_missing_id_returns_none() {
    let storage = MemStorage::new();
    let updates = MotorcycleUpdate {
      name: Some("Ghost".to_string()),
      ..MotorcycleUpdate::default()
    };
    assert!(storage.update_motorcycle(9, updates).unwrap().is_none());
    assert!(storage.motorcycles().unwrap().is_empty());
  }

  // Users and reviews have to behave exactly like the
  // persistent backend, no half-implemented operations
  // in the ephemeral one.
  #[test]
  fn users_and_reviews_are_fully_implemented() {
    let storage = MemStorage::new();
    let user = storage
      .create_user(NewUser {
        email: "rider@example.com".to_string(),
        name: "Rider".to_string(),
        avatar: None,
        provider: "email".to_string(),
        provider_id: None,
      })
      .unwrap();
    assert_eq!(
      Some(user.clone()),
      storage.user_by_email("rider@example.com").unwrap()
    );
    let review = storage
      .create_review(NewReview {
        user_id: user.id,
        motorcycle_id: 1,
        rating: 4,
        title: "Solid".to_string(),
        content: "Does everything well.".to_string(),
      })
      .unwrap();
    assert_eq!(1, storage.reviews_for_user(user.id).unwrap().len());
    assert!(storage.delete_review(review.id).unwrap());
    assert!(storage.reviews_for_user(user.id).unwrap().is_empty());
  }

  #[test]
  fn favorites_join_their_motorcycle() {
    let storage = MemStorage::new();
    let moto = storage
      .create_motorcycle(sample_motorcycle("MT-07", "Yamaha"))
      .unwrap();
    storage.add_favorite(5, moto.id).unwrap();
    let listed = storage.favorites_for_user(5).unwrap();
    assert_eq!(1, listed.len());
    assert_eq!(
      Some("MT-07"),
      listed[0].motorcycle.as_ref().map(|m| m.name.as_str())
    );
    assert!(storage.favorites_for_user(6).unwrap().is_empty());
  }

  #[test]
  fn expired_sessions_read_as_absent() {
    let storage = MemStorage::new();
    storage.put_session("dead", "{}", 1).unwrap();
    storage
      .put_session("live", "{}", time_utils::current_timestamp() + 60)
      .unwrap();
    assert!(storage.session("dead").unwrap().is_none());
    assert!(storage.session("live").unwrap().is_some());
    assert_eq!(0, storage.purge_expired_sessions().unwrap());
  }
}
