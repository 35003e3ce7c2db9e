use super::entities::*;
use rusqlite::{Error, Row};

// Row to entity mappers. Column order has to match the
// SELECT field lists in the sqlite module.

pub fn map_motorcycle(row: &Row) -> Result<Motorcycle, Error> {
  map_motorcycle_at(row, 0)
}

// The favorites join needs to read a motorcycle starting
// at an arbitrary column offset, hence this variant.
pub fn map_motorcycle_at(row: &Row, at: usize) -> Result<Motorcycle, Error> {
  Ok(Motorcycle {
    id: row.get(at)?,
    name: row.get(at + 1)?,
    brand: row.get(at + 2)?,
    model: row.get(at + 3)?,
    year: row.get(at + 4)?,
    engine_size: row.get(at + 5)?,
    horsepower: row.get(at + 6)?,
    moto_type: row.get(at + 7)?,
    category: row.get(at + 8)?,
    description: row.get(at + 9)?,
    image_url: row.get(at + 10)?,
    available: row.get(at + 11)?,
    created_at: row.get(at + 12)?,
    updated_at: row.get(at + 13)?,
  })
}

pub fn map_article(row: &Row) -> Result<Article, Error> {
  Ok(Article {
    id: row.get(0)?,
    title: row.get(1)?,
    content: row.get(2)?,
    excerpt: row.get(3)?,
    author: row.get(4)?,
    category: row.get(5)?,
    image_url: row.get(6)?,
    published: row.get(7)?,
    created_at: row.get(8)?,
    updated_at: row.get(9)?,
  })
}

pub fn map_user(row: &Row) -> Result<User, Error> {
  Ok(User {
    id: row.get(0)?,
    email: row.get(1)?,
    name: row.get(2)?,
    avatar: row.get(3)?,
    provider: row.get(4)?,
    provider_id: row.get(5)?,
    created_at: row.get(6)?,
    updated_at: row.get(7)?,
  })
}

pub fn map_review(row: &Row) -> Result<Review, Error> {
  Ok(Review {
    id: row.get(0)?,
    user_id: row.get(1)?,
    motorcycle_id: row.get(2)?,
    rating: row.get(3)?,
    title: row.get(4)?,
    content: row.get(5)?,
    created_at: row.get(6)?,
    updated_at: row.get(7)?,
  })
}

pub fn map_favorite(row: &Row) -> Result<Favorite, Error> {
  Ok(Favorite {
    id: row.get(0)?,
    user_id: row.get(1)?,
    motorcycle_id: row.get(2)?,
    created_at: row.get(3)?,
  })
}

// Left join, the motorcycle columns are all NULL when
// the referenced record was deleted.
pub fn map_favorite_with_motorcycle(
  row: &Row
) -> Result<FavoriteWithMotorcycle, Error> {
  let favorite = map_favorite(row)?;
  let moto_id: Option<i64> = row.get(4)?;
  let motorcycle = match moto_id {
    Some(_) => Some(map_motorcycle_at(row, 4)?),
    None => None,
  };
  Ok(FavoriteWithMotorcycle { favorite, motorcycle })
}

pub fn map_session(row: &Row) -> Result<SessionRecord, Error> {
  Ok(SessionRecord {
    sid: row.get(0)?,
    sess: row.get(1)?,
    expire: row.get(2)?,
  })
}
