// Plain entity structs, one per table, plus the New*/
// *Update companions the storage operations take.
// These stay snake_case and timestamp-based, the DTO
// module does the camelCase/RFC 3339 conversions.

#[derive(Debug, Clone, PartialEq)]
pub struct Motorcycle {
  pub id: i64,
  pub name: String,
  pub brand: String,
  pub model: String,
  pub year: i64,
  pub engine_size: String,
  pub horsepower: String,
  // electric, gasoline or hybrid:
  pub moto_type: String,
  // naked, sport, adventure, classic, electric...
  pub category: String,
  pub description: String,
  pub image_url: String,
  pub available: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewMotorcycle {
  pub name: String,
  pub brand: String,
  pub model: String,
  pub year: i64,
  pub engine_size: String,
  pub horsepower: String,
  pub moto_type: String,
  pub category: String,
  pub description: String,
  pub image_url: String,
  // Defaults to true when omitted:
  pub available: Option<bool>,
}

// "Update only what's in the request body" object.
#[derive(Debug, Clone, Default)]
pub struct MotorcycleUpdate {
  pub name: Option<String>,
  pub brand: Option<String>,
  pub model: Option<String>,
  pub year: Option<i64>,
  pub engine_size: Option<String>,
  pub horsepower: Option<String>,
  pub moto_type: Option<String>,
  pub category: Option<String>,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
  pub id: i64,
  pub title: String,
  pub content: String,
  pub excerpt: String,
  pub author: String,
  // maintenance, review, travel or news:
  pub category: String,
  pub image_url: String,
  pub published: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
  pub title: String,
  pub content: String,
  pub excerpt: String,
  pub author: String,
  pub category: String,
  pub image_url: String,
  // Defaults to false when omitted:
  pub published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
  pub title: Option<String>,
  pub content: Option<String>,
  pub excerpt: Option<String>,
  pub author: Option<String>,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub published: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
  pub id: i64,
  pub email: String,
  pub name: String,
  pub avatar: Option<String>,
  // google, facebook or email:
  pub provider: String,
  pub provider_id: Option<String>,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub name: String,
  pub avatar: Option<String>,
  pub provider: String,
  pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
  pub email: Option<String>,
  pub name: Option<String>,
  pub avatar: Option<String>,
  pub provider: Option<String>,
  pub provider_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
  pub id: i64,
  pub user_id: i64,
  pub motorcycle_id: i64,
  // 1 to 5 stars, checked at the API boundary:
  pub rating: i64,
  pub title: String,
  pub content: String,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub user_id: i64,
  pub motorcycle_id: i64,
  pub rating: i64,
  pub title: String,
  pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Favorite {
  pub id: i64,
  pub user_id: i64,
  pub motorcycle_id: i64,
  pub created_at: i64,
}

// What the favorites listing returns: the row joined
// with its motorcycle. The motorcycle can be gone since
// deletes don't cascade.
#[derive(Debug, Clone)]
pub struct FavoriteWithMotorcycle {
  pub favorite: Favorite,
  pub motorcycle: Option<Motorcycle>,
}

// Session rows, keyed by the cookie sid. "sess" is an
// opaque JSON blob as far as storage is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
  pub sid: String,
  pub sess: String,
  pub expire: i64,
}
