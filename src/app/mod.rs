use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, info};

// Got to use crate here because of the other crate
// named "config" that we use as a dependency.
use crate::config::{AuthInfo, Config};
use crate::storage;
use crate::storage::seed;
use crate::storage::Storage;

mod dtos;
mod error;
mod handlers;
mod session;

// Declare app state struct:
pub struct AppState {
  pub storage: Box<dyn storage::Storage>,
  pub auth: AuthInfo,
}

// Function to start the server.
// Has to be async because there should be a .await at
// the end, the #[actix_web::main] decorator lives in
// main.rs.
pub async fn run() -> Result<()> {
  let config = Config::from_env()
    .expect("Configuration (environment or .env file) is missing");
  debug!("Current config: {:?}", config);
  let store = storage::open(&config)
    .expect("Could not open the storage backend");

  // Leftover sessions from previous runs:
  let purged = store.purge_expired_sessions()?;
  if purged > 0 {
    info!("Purged {} expired sessions", purged);
  }
  seed::run(store.as_ref())?;

  // Got to save the bind_address for later because
  // we'll be destroying "config" by moving it into
  // app_state as an AuthInfo struct.
  let bind_address = config.bind_address.clone();

  let app_state = web::Data::new(AppState {
    storage: store,
    auth: config.into(),
  });

  HttpServer::new(move || {
    App::new()
      .app_data(app_state.clone())
      .app_data(web::PathConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid path arguments")
      }))
      .app_data(web::QueryConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid query string arguments")
      }))
      .app_data(web::JsonConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid JSON payload")
      }))
      .wrap(middleware::Logger::default())
      // The SPA dev server runs on another port and sends
      // the session cookie cross-origin:
      .wrap(Cors::permissive())
      .configure(api_config)
      .default_service(web::route().to(handlers::not_found))
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")
}

// Route configuration:
fn api_config(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(handlers::index))
    .route("/api/auth/login", web::post().to(handlers::auth::login))
    .route("/api/auth/logout", web::post().to(handlers::auth::logout))
    .route("/api/auth/check", web::get().to(handlers::auth::check))
    .route("/api/auth/register", web::post().to(handlers::auth::register))
    .route(
      "/api/auth/oauth/{provider}",
      web::post().to(handlers::auth::oauth)
    )
    .route("/api/motorcycles", web::get().to(handlers::motorcycles::list))
    .route(
      "/api/motorcycles",
      web::post().to(handlers::motorcycles::create)
    )
    .route(
      "/api/motorcycles/{id}",
      web::get().to(handlers::motorcycles::get)
    )
    .route(
      "/api/motorcycles/{id}",
      web::put().to(handlers::motorcycles::update)
    )
    .route(
      "/api/motorcycles/{id}",
      web::delete().to(handlers::motorcycles::delete)
    )
    .route(
      "/api/motorcycles/{id}/reviews",
      web::get().to(handlers::reviews::list_for_motorcycle)
    )
    .route(
      "/api/motorcycles/{id}/reviews",
      web::post().to(handlers::reviews::create)
    )
    .route(
      "/api/motorcycles/{id}/favorite",
      web::post().to(handlers::favorites::add)
    )
    .route(
      "/api/motorcycles/{id}/favorite",
      web::delete().to(handlers::favorites::remove)
    )
    .route(
      "/api/motorcycles/{id}/favorite",
      web::get().to(handlers::favorites::status)
    )
    .route("/api/articles", web::get().to(handlers::articles::list))
    .route("/api/articles", web::post().to(handlers::articles::create))
    .route("/api/articles/{id}", web::get().to(handlers::articles::get))
    .route(
      "/api/articles/{id}",
      web::put().to(handlers::articles::update)
    )
    .route(
      "/api/articles/{id}",
      web::delete().to(handlers::articles::delete)
    )
    .route(
      "/api/users/{id}/reviews",
      web::get().to(handlers::reviews::list_for_user)
    )
    .route(
      "/api/users/{id}/favorites",
      web::get().to(handlers::favorites::list_for_user)
    )
    .route("/api/reviews/{id}", web::delete().to(handlers::reviews::delete))
    .route("/api/admin/stats", web::get().to(handlers::admin::stats));
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::StatusCode;
  use actix_web::test;
  use serde_json::{json, Value};

  use crate::storage::memory::MemStorage;
  use crate::storage::Storage;

  fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState {
      storage: Box::new(MemStorage::new()),
      auth: AuthInfo {
        username: String::from("admin"),
        password: String::from("admin123"),
        cookie_name: String::from("riders_session"),
        session_ttl: 86400,
      },
    })
  }

  macro_rules! test_app {
    ($state:expr) => {
      test::init_service(
        App::new()
          .app_data($state.clone())
          .configure(api_config)
          .default_service(web::route().to(handlers::not_found))
      )
      .await
    };
  }

  // Macro because naming the concrete service type that
  // init_service returns is not worth the trouble.
  macro_rules! login_cookie {
    ($app:expr) => {{
      let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({"username": "admin", "password": "admin123"}))
        .to_request();
      let resp = test::call_service(&mut $app, req).await;
      assert_eq!(StatusCode::OK, resp.status());
      resp
        .response()
        .cookies()
        .next()
        .expect("Login response should set the session cookie")
        .into_owned()
    }};
  }

  #[actix_rt::test]
  async fn login_check_logout_flow() {
    let state = test_state();
    let mut app = test_app!(state);

    let cookie = login_cookie!(app);
    assert_eq!("riders_session", cookie.name());

    let req = test::TestRequest::get()
      .uri("/api/auth/check")
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(json!(true), body["authenticated"]);
    assert_eq!(json!("Admin"), body["user"]["name"]);

    let req = test::TestRequest::post()
      .uri("/api/auth/logout")
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::OK, resp.status());

    // The session row is gone, the old sid is worthless:
    let req = test::TestRequest::get()
      .uri("/api/auth/check")
      .cookie(cookie)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(json!(false), body["authenticated"]);
  }

  #[actix_rt::test]
  async fn bad_credentials_get_a_401() {
    let state = test_state();
    let mut app = test_app!(state);
    let req = test::TestRequest::post()
      .uri("/api/auth/login")
      .set_json(&json!({"username": "admin", "password": "nope"}))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::UNAUTHORIZED, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(json!("Invalid credentials"), body["message"]);
  }

  #[actix_rt::test]
  async fn motorcycle_create_requires_a_session() {
    let state = test_state();
    let mut app = test_app!(state);
    let payload = json!({
      "name": "MT-07",
      "brand": "Yamaha",
      "model": "MT-07",
      "year": 2024,
      "engineSize": "689cc",
      "horsepower": "73 HP",
      "type": "gasoline",
      "category": "naked",
      "description": "The torquey twin.",
      "imageUrl": "https://example.com/mt07.jpg"
    });

    let req = test::TestRequest::post()
      .uri("/api/motorcycles")
      .set_json(&payload)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::UNAUTHORIZED, resp.status());

    let cookie = login_cookie!(app);
    let req = test::TestRequest::post()
      .uri("/api/motorcycles")
      .cookie(cookie)
      .set_json(&payload)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::CREATED, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(json!(1), body["id"]);
    assert_eq!(json!(true), body["available"]);
  }

  #[actix_rt::test]
  async fn validation_errors_list_every_missing_field() {
    let state = test_state();
    let mut app = test_app!(state);
    let cookie = login_cookie!(app);
    let req = test::TestRequest::post()
      .uri("/api/motorcycles")
      .cookie(cookie)
      .set_json(&json!({"name": "MT-07", "brand": "Yamaha"}))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::BAD_REQUEST, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(json!("Invalid motorcycle data"), body["message"]);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(8, errors.len());
  }

  #[actix_rt::test]
  async fn oauth_reuses_the_account_by_email() {
    let state = test_state();
    let mut app = test_app!(state);
    let payload = json!({
      "email": "rider@example.com",
      "name": "Rider",
      "googleId": "g-42"
    });

    let req = test::TestRequest::post()
      .uri("/api/auth/oauth/google")
      .set_json(&payload)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::OK, resp.status());
    let first: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
      .uri("/api/auth/oauth/facebook")
      .set_json(&json!({
        "email": "rider@example.com",
        "name": "Rider",
        "facebookId": "f-42"
      }))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let second: Value = test::read_body_json(resp).await;
    assert_eq!(first["user"]["id"], second["user"]["id"]);

    let req = test::TestRequest::post()
      .uri("/api/auth/oauth/github")
      .set_json(&payload)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
  }

  #[actix_rt::test]
  async fn favorites_are_owned_by_the_session_user() {
    let state = test_state();
    // A motorcycle to favorite, put in before the app
    // wraps the store:
    state
      .storage
      .create_motorcycle(crate::storage::entities::NewMotorcycle {
        name: String::from("CB650R"),
        brand: String::from("Honda"),
        model: String::from("CB650R"),
        year: 2024,
        engine_size: String::from("649cc"),
        horsepower: String::from("95 HP"),
        moto_type: String::from("gasoline"),
        category: String::from("naked"),
        description: String::from("d"),
        image_url: String::from("i"),
        available: None,
      })
      .unwrap();
    let mut app = test_app!(state);

    let req = test::TestRequest::post()
      .uri("/api/auth/oauth/google")
      .set_json(&json!({
        "email": "rider@example.com",
        "name": "Rider",
        "providerId": "g-1"
      }))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let cookie = resp.response().cookies().next().unwrap().into_owned();
    let body: Value = test::read_body_json(resp).await;
    let user_id = body["user"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
      .uri("/api/motorcycles/1/favorite")
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::CREATED, resp.status());

    let req = test::TestRequest::get()
      .uri("/api/motorcycles/1/favorite")
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(json!(true), body["isFavorite"]);

    let req = test::TestRequest::get()
      .uri(&format!("/api/users/{}/favorites", user_id))
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::OK, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(1, body.as_array().unwrap().len());
    assert_favorite_has_motorcycle(&body[0]);

    // Somebody else's list is off limits:
    let req = test::TestRequest::get()
      .uri(&format!("/api/users/{}/favorites", user_id + 1))
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::FORBIDDEN, resp.status());

    let req = test::TestRequest::delete()
      .uri("/api/motorcycles/1/favorite")
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::NO_CONTENT, resp.status());

    let req = test::TestRequest::delete()
      .uri("/api/motorcycles/1/favorite")
      .cookie(cookie)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
  }

  #[actix_rt::test]
  async fn review_user_id_comes_from_the_session() {
    let state = test_state();
    state
      .storage
      .create_motorcycle(crate::storage::entities::NewMotorcycle {
        name: String::from("390 Duke"),
        brand: String::from("KTM"),
        model: String::from("390 Duke"),
        year: 2024,
        engine_size: String::from("373cc"),
        horsepower: String::from("44 HP"),
        moto_type: String::from("gasoline"),
        category: String::from("naked"),
        description: String::from("d"),
        image_url: String::from("i"),
        available: None,
      })
      .unwrap();
    let mut app = test_app!(state);
    let cookie = login_cookie!(app);

    let req = test::TestRequest::post()
      .uri("/api/motorcycles/1/reviews")
      .cookie(cookie.clone())
      .set_json(&json!({
        "rating": 5,
        "title": "Hooligan approved",
        "content": "Light and sharp.",
        // Ignored, the session decides:
        "userId": 999
      }))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::CREATED, resp.status());
    let body: Value = test::read_body_json(resp).await;
    // The demo admin session carries user id 1:
    assert_eq!(json!(1), body["userId"]);
    let review_id = body["id"].as_i64().unwrap();

    // Reading back is open, no cookie needed:
    let req = test::TestRequest::get()
      .uri("/api/motorcycles/1/reviews")
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(1, body.as_array().unwrap().len());

    // Out-of-range rating is a 400 with field detail:
    let req = test::TestRequest::post()
      .uri("/api/motorcycles/1/reviews")
      .cookie(cookie.clone())
      .set_json(&json!({
        "rating": 9,
        "title": "t",
        "content": "c"
      }))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::BAD_REQUEST, resp.status());

    let req = test::TestRequest::delete()
      .uri(&format!("/api/reviews/{}", review_id))
      .cookie(cookie)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::NO_CONTENT, resp.status());
  }

  fn assert_favorite_has_motorcycle(favorite: &Value) {
    assert_eq!(json!("CB650R"), favorite["motorcycle"]["name"]);
    assert!(favorite.get("userId").is_none());
  }

  #[actix_rt::test]
  async fn unknown_routes_get_a_json_404() {
    let state = test_state();
    let mut app = test_app!(state);
    let req = test::TestRequest::get().uri("/api/nothing").to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(json!("Endpoint doesn't exist"), body["message"]);
  }
}
