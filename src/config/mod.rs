// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use serde::Deserialize;
use std::convert::From;

#[derive(Debug, Deserialize)]
pub struct Config {
  pub db_path: String,
  // Either "sqlite" or "memory". The in-memory backend
  // loses everything on restart, it exists for demos
  // and tests.
  pub storage_backend: String,
  pub bind_address: String,
  // Demo admin credential pair. Defaults match what the
  // SPA client expects, override them in production.
  pub admin_username: String,
  pub admin_password: String,
  pub session_cookie: String,
  // Session lifetime in seconds.
  pub session_ttl: i64,
}

// Subset of the config the request handlers need.
// Having another struct means the app state doesn't
// carry things like the database path around.
#[derive(Debug, Clone)]
pub struct AuthInfo {
  pub username: String,
  pub password: String,
  pub cookie_name: String,
  pub session_ttl: i64,
}

impl From<Config> for AuthInfo {
  fn from(config: Config) -> Self {
    Self {
      username: config.admin_username,
      password: config.admin_password,
      cookie_name: config.session_cookie,
      session_ttl: config.session_ttl,
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    let mut c = config::Config::new();
    // Default values first. You have to use lowercase
    // when compared to what's in the .env file.
    c.set_default("db_path", "./riders.db")?;
    c.set_default("storage_backend", "sqlite")?;
    c.set_default("bind_address", "127.0.0.1:8080")?;
    // The well known demo credential pair:
    c.set_default("admin_username", "admin")?;
    c.set_default("admin_password", "admin123")?;
    c.set_default("session_cookie", "riders_session")?;
    // One day:
    c.set_default("session_ttl", 86400)?;

    c.merge(config::Environment::default())?;
    // The error has to be given a context for
    // color_eyre to work here:
    c.try_into()
      .context("Loading configuration from env")
  }

}
