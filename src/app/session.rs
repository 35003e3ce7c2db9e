use actix_web::http::Cookie;
use actix_web::{HttpMessage, HttpRequest};
use log::warn;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::dtos::SessionUser;
use super::error::{map_db_error, Error};
use crate::storage::Storage;
use crate::utils::time_utils;

// Database-backed sessions: the cookie only carries an
// opaque sid, the actual state is a JSON blob in the
// sessions table. No framework-global anywhere, every
// helper takes the request and the storage explicitly
// so the auth gate can be tested in isolation.

// What gets serialized into the "sess" column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
  pub authenticated: bool,
  pub user: Option<SessionUser>,
}

// Tie-breaker for sids created in the same nanosecond.
static SID_COUNTER: AtomicU64 = AtomicU64::new(0);

// Not cryptographically strong randomness, which is in
// line with the demo-grade authentication this serves.
pub fn generate_sid() -> String {
  let nanos = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_nanos())
    .unwrap_or(0);
  let nonce = format!(
    "{}-{}-{}",
    nanos,
    std::process::id(),
    SID_COUNTER.fetch_add(1, Ordering::Relaxed)
  );
  let mut hasher = Sha1::new();
  hasher.update(nonce.as_bytes());
  hasher
    .finalize()
    .iter()
    .map(|b| format!("{:02x}", b))
    .collect()
}

pub fn session_cookie(name: &str, sid: &str) -> Cookie<'static> {
  Cookie::build(name.to_string(), sid.to_string())
    .path("/")
    .http_only(true)
    .finish()
}

// Writes a fresh session row and returns the sid to put
// in the cookie.
pub fn start_session(
  storage: &dyn Storage,
  data: &SessionData,
  ttl: i64
) -> Result<String, Error> {
  let sid = generate_sid();
  let sess = serde_json::to_string(data).map_err(|e| {
    Error::InternalServerError(format!("Session serialization - {}", e))
  })?;
  let expire = time_utils::current_timestamp() + ttl;
  storage
    .put_session(&sid, &sess, expire)
    .map_err(map_db_error)?;
  Ok(sid)
}

// Resolves the request cookie to session state. Absent
// cookie, unknown sid and expired rows all read as None.
pub fn current_session(
  req: &HttpRequest,
  storage: &dyn Storage,
  cookie_name: &str
) -> Result<Option<SessionData>, Error> {
  let sid = match req.cookie(cookie_name) {
    Some(cookie) => cookie.value().to_string(),
    None => return Ok(None),
  };
  let record = match storage.session(&sid).map_err(map_db_error)? {
    Some(record) => record,
    None => return Ok(None),
  };
  match serde_json::from_str(&record.sess) {
    Ok(data) => Ok(Some(data)),
    Err(e) => {
      // A corrupt blob just means no session.
      warn!("Discarding unreadable session {} - {}", sid, e);
      Ok(None)
    }
  }
}

// The binary auth gate: a session flagged authenticated
// with a user attached, anything else is a 401.
pub fn require_auth(
  req: &HttpRequest,
  storage: &dyn Storage,
  cookie_name: &str
) -> Result<SessionUser, Error> {
  match current_session(req, storage, cookie_name)? {
    Some(SessionData {
      authenticated: true,
      user: Some(user),
    }) => Ok(user),
    _ => Err(Error::Unauthorized(String::from("Unauthorized"))),
  }
}

pub fn destroy_session(
  req: &HttpRequest,
  storage: &dyn Storage,
  cookie_name: &str
) -> Result<(), Error> {
  if let Some(cookie) = req.cookie(cookie_name) {
    storage
      .delete_session(cookie.value())
      .map_err(map_db_error)?;
  }
  Ok(())
}
