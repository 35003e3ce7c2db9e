use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use log::info;

use super::super::dtos::*;
use super::super::error::{map_db_error, Error};
use super::super::session;
use super::super::session::SessionData;
use super::super::AppState;
use crate::storage::Storage;

// The login endpoint checks a single demo credential
// pair from the config. There is no password column in
// the users table, so OAuth-style create-or-reuse is the
// only way regular users get in.

fn demo_session_user() -> SessionUser {
  SessionUser {
    id: 1,
    email: String::from("admin@example.com"),
    name: String::from("Admin"),
    avatar: None,
  }
}

pub async fn login(
  app_state: web::Data<AppState>,
  form: web::Json<LoginForm>
) -> Result<HttpResponse, Error> {
  let form = form.into_inner();
  if form.username != app_state.auth.username
    || form.password != app_state.auth.password
  {
    return Err(Error::Unauthorized(String::from("Invalid credentials")));
  }
  let user = demo_session_user();
  let data = SessionData {
    authenticated: true,
    user: Some(user.clone()),
  };
  let sid = session::start_session(
    app_state.storage.as_ref(),
    &data,
    app_state.auth.session_ttl
  )?;
  info!("Session opened for {}", form.username);
  Ok(
    HttpResponse::Ok()
      .cookie(session::session_cookie(&app_state.auth.cookie_name, &sid))
      .json(AuthOk {
        success: true,
        message: String::from("Login successful"),
        user,
      })
  )
}

pub async fn logout(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  session::destroy_session(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let mut builder = HttpResponse::Ok();
  // Expire the cookie on the client too:
  if let Some(cookie) = req.cookie(&app_state.auth.cookie_name) {
    builder.del_cookie(&cookie);
  }
  Ok(builder.json(JsonStatus {
    success: true,
    message: String::from("Logout successful"),
  }))
}

pub async fn check(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let session = session::current_session(
    &req,
    app_state.storage.as_ref(),
    &app_state.auth.cookie_name
  )?;
  let response = match session {
    Some(SessionData {
      authenticated: true,
      user,
    }) => CheckResponse {
      authenticated: true,
      user,
    },
    _ => CheckResponse {
      authenticated: false,
      user: None,
    },
  };
  Ok(HttpResponse::Ok().json(response))
}

pub async fn register(
  app_state: web::Data<AppState>,
  form: web::Json<RegisterForm>
) -> Result<HttpResponse, Error> {
  let new_user = form.into_inner().validate().map_err(|errors| {
    Error::Validation {
      message: String::from("Invalid user data"),
      errors,
    }
  })?;
  let existing = app_state
    .storage
    .user_by_email(&new_user.email)
    .map_err(map_db_error)?;
  if existing.is_some() {
    return Err(Error::BadRequest(String::from("User already exists")));
  }
  let user = app_state
    .storage
    .create_user(new_user)
    .map_err(map_db_error)?;
  let session_user = SessionUser::from(&user);
  let data = SessionData {
    authenticated: true,
    user: Some(session_user),
  };
  let sid = session::start_session(
    app_state.storage.as_ref(),
    &data,
    app_state.auth.session_ttl
  )?;
  Ok(
    HttpResponse::Created()
      .cookie(session::session_cookie(&app_state.auth.cookie_name, &sid))
      .json(AuthOk {
        success: true,
        message: String::from("Registration successful"),
        user: UserDto::from(user),
      })
  )
}

// Trusts the reverse-proxied OAuth callback blindly:
// whoever posts an email gets a session for it.
pub async fn oauth(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>,
  form: web::Json<OAuthForm>
) -> Result<HttpResponse, Error> {
  let provider = path.into_inner().0;
  if provider != "google" && provider != "facebook" {
    return Err(Error::NotFound(String::from("Unknown provider")));
  }
  let new_user = form.into_inner().validate(&provider).map_err(|errors| {
    Error::Validation {
      message: String::from("Invalid user data"),
      errors,
    }
  })?;
  // Reuse the account if the email is known, whatever
  // provider created it:
  let user = match app_state
    .storage
    .user_by_email(&new_user.email)
    .map_err(map_db_error)?
  {
    Some(user) => user,
    None => app_state
      .storage
      .create_user(new_user)
      .map_err(map_db_error)?,
  };
  let session_user = SessionUser::from(&user);
  let data = SessionData {
    authenticated: true,
    user: Some(session_user),
  };
  let sid = session::start_session(
    app_state.storage.as_ref(),
    &data,
    app_state.auth.session_ttl
  )?;
  Ok(
    HttpResponse::Ok()
      .cookie(session::session_cookie(&app_state.auth.cookie_name, &sid))
      .json(AuthOk {
        success: true,
        message: String::from("Authentication successful"),
        user: UserDto::from(user),
      })
  )
}
