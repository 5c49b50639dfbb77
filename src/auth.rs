use spin_sdk::http::{Request, Response};
use chrono::Utc;

use crate::config::signing_secret;
use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::helpers::{store, verify_password};
use crate::core::params::parse_form;
use crate::token;

/// POST /api/users/token — urlencoded form with `username` (email or
/// username) and `password`. Issues a bearer token on success.
pub fn login_user(req: Request) -> anyhow::Result<Response> {
    let form = parse_form(req.body());
    let login = form.get("username").map(String::as_str).unwrap_or("");
    let password = form.get("password").map(String::as_str).unwrap_or("");

    let mut fields = Vec::new();
    if login.is_empty() {
        fields.push(("username".to_string(), "Username is required".to_string()));
    }
    if password.is_empty() {
        fields.push(("password".to_string(), "Password is required".to_string()));
    }
    if !fields.is_empty() {
        return Ok(ApiError::Validation(fields).into());
    }

    let store = store();
    let user = match db::find_user_by_login(&store, login)? {
        Some(u) => u,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    if !verify_password(password, &user.password) {
        return Ok(ApiError::Unauthorized.into());
    }

    let access_token = token::issue(&user.id, Utc::now(), &signing_secret())?;
    let resp = serde_json::json!({
        "access_token": access_token,
        "token_type": "bearer"
    });
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&resp)?)
        .build())
}

/// Resolve the request's bearer token to a user id. Missing header,
/// unverifiable or expired token, or a subject that no longer exists all
/// read as unauthenticated.
pub fn authenticate(req: &Request) -> Result<String, ApiError> {
    let auth_header = req
        .header("Authorization")
        .and_then(|h| h.as_str())
        .unwrap_or_default();
    let raw = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized),
    };

    let subject =
        token::decode(raw, Utc::now(), &signing_secret()).map_err(|_| ApiError::Unauthorized)?;

    // A token outlives account deletion; re-check the subject.
    let store = store();
    match db::load_user(&store, &subject).map_err(ApiError::from)? {
        Some(_) => Ok(subject),
        None => Err(ApiError::Unauthorized),
    }
}
