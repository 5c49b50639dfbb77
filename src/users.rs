use spin_sdk::http::{Request, Response};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::authz::{authorize, Decision, Operation, Resource};
use crate::config::*;
use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::helpers::{hash_password, sanitize_text, store, validate_uuid};
use crate::models::models::User;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Regex should compile")
    })
}

/// Client-facing user shape. The password digest never leaves the store.
fn build_user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "image_file": user.image_file,
    })
}

fn validate_registration(username: &str, email: &str, password: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if username.is_empty() {
        fields.push(("username".to_string(), "Username is required".to_string()));
    } else if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        fields.push((
            "username".to_string(),
            format!(
                "Username must be {}-{} characters",
                MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
            ),
        ));
    }
    if email.is_empty() {
        fields.push(("email".to_string(), "Email is required".to_string()));
    } else if email.len() > MAX_EMAIL_LENGTH || !email_regex().is_match(email) {
        fields.push(("email".to_string(), "Email is not valid".to_string()));
    }
    if password.is_empty() {
        fields.push(("password".to_string(), "Password is required".to_string()));
    } else if password.len() < MIN_PASSWORD_LENGTH {
        fields.push((
            "password".to_string(),
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    fields
}

/// POST /api/users — register a new account.
pub fn create_user(req: Request) -> anyhow::Result<Response> {
    let new_user: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => {
            return Ok(ApiError::Validation(vec![(
                "body".to_string(),
                "Request body must be JSON".to_string(),
            )])
            .into())
        }
    };
    let username = new_user["username"].as_str().unwrap_or("");
    let email = new_user["email"].as_str().unwrap_or("");
    let password = new_user["password"].as_str().unwrap_or("");

    let fields = validate_registration(username, email, password);
    if !fields.is_empty() {
        return Ok(ApiError::Validation(fields).into());
    }

    // Sanitize username at input time
    let sanitized_username = sanitize_text(username);

    let store = store();
    // Read-then-write uniqueness check; the KV store has no unique
    // constraint to lean on. See DESIGN.md.
    if db::username_taken(&store, &sanitized_username)? {
        return Ok(ApiError::Conflict("Username already exists".to_string()).into());
    }
    if db::email_taken(&store, email)? {
        return Ok(ApiError::Conflict("Email already exists".to_string()).into());
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: sanitized_username,
        email: email.to_string(),
        password: hash_password(password)?,
        image_file: None,
    };
    db::insert_user(&store, &user)?;

    Ok(Response::builder()
        .status(201)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&build_user_json(&user))?)
        .build())
}

/// GET /api/users/{id} — public.
pub fn get_user_details(path: &str) -> anyhow::Result<Response> {
    let user_id = path.trim_start_matches("/api/users/");

    if user_id.is_empty() || !validate_uuid(user_id) {
        return Ok(ApiError::NotFound("User not found".to_string()).into());
    }

    let store = store();
    if let Some(user) = db::load_user(&store, user_id)? {
        Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&build_user_json(&user))?)
            .build())
    } else {
        Ok(ApiError::NotFound("User not found".to_string()).into())
    }
}

/// DELETE /api/users/{id} — only the account holder; cascades to their
/// posts.
///
/// Authorization runs before the target is loaded, so deleting an unknown
/// id that is not your own yields 403, not 404. Callers depend on this
/// ordering.
pub fn delete_user(req: Request) -> anyhow::Result<Response> {
    let actor_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(e) => return Ok(e.into()),
    };

    let path = req.path();
    let target_id = path.trim_start_matches("/api/users/");

    if let Decision::Deny(reason) = authorize(&actor_id, target_id, Resource::User, Operation::Delete)
    {
        return Ok(ApiError::Forbidden(reason).into());
    }

    let store = store();
    if db::load_user(&store, target_id)?.is_none() {
        return Ok(ApiError::NotFound("User not found".to_string()).into());
    }

    db::delete_user_cascade(&store, target_id)?;

    Ok(Response::builder().status(204).build())
}
